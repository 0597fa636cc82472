mod access;
mod config;
mod error;
mod hash;
mod traits;

pub mod local;
#[cfg(feature = "object-storage")]
pub mod s3;
#[cfg(feature = "object-storage")]
pub mod webdav;

pub use access::{AccessPolicy, ImageProxy, query_escape};
pub use config::{Backend, LocalConfig, StorageConfig, build_storage};
pub use error::StorageError;
pub use hash::ContentHash;
pub use traits::{BoxReader, ProxyUrlBuilder, Storage};
