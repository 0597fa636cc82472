pub mod album;
pub mod anniversary;
pub mod file;
pub mod moment;
pub mod place;
pub mod shared;
pub mod system;
pub mod user;
pub mod wish;
