//! Use cases behind the HTTP handlers. Each function takes the shared
//! [`AppState`](crate::state::AppState), validates its input, drives the
//! repositories and builds the response DTO.

pub mod album;
pub mod anniversary;
pub mod file;
pub mod moment;
pub mod place;
pub mod system;
pub mod user;
pub mod wish;
