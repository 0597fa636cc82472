pub mod album;
pub mod anniversary;
pub mod file;
pub mod health;
pub mod moment;
pub mod place;
pub mod system;
pub mod user;
pub mod wish;
