mod album;
mod auth;
mod common;
mod file;
mod moment;
mod place;
mod system;
mod wish;
