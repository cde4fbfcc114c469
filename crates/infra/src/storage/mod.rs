//! Durable session storage

pub mod file;

pub use file::FileSessionStorage;
