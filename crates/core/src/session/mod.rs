//! Session lifecycle
//!
//! This module provides the session store and the storage port it
//! persists through.

pub mod memory;
pub mod ports;
pub mod store;

pub use memory::InMemorySessionStorage;
pub use ports::SessionStorage;
pub use store::{LoginGrant, SessionEvent, SessionStore};
