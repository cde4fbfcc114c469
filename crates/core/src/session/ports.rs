//! Port interfaces for session persistence
//!
//! The session store only needs a small string key/value surface; the
//! infrastructure layer decides where the values actually live.

use async_trait::async_trait;
use dailytrack_domain::Result;

/// Durable key/value storage for session state
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read a value, `None` when the key was never written or was removed
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value; the write is durable when this returns
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}
