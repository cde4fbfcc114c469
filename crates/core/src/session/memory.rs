//! In-process session storage

use std::collections::HashMap;

use async_trait::async_trait;
use dailytrack_domain::Result;
use parking_lot::Mutex;

use super::ports::SessionStorage;

/// Volatile [`SessionStorage`]; the session lasts as long as the process.
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    values: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with `entries`, handy for restore scenarios.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { values: Mutex::new(values) }
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = InMemorySessionStorage::new();
        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);

        // removing again is fine
        storage.remove("k").await.unwrap();
        assert!(storage.is_empty());
    }
}
