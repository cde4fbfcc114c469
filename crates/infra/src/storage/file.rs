//! JSON-file session storage
//!
//! The whole session lives in one small JSON object. Every write rewrites
//! the file through a temporary sibling and an atomic rename, so a crash
//! never leaves a half-written session behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dailytrack_core::SessionStorage;
use dailytrack_domain::{Result, TrackerError};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::errors::InfraError;

type Entries = BTreeMap<String, String>;

fn io_error(err: std::io::Error) -> TrackerError {
    InfraError::from(err).into()
}

/// [`SessionStorage`] persisted to a JSON file.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    // serialises read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Session file does not exist yet");
                Ok(None)
            }
            Err(e) => Err(io_error(e)),
        }
    }

    fn parse(&self, data: &[u8]) -> Result<Entries> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Entries::new());
        }
        serde_json::from_slice(data).map_err(|e| {
            TrackerError::Storage(format!(
                "Session file {} is not a JSON object: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn read_entries(&self) -> Result<Entries> {
        match self.read_bytes().await? {
            Some(data) => self.parse(&data),
            None => Ok(Entries::new()),
        }
    }

    /// Current entries for a read-modify-write cycle.
    ///
    /// An unparseable file is moved aside to `*.corrupt` and treated as
    /// empty, so sign-in and sign-out keep working.
    async fn entries_for_write(&self) -> Result<Entries> {
        let Some(data) = self.read_bytes().await? else {
            return Ok(Entries::new());
        };
        match self.parse(&data) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                let aside = self.quarantine_path();
                warn!(error = %e, aside = %aside.display(), "Discarding unreadable session file");
                if let Err(err) = fs::rename(&self.path, &aside).await {
                    warn!(error = %err, "Could not move unreadable session file aside");
                }
                Ok(Entries::new())
            }
        }
    }

    fn quarantine_path(&self) -> PathBuf {
        self.path.with_extension("corrupt")
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        let data = serde_json::to_vec_pretty(entries)
            .map_err(|e| TrackerError::Internal(format!("Failed to encode session: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");
        if let Some(parent) = temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(io_error)?;
        file.write_all(&data).await.map_err(io_error)?;
        file.sync_all().await.map_err(io_error)?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(io_error)?;
        debug!(path = %self.path.display(), keys = entries.len(), "Session file written");
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries().await?.remove(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.entries_for_write().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.entries_for_write().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}
