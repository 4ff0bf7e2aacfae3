//! Durable key-value slots for the persisted identity

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Key under which the logged-in user is persisted
pub const USER_SLOT_KEY: &str = "regula_user";

/// Plain-text key-value storage
#[async_trait]
pub trait KeyValueSlot: Send + Sync {
    /// Read the value under `key`; `Ok(None)` when absent
    async fn load(&self, key: &str) -> io::Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    async fn store(&self, key: &str, value: &str) -> io::Result<()>;

    /// Delete `key`; deleting an absent key succeeds
    async fn remove(&self, key: &str) -> io::Result<()>;
}

/// One file per key, `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueSlot for FileSlot {
    async fn load(&self, key: &str) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn store(&self, key: &str, value: &str) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        // Readers only ever see a complete record.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory slot for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with one value
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.to_string());
        Self {
            values: RwLock::new(values),
        }
    }
}

#[async_trait]
impl KeyValueSlot for MemorySlot {
    async fn load(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> io::Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
