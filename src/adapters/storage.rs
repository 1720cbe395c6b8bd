use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One file per key under a base directory. The whole aggregate lives in a
/// single key, so in practice this is a one-file store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let full_path = Path::new(&self.base_path).join(key);
        match fs::read(&full_path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(key);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// Ephemeral store for tests and throwaway sessions. Clones share the same
/// underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, data: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}
