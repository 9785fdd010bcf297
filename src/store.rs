//! Key/value persistence for provider configuration blobs
//!
//! The factory only knows the `ConfigStore` contract; the blob format is
//! owned by the factory. Two stores ship with the crate:
//! - `MemoryStore` keeps blobs in process memory
//! - `FileStore` writes one JSON file per key under a directory

use crate::error::StoreError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keyed blob storage
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the blob stored under `key`, if any
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous blob
    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.read().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.blobs.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store, one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the blob for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                debug!(path = %path.display(), "loaded configuration blob");
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(key);
        tokio::fs::write(&path, value)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "saved configuration blob");
        Ok(())
    }
}

/// Map a store key onto a portable file name
///
/// ASCII alphanumerics, `-`, `_` and `.` are kept; every other byte is
/// percent-encoded, so distinct keys always get distinct files. A leading
/// dot is encoded too, keeping blobs out of hidden files.
fn sanitize_key(key: &str) -> String {
    use std::fmt::Write as _;

    if key.is_empty() {
        return "%".to_string();
    }
    let mut name = String::with_capacity(key.len());
    for (i, byte) in key.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'_')
            || (byte == b'.' && i > 0);
        if keep {
            name.push(char::from(byte));
        } else {
            let _ = write!(name, "%{:02X}", byte);
        }
    }
    name
}
