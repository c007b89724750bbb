//! Session storage backends.
//!
//! A store is a flat string key/value map scoped to one session. The
//! identifier service keeps exactly one entry in it: the session trace id.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{SessionConfig, StoreKind};

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key/value capability backing the session trace id.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-scoped store; contents vanish with the process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key);
        Ok(())
    }
}

/// Store persisted as a JSON object on disk, so the session survives restarts.
///
/// The file is read once at open and rewritten in full on every mutation. A
/// file that cannot be parsed is ignored and replaced by the next write.
pub struct FileStore {
    inner: DashMap<String, String>,
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = DashMap::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            match serde_json::from_reader::<_, HashMap<String, String>>(reader) {
                Ok(map) => {
                    for (k, v) in map {
                        inner.insert(k, v);
                    }
                    tracing::debug!(path = %path.display(), entries = inner.len(), "Loaded session store");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Session store file is corrupt, starting empty");
                }
            }
        }

        Ok(Self { inner, path })
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let map: HashMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        // Write beside the target, then rename over it.
        let tmp_path = self.tmp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer(&mut writer, &map)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.inner.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

/// Open the store selected by `config`.
pub fn open_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>, StoreError> {
    match (config.store, config.path.as_deref()) {
        (StoreKind::File, Some(path)) if !path.is_empty() => {
            Ok(Arc::new(FileStore::open(path)?) as Arc<dyn SessionStore>)
        }
        (StoreKind::File, _) => Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "file store requires a path",
        ))),
        (StoreKind::Memory, _) => Ok(Arc::new(MemoryStore::new()) as Arc<dyn SessionStore>),
    }
}
