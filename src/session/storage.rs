// src/session/storage.rs — Durable key-value slots
//
// The client persists everything as string values under a handful of keys,
// the same shape a browser's localStorage would have. `FileStorage` keeps the
// whole map in one JSON file and rewrites it atomically (temp file + rename).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::infra::errors::ChatError;

/// Key holding the active display name.
pub const USERNAME_KEY: &str = "chatUsername";
/// Key holding the optional avatar reference (data URI or URL).
pub const USER_IMAGE_KEY: &str = "chatUserImage";
/// Presentation-only sidebar collapse flag.
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebarCollapsed";

/// Key holding the serialized session collection of one identity.
pub fn history_key(display_name: &str) -> String {
    format!("chatHistoryData_{display_name}")
}

pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), ChatError>;
    fn remove(&mut self, key: &str) -> Result<(), ChatError>;
}

/// Volatile storage, used by tests and as a fallback when no file is usable.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), ChatError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ChatError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file. A missing or unreadable
    /// file yields empty storage.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt storage file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Could not read storage file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), ChatError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), ChatError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), ChatError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
