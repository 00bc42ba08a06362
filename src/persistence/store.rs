//! Storage backends

use std::collections::HashMap;

use super::KeyValueStore;
use crate::error::Result;

/// In-memory store (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to `<key>.tmp`, the previous `<key>.json` is rotated to
/// `<key>.bak`, then the tmp file is renamed into place. Reads fall back to
/// the backup when the primary file is missing.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str, ext: &str) -> std::path::PathBuf {
        self.dir.join(format!("{}.{}", key, ext))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key, "json"))
            .or_else(|_| std::fs::read_to_string(self.path(key, "bak")))
            .ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let tmp = self.path(key, "tmp");
        let primary = self.path(key, "json");
        std::fs::write(&tmp, value)?;
        if primary.exists() {
            std::fs::rename(&primary, self.path(key, "bak"))?;
        }
        std::fs::rename(&tmp, &primary)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        for ext in ["json", "bak", "tmp"] {
            match std::fs::remove_file(self.path(key, ext)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    /// `None` when the page has no LocalStorage (private mode, sandboxed iframe)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|_| crate::error::Error::StorageUnavailable {
                reason: format!("LocalStorage rejected write to {}", key),
            })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|_| crate::error::Error::StorageUnavailable {
                reason: format!("LocalStorage rejected removal of {}", key),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("2"));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_rotates_backup() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        store.set("run", "first").unwrap();
        store.set("run", "second").unwrap();
        assert_eq!(store.get("run").as_deref(), Some("second"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("run.bak")).unwrap(),
            "first"
        );
        assert!(!dir.path().join("run.tmp").exists());
    }

    #[test]
    fn test_file_store_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set("run", "first").unwrap();
        store.set("run", "second").unwrap();

        std::fs::remove_file(dir.path().join("run.json")).unwrap();
        assert_eq!(store.get("run").as_deref(), Some("first"));

        store.remove("run").unwrap();
        assert!(store.get("run").is_none());
    }
}
