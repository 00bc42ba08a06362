//! Save/load persistence
//!
//! Features:
//! - Key/value storage seam (memory, files on native, LocalStorage on web)
//! - Versioned JSON envelope for run snapshots
//! - Backup rotation (tmp → save, old save → backup) for file storage
//! - Corrupt or missing saves are treated as "no save present"

pub mod envelope;
pub mod store;

pub use envelope::{
    RUN_STORAGE_KEY, SNAPSHOT_VERSION, SnapshotEnvelope, clear_snapshot, load_snapshot, save_snapshot,
};
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;
pub use store::MemoryStore;

use crate::error::Result;

/// Minimal string storage the engine persists through
pub trait KeyValueStore {
    /// Stored value for `key`, if any
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Delete `key`; deleting a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}
