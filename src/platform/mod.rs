//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging backend (env_logger natively, console on web)
//! - Panic reporting on web
//! - Default storage location

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Install the log backend. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Install the log backend. Safe to call more than once.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Module start hook for the web build
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_start() {
    init_logging();
    log::info!("Dread Doors (web) loaded");
}

/// Storage backend for this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store(dir: &std::path::Path) -> Box<dyn crate::persistence::KeyValueStore> {
    use crate::persistence::{FileStore, MemoryStore};

    match FileStore::open(dir) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("Saves disabled, cannot open {}: {}", dir.display(), e);
            Box::new(MemoryStore::new())
        }
    }
}

/// Storage backend for this platform
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn crate::persistence::KeyValueStore> {
    use crate::persistence::{LocalStorageStore, MemoryStore};

    match LocalStorageStore::open() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("Saves disabled: no LocalStorage");
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }

    #[test]
    fn test_default_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = default_store(dir.path());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }
}
