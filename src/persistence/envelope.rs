//! Versioned run snapshot envelope
//!
//! A snapshot that is missing, unparsable, from another version, or out of
//! range for the current rules is treated as "no save present".

use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::sim::{RunSnapshot, RunState};
use crate::tuning::RulesConfig;

/// Current envelope version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Storage key for the run snapshot
pub const RUN_STORAGE_KEY: &str = "dread_doors_run";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    pub version: u32,
    pub state: RunSnapshot,
}

impl SnapshotEnvelope {
    pub fn new(state: RunSnapshot) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state,
        }
    }
}

/// Write `snapshot`; failures are logged and dropped
pub fn save_snapshot(store: &mut dyn KeyValueStore, snapshot: &RunSnapshot) {
    let envelope = SnapshotEnvelope::new(snapshot.clone());
    let json = match serde_json::to_string(&envelope) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to encode run snapshot: {}", e);
            return;
        }
    };
    if let Err(e) = store.set(RUN_STORAGE_KEY, &json) {
        log::warn!("Failed to save run snapshot: {}", e);
    }
}

/// Rehydrate the saved run, if one is present and well-formed
pub fn load_snapshot(store: &dyn KeyValueStore, rules: &RulesConfig) -> Option<RunState> {
    let json = store.get(RUN_STORAGE_KEY)?;
    let envelope: SnapshotEnvelope = match serde_json::from_str(&json) {
        Ok(envelope) => envelope,
        Err(e) => {
            log::warn!("Ignoring corrupt run snapshot: {}", e);
            return None;
        }
    };
    if envelope.version != SNAPSHOT_VERSION {
        log::warn!(
            "Ignoring run snapshot version {} (expected {})",
            envelope.version,
            SNAPSHOT_VERSION
        );
        return None;
    }
    let state = RunState::from_snapshot(&envelope.state, rules);
    match &state {
        Some(state) => log::info!("Loaded run at level {}", state.level),
        None => log::warn!("Ignoring out-of-range run snapshot"),
    }
    state
}

/// Forget the saved run (explicit new game)
pub fn clear_snapshot(store: &mut dyn KeyValueStore) {
    if let Err(e) = store.remove(RUN_STORAGE_KEY) {
        log::warn!("Failed to clear run snapshot: {}", e);
    }
}
