//! Player settings and preferences
//!
//! Persisted separately from run snapshots, under their own storage key.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;
use crate::tuning::Difficulty;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty for new runs
    pub difficulty: Difficulty,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Door/monster/ambient cue volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Heartbeat volume (0.0 - 1.0)
    pub heartbeat_volume: f32,
    /// Mute all audio
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion. Stored for the host's render layer, which skips
    /// shake and pulse when set; the engine and audio never read it.
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            master_volume: 0.8,
            sfx_volume: 1.0,
            heartbeat_volume: 0.9,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "dread_doors_settings";

    /// Effective one-shot cue volume
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective heartbeat volume
    pub fn effective_heartbeat_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.heartbeat_volume).clamp(0.0, 1.0)
        }
    }

    /// Load settings, falling back to defaults on a missing or unreadable entry
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings; failures are logged, never surfaced
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {}", e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}
