//! Dread Doors - a timed pick-the-safe-door survival loop
//!
//! Core modules:
//! - `sim`: Round/tension engine (door layouts, run state, cancellable timers)
//! - `audio`: Synthesized cues, WAV container, gated playback scheduling
//! - `session`: Cooperative frame loop wiring the engine to audio and storage
//! - `persistence`: Snapshot save/load with corruption tolerance
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven difficulty and rules

pub mod audio;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use session::Session;
pub use settings::Settings;
pub use tuning::{Difficulty, DifficultyProfile, RulesConfig};

/// Game configuration constants
pub mod consts {
    /// Doors per round
    pub const DOOR_COUNT: usize = 5;
    /// Lives at the start of a run
    pub const MAX_LIVES: u8 = 5;
    /// Final level; reaching it wins the run
    pub const MAX_LEVEL: u32 = 10;
    /// Level at which the checkpoint unlocks
    pub const CHECKPOINT_LEVEL: u32 = 5;

    /// Fixed countdown step (20 Hz)
    pub const TICK_STEP_MS: u32 = 50;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Round length at level 1 on normal difficulty
    pub const ROUND_BASE_MS: u32 = 15_000;
    /// Round length lost per level above 1
    pub const ROUND_STEP_MS: u32 = 600;
    /// Shortest round before the difficulty multiplier
    pub const ROUND_MIN_MS: u32 = 8_000;

    /// Pause between a resolved round and the next one
    pub const ROUND_TRANSITION_MS: u32 = 700;
    /// Door reveal settle time before the outcome is applied
    pub const REVEAL_DELAY_MS: u32 = 900;
    /// Heartbeat suspension after a monster/curse reveal
    pub const SCARE_DURATION_MS: u32 = 1_200;
    /// Heartbeat suspension after a critical scare
    pub const CRITICAL_SCARE_DURATION_MS: u32 = 1_800;
    /// Pause between the win signal and the looped fresh run
    pub const WIN_PAUSE_MS: u32 = 2_500;
    /// Simulated ad watch length
    pub const AD_WATCH_DELAY_MS: u32 = 3_000;

    /// Lives restored by an ad reward
    pub const AD_REWARD_LIVES: u8 = 2;
    /// Consecutive safe picks that earn one ward
    pub const WARD_STREAK: u32 = 3;
    /// Damage dealt by a monster door
    pub const MONSTER_DAMAGE: u8 = 1;
    /// Damage dealt by the curse door
    pub const CURSE_DAMAGE: u8 = 2;
}
