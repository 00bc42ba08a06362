//! Error types for the fallible seams
//!
//! Gameplay never returns these: dropped inputs and stale timers are silent,
//! and audio/persistence failures degrade to no-ops at the call site.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid rules config: {reason}")]
    InvalidRules { reason: String },

    #[error("Unknown difficulty: {name}")]
    UnknownDifficulty { name: String },

    #[error("Invalid synth parameters: {reason}")]
    InvalidSynth { reason: String },

    #[error("WAV container error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
