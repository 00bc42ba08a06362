//! Procedural audio - no external files needed!
//!
//! Cues are synthesized into PCM, wrapped in a WAV container, and handed to
//! whatever host output the platform provides through `AudioOutput`.

pub mod cues;
pub mod output;
pub mod scheduler;
pub mod synth;
pub mod wav;

pub use cues::{Cue, CueBank};
pub use output::{AudioOutput, PlayableBuffer, PlaybackError, SilentOutput};
pub use scheduler::{Channel, HeartbeatVoice, PlaybackScheduler};
pub use synth::{AudioBuffer, AudioSynthesizer, Layer, SynthKind, SynthParams};
pub use wav::ContainerInfo;
