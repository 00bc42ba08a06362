//! Host playback capability
//!
//! The scheduler needs only four operations from the platform. Errors are
//! reported to the scheduler, which logs and drops them.

use std::sync::Arc;

use thiserror::Error;

/// Encoded, self-contained cue bytes
pub type PlayableBuffer = Arc<[u8]>;

/// Why a host refused to play
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("no buffer loaded")]
    NotReady,
    #[error("playback blocked by platform policy: {0}")]
    Blocked(String),
    #[error("audio device error: {0}")]
    Device(String),
}

/// One playable handle on the host
pub trait AudioOutput {
    fn load(&mut self, buffer: PlayableBuffer) -> Result<(), PlaybackError>;
    /// Restart playback from the beginning at `volume` (0.0 - 1.0)
    fn play(&mut self, volume: f32) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn is_ready(&self) -> bool;
}

/// Accepts everything, plays nothing (headless runs)
#[derive(Debug, Default, Clone)]
pub struct SilentOutput {
    buffer: Option<PlayableBuffer>,
    plays: u64,
}

impl SilentOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Audible plays so far (zero-volume primes excluded)
    pub fn plays(&self) -> u64 {
        self.plays
    }
}

impl AudioOutput for SilentOutput {
    fn load(&mut self, buffer: PlayableBuffer) -> Result<(), PlaybackError> {
        self.buffer = Some(buffer);
        Ok(())
    }

    fn play(&mut self, volume: f32) -> Result<(), PlaybackError> {
        if self.buffer.is_none() {
            return Err(PlaybackError::NotReady);
        }
        if volume > 0.0 {
            self.plays += 1;
        }
        Ok(())
    }

    fn pause(&mut self) {}

    fn is_ready(&self) -> bool {
        self.buffer.is_some()
    }
}

/// Recording double shared by scheduler and session tests
#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Load(&'static str),
        Play(&'static str, f32),
        Pause(&'static str),
    }

    pub type CallLog = Rc<RefCell<Vec<Call>>>;

    #[derive(Debug)]
    pub struct RecordingOutput {
        pub name: &'static str,
        pub log: CallLog,
        pub loaded: bool,
        /// Next `play` calls fail with this error
        pub fail_play: Option<PlaybackError>,
        pub fail_load: bool,
    }

    impl RecordingOutput {
        pub fn new(name: &'static str, log: CallLog) -> Self {
            Self {
                name,
                log,
                loaded: false,
                fail_play: None,
                fail_load: false,
            }
        }
    }

    impl AudioOutput for RecordingOutput {
        fn load(&mut self, _buffer: PlayableBuffer) -> Result<(), PlaybackError> {
            if self.fail_load {
                return Err(PlaybackError::Device("busy".into()));
            }
            self.loaded = true;
            self.log.borrow_mut().push(Call::Load(self.name));
            Ok(())
        }

        fn play(&mut self, volume: f32) -> Result<(), PlaybackError> {
            if let Some(err) = &self.fail_play {
                return Err(err.clone());
            }
            if !self.loaded {
                return Err(PlaybackError::NotReady);
            }
            self.log.borrow_mut().push(Call::Play(self.name, volume));
            Ok(())
        }

        fn pause(&mut self) {
            self.log.borrow_mut().push(Call::Pause(self.name));
        }

        fn is_ready(&self) -> bool {
            self.loaded
        }
    }

    /// Audible plays on `name`
    pub fn plays_on(log: &CallLog, name: &str) -> usize {
        log.borrow()
            .iter()
            .filter(|c| matches!(c, Call::Play(n, v) if *n == name && *v > 0.0))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_output_needs_a_buffer() {
        let mut out = SilentOutput::new();
        assert!(!out.is_ready());
        assert_eq!(out.play(1.0), Err(PlaybackError::NotReady));

        out.load(Arc::from(vec![0u8; 4])).unwrap();
        assert!(out.is_ready());
        out.play(0.0).unwrap();
        out.play(0.5).unwrap();
        assert_eq!(out.plays(), 1);
    }
}
