//! Gated cue playback and heartbeat cadence
//!
//! Nothing plays until `unlock` has primed every output. After that:
//! - Beats alternate between two heartbeat voices so a new beat never cuts
//!   off the previous tail
//! - Door, scare and listen cues each own a channel
//! - Suspension drops the pending beat; resuming starts a fresh delay
//! - Host failures skip the sound and are never retried

use super::cues::{Cue, CueBank};
use super::output::{AudioOutput, PlaybackError};
use super::synth::AudioSynthesizer;
use crate::settings::Settings;
use crate::sim::TensionReading;

/// Host output slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    HeartbeatA,
    HeartbeatB,
    Door,
    Scare,
    Ambient,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::HeartbeatA,
        Channel::HeartbeatB,
        Channel::Door,
        Channel::Scare,
        Channel::Ambient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::HeartbeatA => "heartbeat_a",
            Channel::HeartbeatB => "heartbeat_b",
            Channel::Door => "door",
            Channel::Scare => "scare",
            Channel::Ambient => "ambient",
        }
    }
}

/// Two handles on the same heartbeat buffer, played alternately
#[derive(Debug)]
pub struct HeartbeatVoice<O> {
    handles: [O; 2],
    toggle: usize,
}

impl<O: AudioOutput> HeartbeatVoice<O> {
    fn new(a: O, b: O) -> Self {
        Self {
            handles: [a, b],
            toggle: 0,
        }
    }

    /// Index of the handle the next beat will use
    pub fn next_slot(&self) -> usize {
        self.toggle
    }

    fn play_next(&mut self, volume: f32) -> Result<(), PlaybackError> {
        let slot = self.toggle;
        self.toggle ^= 1;
        self.handles[slot].play(volume)
    }
}

/// Owns every host output and decides when they sound
#[derive(Debug)]
pub struct PlaybackScheduler<O> {
    heartbeat: HeartbeatVoice<O>,
    door: O,
    scare: O,
    ambient: O,
    bank: Option<CueBank>,
    unlocked: bool,
    next_beat_in_ms: Option<f64>,
    beats_played: u64,
    sfx_volume: f32,
    heartbeat_volume: f32,
}

impl<O: AudioOutput> PlaybackScheduler<O> {
    /// Create outputs for every channel; nothing is loaded yet
    pub fn new(mut make_output: impl FnMut(Channel) -> O) -> Self {
        Self {
            heartbeat: HeartbeatVoice::new(
                make_output(Channel::HeartbeatA),
                make_output(Channel::HeartbeatB),
            ),
            door: make_output(Channel::Door),
            scare: make_output(Channel::Scare),
            ambient: make_output(Channel::Ambient),
            bank: None,
            unlocked: false,
            next_beat_in_ms: None,
            beats_played: 0,
            sfx_volume: 1.0,
            heartbeat_volume: 1.0,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn beats_played(&self) -> u64 {
        self.beats_played
    }

    /// Time until the pending beat, if one is scheduled
    pub fn next_beat_in_ms(&self) -> Option<f64> {
        self.next_beat_in_ms
    }

    pub fn heartbeat(&self) -> &HeartbeatVoice<O> {
        &self.heartbeat
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.effective_sfx_volume();
        self.heartbeat_volume = settings.effective_heartbeat_volume();
    }

    /// Synthesize cues, load them and run the silent prime cycle.
    /// Must be called from a user gesture on hosts that require one.
    /// Returns false (and stays locked) if any step fails.
    pub fn unlock(&mut self, synth: &AudioSynthesizer) -> bool {
        if self.unlocked {
            return true;
        }
        if self.bank.is_none() {
            match CueBank::build(synth) {
                Ok(bank) => self.bank = Some(bank),
                Err(e) => {
                    log::warn!("Audio unavailable, cue synthesis failed: {}", e);
                    return false;
                }
            }
        }
        if let Err(e) = self.prime() {
            log::warn!("Audio unlock failed: {}", e);
            return false;
        }
        self.unlocked = true;
        log::info!("Audio unlocked");
        true
    }

    fn prime(&mut self) -> Result<(), PlaybackError> {
        let bank = self.bank.as_ref().ok_or(PlaybackError::NotReady)?;
        let [voice_a, voice_b] = &mut self.heartbeat.handles;
        let slots: [(&mut O, Cue); 5] = [
            (voice_a, Cue::Heartbeat),
            (voice_b, Cue::Heartbeat),
            (&mut self.door, Cue::DoorCreak),
            (&mut self.scare, Cue::MonsterScare),
            (&mut self.ambient, Cue::Listen),
        ];
        for (output, cue) in slots {
            let buffer = bank.get(cue).ok_or(PlaybackError::NotReady)?;
            output.load(buffer.clone())?;
            output.play(0.0)?;
            output.pause();
        }
        Ok(())
    }

    /// Fire a one-shot cue. No-op before unlock; failures are skipped.
    pub fn trigger(&mut self, cue: Cue) -> bool {
        if !self.unlocked {
            log::debug!("Dropped {} cue: audio locked", cue.as_str());
            return false;
        }
        let result = match cue {
            Cue::Heartbeat => self.heartbeat.play_next(self.heartbeat_volume),
            Cue::DoorCreak => self.door.play(self.sfx_volume),
            Cue::MonsterScare => self.scare.play(self.sfx_volume),
            Cue::Listen => self.ambient.play(self.sfx_volume),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Skipped {} cue: {}", cue.as_str(), e);
                false
            }
        }
    }

    /// Advance the heartbeat loop by `delta_ms` under `reading`.
    /// Returns true if a beat was attempted this step.
    pub fn update_heartbeat(&mut self, delta_ms: f64, reading: &TensionReading) -> bool {
        if !self.unlocked || !reading.schedule {
            self.next_beat_in_ms = None;
            return false;
        }
        let interval = reading.profile.beat_interval_ms;

        let Some(mut remaining) = self.next_beat_in_ms else {
            self.next_beat_in_ms = Some(interval);
            return false;
        };
        if reading.tier_changed {
            // A faster tier may pull the pending beat in, never push it out
            remaining = remaining.min(interval);
        }
        remaining -= delta_ms;
        if remaining > 0.0 {
            self.next_beat_in_ms = Some(remaining);
            return false;
        }

        // Reset rather than accumulate: a late beat never causes a burst
        self.next_beat_in_ms = Some(interval);
        match self.heartbeat.play_next(self.heartbeat_volume) {
            Ok(()) => self.beats_played += 1,
            Err(e) => log::debug!("Skipped heartbeat: {}", e),
        }
        true
    }

    /// Silence everything and relock. Buffers are released.
    pub fn teardown(&mut self) {
        for output in self.heartbeat.handles.iter_mut() {
            output.pause();
        }
        self.door.pause();
        self.scare.pause();
        self.ambient.pause();
        self.unlocked = false;
        self.next_beat_in_ms = None;
        self.bank = None;
        log::debug!("Audio torn down");
    }
}
