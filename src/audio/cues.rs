//! Fixed cue presets
//!
//! Every sound the game makes is one of these, synthesized once at unlock.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::synth::{AudioBuffer, AudioSynthesizer, Layer, SynthParams};
use super::wav;
use crate::error::Result;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Lub-dub, replayed at the tension tempo
    Heartbeat,
    /// Door picked
    DoorCreak,
    /// Monster or curse revealed
    MonsterScare,
    /// Player listened at the doors
    Listen,
}

impl Cue {
    pub const ALL: [Cue; 4] = [Cue::Heartbeat, Cue::DoorCreak, Cue::MonsterScare, Cue::Listen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Heartbeat => "heartbeat",
            Cue::DoorCreak => "door_creak",
            Cue::MonsterScare => "monster_scare",
            Cue::Listen => "listen",
        }
    }

    pub fn duration_seconds(&self) -> f32 {
        match self {
            Cue::Heartbeat => 0.42,
            Cue::DoorCreak => 0.5,
            Cue::MonsterScare => 1.0,
            Cue::Listen => 0.9,
        }
    }

    /// Synthesis layers for this cue
    pub fn layers(&self) -> Vec<Layer> {
        match self {
            // lub at 0, dub at 180ms, each a low thump with a noise attack
            Cue::Heartbeat => vec![
                Layer::at(0.0, SynthParams::thump(55.0, 0.8, 0.09)),
                Layer::at(0.0, SynthParams::click(0.25, 0.012)),
                Layer::at(0.18, SynthParams::thump(48.0, 0.6, 0.08)),
                Layer::at(0.18, SynthParams::click(0.15, 0.01)),
            ],
            Cue::DoorCreak => vec![
                Layer::at(0.0, SynthParams::click(0.4, 0.05)),
                Layer::at(0.02, SynthParams::thump(180.0, 0.2, 0.15)),
                Layer::at(0.12, SynthParams::thump(140.0, 0.15, 0.2)),
            ],
            Cue::MonsterScare => vec![
                Layer::at(0.0, SynthParams::click(0.7, 0.2)),
                Layer::at(0.0, SynthParams::thump(40.0, 0.9, 0.35)),
                Layer::at(0.05, SynthParams::thump(90.0, 0.5, 0.25)),
            ],
            Cue::Listen => vec![
                Layer::at(0.0, SynthParams::click(0.15, 0.3)),
                Layer::at(0.1, SynthParams::thump(70.0, 0.2, 0.4)),
            ],
        }
    }

    pub fn render(&self, synth: &AudioSynthesizer) -> Result<AudioBuffer> {
        synth.compose(self.duration_seconds(), &self.layers())
    }
}

/// Encoded containers for every cue, built once and shared by handle
#[derive(Debug, Clone)]
pub struct CueBank {
    entries: Vec<(Cue, Arc<[u8]>)>,
}

impl CueBank {
    /// Render and encode all cues; fails if any one of them fails
    pub fn build(synth: &AudioSynthesizer) -> Result<Self> {
        let mut entries = Vec::with_capacity(Cue::ALL.len());
        for cue in Cue::ALL {
            let bytes = wav::encode(&cue.render(synth)?)?;
            log::debug!("Synthesized {} ({} bytes)", cue.as_str(), bytes.len());
            entries.push((cue, Arc::from(bytes)));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, cue: Cue) -> Option<&Arc<[u8]>> {
        self.entries.iter().find(|(c, _)| *c == cue).map(|(_, b)| b)
    }
}
