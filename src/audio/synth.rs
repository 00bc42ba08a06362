//! PCM synthesis for short percussive cues
//!
//! Two voices: a decaying sine ("thump") and a decaying white-noise burst
//! ("click"). Layers are mixed additively at onset offsets into one buffer,
//! clamped before 16-bit quantization. Noise is seeded, so the same
//! parameters always render the same samples.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Output sample rate
pub const SAMPLE_RATE: u32 = 44_100;
/// Fixed-point sample width
pub const BIT_DEPTH: u16 = 16;
/// Mono
pub const CHANNEL_COUNT: u16 = 1;
/// Running-sum ceiling that keeps quantization from wrapping
pub const MIX_CEILING: f32 = 0.98;

/// Synthesis voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynthKind {
    /// `amplitude * sin(2π f t) * e^(-t/decay)`
    Thump,
    /// `amplitude * noise(t) * e^(-t/decay)`; frequency is ignored
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthParams {
    pub kind: SynthKind,
    pub frequency_hz: f32,
    pub amplitude: f32,
    pub decay_seconds: f32,
}

impl SynthParams {
    pub fn thump(frequency_hz: f32, amplitude: f32, decay_seconds: f32) -> Self {
        Self {
            kind: SynthKind::Thump,
            frequency_hz,
            amplitude,
            decay_seconds,
        }
    }

    pub fn click(amplitude: f32, decay_seconds: f32) -> Self {
        Self {
            kind: SynthKind::Click,
            frequency_hz: 0.0,
            amplitude,
            decay_seconds,
        }
    }

    fn validate(&self) -> Result<()> {
        let bad = |reason: String| Err(Error::InvalidSynth { reason });
        if !(0.0..=1.0).contains(&self.amplitude) {
            return bad(format!("amplitude {} outside 0..=1", self.amplitude));
        }
        if !(self.decay_seconds > 0.0) {
            return bad(format!("decay {}s must be positive", self.decay_seconds));
        }
        if self.kind == SynthKind::Thump && !(self.frequency_hz > 0.0) {
            return bad(format!("thump frequency {} Hz must be positive", self.frequency_hz));
        }
        Ok(())
    }
}

/// One component of a layered cue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub params: SynthParams,
    /// Start offset inside the buffer
    pub onset_seconds: f32,
}

impl Layer {
    pub fn at(onset_seconds: f32, params: SynthParams) -> Self {
        Self {
            params,
            onset_seconds,
        }
    }
}

/// Immutable synthesized PCM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    sample_rate: u32,
    bit_depth: u16,
    channel_count: u16,
    samples: Vec<i16>,
}

impl AudioBuffer {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bit_depth(&self) -> u16 {
        self.bit_depth
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channel_count as f64)
    }

    /// PCM payload size in bytes
    pub fn data_size(&self) -> usize {
        self.samples.len() * (self.bit_depth as usize / 8)
    }

    /// Largest absolute sample
    pub fn peak(&self) -> i16 {
        self.samples
            .iter()
            .map(|s| s.saturating_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Stateless cue renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSynthesizer {
    sample_rate: u32,
    seed: u64,
}

impl Default for AudioSynthesizer {
    fn default() -> Self {
        Self::new(SAMPLE_RATE, 0x5EED)
    }
}

impl AudioSynthesizer {
    pub fn new(sample_rate: u32, seed: u64) -> Self {
        Self { sample_rate, seed }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames in `duration_seconds`
    pub fn frame_count(&self, duration_seconds: f32) -> usize {
        (self.sample_rate as f64 * duration_seconds as f64).round() as usize
    }

    /// Render a single voice as floating-point samples starting at t = 0
    pub fn render(&self, params: &SynthParams, duration_seconds: f32, noise_seed: u64) -> Result<Vec<f32>> {
        params.validate()?;
        let n = self.frame_count(duration_seconds);
        let rate = self.sample_rate as f32;
        let omega = std::f32::consts::TAU * params.frequency_hz;

        let samples = match params.kind {
            SynthKind::Thump => (0..n)
                .map(|i| {
                    let t = i as f32 / rate;
                    params.amplitude * (omega * t).sin() * (-t / params.decay_seconds).exp()
                })
                .collect(),
            SynthKind::Click => {
                let mut rng = Pcg32::seed_from_u64(noise_seed);
                (0..n)
                    .map(|i| {
                        let t = i as f32 / rate;
                        let noise: f32 = rng.random_range(-1.0..=1.0);
                        params.amplitude * noise * (-t / params.decay_seconds).exp()
                    })
                    .collect()
            }
        };
        Ok(samples)
    }

    /// Mix `layers` into one mono 16-bit buffer of `duration_seconds`
    pub fn compose(&self, duration_seconds: f32, layers: &[Layer]) -> Result<AudioBuffer> {
        if !(duration_seconds > 0.0) {
            return Err(Error::InvalidSynth {
                reason: format!("duration {}s must be positive", duration_seconds),
            });
        }
        let total = self.frame_count(duration_seconds);
        let mut mix = vec![0.0f32; total];

        for (idx, layer) in layers.iter().enumerate() {
            if !(layer.onset_seconds >= 0.0) {
                return Err(Error::InvalidSynth {
                    reason: format!("onset {}s must not be negative", layer.onset_seconds),
                });
            }
            let offset = self.frame_count(layer.onset_seconds);
            if offset >= total {
                continue;
            }
            let len_seconds = (total - offset) as f32 / self.sample_rate as f32;
            let noise_seed = self.seed ^ (idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            let voice = self.render(&layer.params, len_seconds, noise_seed)?;
            for (acc, s) in mix[offset..].iter_mut().zip(voice) {
                *acc = (*acc + s).clamp(-MIX_CEILING, MIX_CEILING);
            }
        }

        let samples = mix
            .into_iter()
            .map(|s| (s * i16::MAX as f32).round() as i16)
            .collect();
        Ok(AudioBuffer {
            sample_rate: self.sample_rate,
            bit_depth: BIT_DEPTH,
            channel_count: CHANNEL_COUNT,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thump_envelope_decays() {
        let synth = AudioSynthesizer::default();
        let params = SynthParams::thump(60.0, 0.8, 0.05);
        let samples = synth.render(&params, 0.4, 0).unwrap();
        assert_eq!(samples.len(), synth.frame_count(0.4));

        let window_peak = |from: usize| {
            samples[from..from + 2_000]
                .iter()
                .fold(0.0f32, |m, s| m.max(s.abs()))
        };
        let early = window_peak(0);
        let late = window_peak(12_000);
        assert!(early > 0.5);
        assert!(late < early * 0.05);
    }

    #[test]
    fn test_thump_matches_formula() {
        let synth = AudioSynthesizer::default();
        let params = SynthParams::thump(100.0, 0.5, 0.1);
        let samples = synth.render(&params, 0.01, 0).unwrap();
        let i = 100;
        let t = i as f32 / SAMPLE_RATE as f32;
        let expected = 0.5 * (std::f32::consts::TAU * 100.0 * t).sin() * (-t / 0.1).exp();
        assert!((samples[i] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_noise_is_seeded() {
        let synth = AudioSynthesizer::default();
        let params = SynthParams::click(0.5, 0.02);
        let a = synth.render(&params, 0.05, 7).unwrap();
        let b = synth.render(&params, 0.05, 7).unwrap();
        let c = synth.render(&params, 0.05, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|s| s.abs() <= 0.5));
    }

    #[test]
    fn test_compose_is_reproducible() {
        let synth = AudioSynthesizer::default();
        let layers = [
            Layer::at(0.0, SynthParams::thump(55.0, 0.8, 0.09)),
            Layer::at(0.0, SynthParams::click(0.3, 0.01)),
        ];
        let a = synth.compose(0.42, &layers).unwrap();
        let b = synth.compose(0.42, &layers).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.samples().len(), 18_522);
        assert_eq!(a.data_size(), 37_044);
    }

    #[test]
    fn test_mix_is_clamped() {
        let synth = AudioSynthesizer::default();
        let loud = SynthParams::thump(50.0, 1.0, 10.0);
        let layers = [Layer::at(0.0, loud), Layer::at(0.0, loud), Layer::at(0.0, loud)];
        let buffer = synth.compose(0.1, &layers).unwrap();
        let ceiling = (MIX_CEILING * i16::MAX as f32).round() as i16;
        assert_eq!(buffer.peak(), ceiling);
    }

    #[test]
    fn test_onset_delays_layer() {
        let synth = AudioSynthesizer::default();
        let buffer = synth
            .compose(0.3, &[Layer::at(0.1, SynthParams::click(0.8, 0.05))])
            .unwrap();
        let onset = synth.frame_count(0.1);
        assert!(buffer.samples()[..onset].iter().all(|&s| s == 0));
        assert!(buffer.samples()[onset..onset + 100].iter().any(|&s| s != 0));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let synth = AudioSynthesizer::default();
        assert!(synth.render(&SynthParams::thump(0.0, 0.5, 0.1), 0.1, 0).is_err());
        assert!(synth.render(&SynthParams::thump(60.0, 1.5, 0.1), 0.1, 0).is_err());
        assert!(synth.render(&SynthParams::click(0.5, 0.0), 0.1, 0).is_err());
        assert!(synth.compose(0.0, &[]).is_err());
        assert!(
            synth
                .compose(0.1, &[Layer::at(-0.1, SynthParams::click(0.5, 0.1))])
                .is_err()
        );
    }
}
