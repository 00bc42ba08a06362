//! RIFF/WAVE container for synthesized buffers
//!
//! Encoded bytes are self-describing (rate, depth, channels and a correctly
//! sized data chunk), so a host can play them with no extra metadata.

use std::io::Cursor;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::synth::AudioBuffer;
use crate::error::Result;

/// Header fields read back from an encoded container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub channel_count: u16,
    /// Total samples across all channels
    pub sample_count: u32,
    /// PCM payload in bytes
    pub data_size: u32,
}

impl ContainerInfo {
    pub fn duration_seconds(&self) -> f64 {
        let frames = self.sample_count as f64 / self.channel_count.max(1) as f64;
        frames / self.sample_rate as f64
    }
}

fn spec_for(buffer: &AudioBuffer) -> WavSpec {
    WavSpec {
        channels: buffer.channel_count(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: buffer.bit_depth(),
        sample_format: SampleFormat::Int,
    }
}

/// Encode `buffer` into an in-memory WAV file
pub fn encode(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(44 + buffer.data_size()));
    {
        let mut writer = WavWriter::new(&mut cursor, spec_for(buffer))?;
        for &sample in buffer.samples() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Read the header of an encoded container
pub fn decode_info(bytes: &[u8]) -> Result<ContainerInfo> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let sample_count = reader.len();
    Ok(ContainerInfo {
        sample_rate: spec.sample_rate,
        bit_depth: spec.bits_per_sample,
        channel_count: spec.channels,
        sample_count,
        data_size: sample_count * (spec.bits_per_sample as u32 / 8),
    })
}

/// Decode all 16-bit samples
pub fn decode_samples(bytes: &[u8]) -> Result<Vec<i16>> {
    let mut reader = WavReader::new(Cursor::new(bytes))?;
    let samples = reader.samples::<i16>().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(samples)
}

/// Write `buffer` to a `.wav` file on disk
#[cfg(not(target_arch = "wasm32"))]
pub fn write_file(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let mut writer = WavWriter::create(path, spec_for(buffer))?;
    for &sample in buffer.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    log::info!("Wrote {} ({:.2}s)", path.display(), buffer.duration_seconds());
    Ok(())
}
