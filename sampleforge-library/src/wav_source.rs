//! `hound`-backed implementation of `WavPcmSource` (spec.md §6's WAV
//! decoder boundary).

use hound::{SampleFormat, WavReader};
use sampleforge_collect::WavPcmSource;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavOpenError {
    #[error("failed to open WAV file: {0}")]
    Hound(#[from] hound::Error),
}

/// A fully decoded WAV file, read once up front. `hound` only decodes
/// integer PCM or float samples; float samples are rescaled to the integer
/// domain `HoundWavSource` presents to the resolver.
pub struct HoundWavSource {
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
    samples: Vec<i32>,
    has_sampler_loops: bool,
}

impl HoundWavSource {
    pub fn open(path: &Path) -> Result<Self, WavOpenError> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<i32> = match spec.sample_format {
            SampleFormat::Int => reader.samples::<i32>().filter_map(Result::ok).collect(),
            SampleFormat::Float => reader
                .samples::<f32>()
                .filter_map(Result::ok)
                .map(|s| (s * i16::MAX as f32) as i32)
                .collect(),
        };

        let bits_per_sample = if spec.sample_format == SampleFormat::Float {
            16
        } else {
            spec.bits_per_sample
        };

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample,
            samples,
            // hound does not expose `smpl` chunk loop points; sampler loop
            // detection is left to a richer decoder than this reference
            // implementation needs.
            has_sampler_loops: false,
        })
    }
}

impl WavPcmSource for HoundWavSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
    fn channels(&self) -> u16 {
        self.channels
    }
    fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }
    fn interleaved_samples(&self) -> &[i32] {
        &self.samples
    }
    fn has_sampler_loops(&self) -> bool {
        self.has_sampler_loops
    }
}
