//! External interfaces (spec.md §6): the boundaries the resolver talks to
//! but does not implement. `sampleforge-library` supplies real
//! implementations of both.

use crate::sample::{DrumType, Sample};

/// A decoded WAV PCM stream. The resolver only needs format facts and the
/// raw interleaved samples; decoding itself is the caller's job.
pub trait WavPcmSource {
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> u16;
    fn bits_per_sample(&self) -> u16;
    fn interleaved_samples(&self) -> &[i32];
    /// Whether the container declares sampler loop points, e.g. a `smpl`
    /// chunk with at least one loop (spec.md §4.7).
    fn has_sampler_loops(&self) -> bool;
}

/// The library index. Internals are opaque to the resolver; it only calls
/// through these entry points (spec.md §6).
pub trait LibrarySink {
    fn ingest_sample(&self, sample: Sample);
    fn ingest_drum(&self, sample: &Sample, drum: DrumType);
    fn ingest_midi(&self, sample: &Sample);
}

/// Injected configuration (spec.md §6). No CLI or env var handling at this
/// layer — `sampleforge-library::Config` is where that lives.
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Disables C1/C4 (WAV decode + acoustic analysis) entirely.
    pub skip_wav_decode: bool,
    /// Disables C6 (MIDI meta-event scan).
    pub no_midi: bool,
    /// Caps chroma input duration, in seconds.
    pub analyze_seconds: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            skip_wav_decode: false,
            no_midi: false,
            analyze_seconds: 4.0,
        }
    }
}
