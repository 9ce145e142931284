//! Ambient stack for sampleforge: a text-based config loader, a `hound`
//! WAV decoder, an in-memory library index, and a directory scanner that
//! fans the `sampleforge-collect` resolver out across a worker pool.

mod config;
mod index;
mod scanner;
mod wav_source;

pub use config::Config;
pub use index::InMemoryLibrary;
pub use scanner::{scan, ScanConfig, ScanProgress, ScanSummary};
pub use wav_source::{HoundWavSource, WavOpenError};
