//! Acoustic analysis for sampleforge
//!
//! Envelope/autocorrelation tempo estimation, a shared spectral front-end,
//! tuning-offset compensation, chroma aggregation, Krumhansl–Schmuckler key
//! correlation, and PCM normalization. This crate has no knowledge of
//! filenames, MIDI, or library indices — see `sampleforge-collect` for the
//! attribution pipeline that consumes it.

mod chroma;
mod envelope;
mod key;
mod pcm;
mod spectrum;
mod tuning;

pub use chroma::{compute_chroma, estimate_key_from_chroma, ChromaVector};
pub use envelope::detect_bpm;
pub use key::{Accidental, Key, KeyCandidates, KeyGuess, Mode, NoteLetter, Root};
pub use pcm::normalize_to_mono;
pub use spectrum::{whiten, SpectralFrontEnd};
pub use tuning::estimate_tuning;
