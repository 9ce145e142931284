//! Filename/MIDI attribution and resolution for sampleforge.
//!
//! Builds `Sample` records by combining filename tokenization (C5), a
//! hand-rolled MIDI meta-event scanner (C6), and the acoustic analysis in
//! `sampleforge-analysis` (C1-C4, C8) through the precedence rules of the
//! attribution resolver (C7). Knows nothing about directory scanning or
//! how samples are ultimately indexed — see `sampleforge-library` for
//! that.

mod error;
mod filename;
mod midi;
mod resolver;
mod sample;
mod traits;

pub use error::CollectError;
pub use filename::{parse_filename, FilenameHints};
pub use midi::{parse_midi, MidiInfo, NotMidi};
pub use resolver::{resolve_midi_sample, resolve_unknown_sample, resolve_wav_sample, BACKLOG};
pub use sample::{ContainerMetadata, DrumType, Sample, SampleType};
pub use traits::{LibrarySink, ResolverConfig, WavPcmSource};
