//! Sample data model (spec.md §3): the record the attribution resolver
//! (C7) builds up and eventually hands to the library index.

use sampleforge_analysis::Key;
use std::collections::HashSet;
use std::time::{Duration, SystemTime};

/// Instrument-role / playback-role tags a `Sample` can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    Drum,
    Melodic,
    Loop,
    OneShot,
    Midi,
}

/// Drum subtype, set alongside `SampleType::Drum` when the filename's
/// parent directory names one (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumType {
    Snare,
    Kick,
    HiHat,
    HatOpen,
    HatClosed,
    Drum808,
    Tom,
    Percussion,
}

/// Opaque container metadata carried alongside a decoded WAV. The only
/// field the resolver inspects is whether the container declares sampler
/// loop points (spec.md §4.7); everything else about the container is the
/// external decoder's business.
#[derive(Debug, Clone, Default)]
pub struct ContainerMetadata {
    pub has_sampler_loops: bool,
}

/// A sample under analysis. Owned exclusively by the resolver during
/// analysis, then transferred by value to the library index (spec.md §3).
#[derive(Debug, Clone)]
pub struct Sample {
    pub path: String,
    pub display_name: String,
    pub modified: SystemTime,
    pub file_size: u64,
    pub duration: Option<Duration>,
    /// 0 = unknown. Reconciled values are always 0 or in [50, 250]
    /// (spec.md §3 invariant); estimates outside that band are discarded
    /// during resolution, not clamped.
    pub tempo: u32,
    pub key: Key,
    pub types: HashSet<SampleType>,
    pub drum_type: Option<DrumType>,
    pub container_metadata: Option<ContainerMetadata>,
    /// Raw decoded mono frames, held only for the duration of analysis and
    /// cleared before the sample is published (spec.md §3).
    pcm: Option<Vec<f32>>,
}

impl Sample {
    pub fn new(path: impl Into<String>, display_name: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
            modified,
            file_size: 0,
            duration: None,
            tempo: 0,
            key: Key::unknown(),
            types: HashSet::new(),
            drum_type: None,
            container_metadata: None,
            pcm: None,
        }
    }

    pub fn is_type(&self, t: SampleType) -> bool {
        self.types.contains(&t)
    }

    /// Mark the sample as a loop, enforcing the Loop/OneShot exclusivity
    /// invariant.
    pub fn mark_loop(&mut self) {
        self.types.remove(&SampleType::OneShot);
        self.types.insert(SampleType::Loop);
    }

    /// Mark the sample as a one-shot, enforcing the Loop/OneShot
    /// exclusivity invariant.
    pub fn mark_one_shot(&mut self) {
        self.types.remove(&SampleType::Loop);
        self.types.insert(SampleType::OneShot);
    }

    /// Key detection is only meaningful for non-one-shot samples
    /// (spec.md §3 invariant).
    pub fn key_detection_applicable(&self) -> bool {
        !self.is_type(SampleType::OneShot)
    }

    /// Attach decoded PCM for the duration of analysis.
    pub fn set_pcm(&mut self, pcm: Vec<f32>) {
        self.pcm = Some(pcm);
    }

    pub fn pcm(&self) -> Option<&[f32]> {
        self.pcm.as_deref()
    }

    /// Release the transient PCM buffer before publication.
    pub fn release_pcm(&mut self) {
        self.pcm = None;
    }
}
