//! Minimal in-memory `LibrarySink` implementation: the reference shape of
//! "the library index" spec.md declares opaque, grouping samples by
//! tempo/key/drum-type the way the original `Collection` struct does.

use sampleforge_analysis::Key;
use sampleforge_collect::{DrumType, LibrarySink, Sample};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Indexes {
    by_tempo: HashMap<u32, Vec<String>>,
    by_key: HashMap<Key, Vec<String>>,
    by_drum: HashMap<DrumType, Vec<String>>,
    /// Dedup key: path + file size + modified time, mirroring the
    /// teacher's cache-invalidation key (`ole-library/cache.rs`).
    seen: HashMap<String, u64>,
    samples: Vec<Sample>,
}

/// An in-memory library index. Not persisted — a real deployment would
/// back this with the same kind of cache the teacher keeps in SQLite, but
/// spec.md excludes persisted state at the core layer, so this is the
/// reference shape only.
#[derive(Default)]
pub struct InMemoryLibrary {
    inner: Mutex<Indexes>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sample at `path` with the given `file_size` has already
    /// been published (cache-invalidation check before re-analysis).
    pub fn is_unchanged(&self, path: &str, file_size: u64) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.seen.get(path).is_some_and(|&size| size == file_size)
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.inner.lock().unwrap().samples.clone()
    }

    pub fn tempos(&self) -> HashMap<u32, Vec<String>> {
        self.inner.lock().unwrap().by_tempo.clone()
    }

    pub fn drum_types(&self) -> HashMap<DrumType, Vec<String>> {
        self.inner.lock().unwrap().by_drum.clone()
    }
}

impl LibrarySink for InMemoryLibrary {
    fn ingest_sample(&self, sample: Sample) {
        let mut inner = self.inner.lock().unwrap();
        inner.seen.insert(sample.path.clone(), sample.file_size);
        if sample.tempo != 0 {
            inner.by_tempo.entry(sample.tempo).or_default().push(sample.path.clone());
        }
        if !sample.key.is_unknown() {
            inner.by_key.entry(sample.key).or_default().push(sample.path.clone());
        }
        inner.samples.push(sample);
    }

    fn ingest_drum(&self, sample: &Sample, drum: DrumType) {
        let mut inner = self.inner.lock().unwrap();
        inner.by_drum.entry(drum).or_default().push(sample.path.clone());
    }

    fn ingest_midi(&self, _sample: &Sample) {
        // No separate MIDI index in this reference implementation; MIDI
        // samples are indexed the same way through ingest_sample.
    }
}
