//! Attribution resolver (C7): runs the filename pass, then a
//! format-specific pass, then reconciles filename guesses against measured
//! audio, publishing exactly one `Sample` per call (spec.md §4.7).

use crate::filename::parse_filename;
use crate::midi::parse_midi;
use crate::sample::{ContainerMetadata, Sample, SampleType};
use crate::traits::{LibrarySink, ResolverConfig, WavPcmSource};
use sampleforge_analysis::{compute_chroma, detect_bpm, estimate_key_from_chroma, normalize_to_mono};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, SystemTime};

/// Outstanding in-flight resolver calls, readable from the outside for
/// progress reporting (spec.md §5).
pub static BACKLOG: AtomicI32 = AtomicI32::new(0);

struct BacklogGuard;

impl BacklogGuard {
    fn enter() -> Self {
        BACKLOG.fetch_add(1, Ordering::SeqCst);
        Self
    }
}

impl Drop for BacklogGuard {
    fn drop(&mut self) {
        BACKLOG.fetch_sub(1, Ordering::SeqCst);
    }
}

const LOOP_THRESHOLD_MS: u128 = 1500;
const ONE_SHOT_THRESHOLD_MS: u128 = 1000;
const MIN_VALID_BPM: u32 = 50;
const MAX_VALID_BPM: u32 = 250;

/// Resolve a WAV sample: filename pass, then decode-driven duration/type
/// inference, then acoustic override of tempo and key (spec.md §4.7 step
/// 2–3). Publishes to `sink` and returns the published record.
pub fn resolve_wav_sample(
    path: &str,
    name: &str,
    modified: SystemTime,
    file_size: u64,
    source: Option<&dyn WavPcmSource>,
    config: &ResolverConfig,
    sink: &dyn LibrarySink,
) -> Sample {
    let _guard = BacklogGuard::enter();

    let mut sample = Sample::new(path, name, modified);
    sample.file_size = file_size;

    let hints = parse_filename(path, name);
    sample.types = hints.types;
    sample.drum_type = hints.drum_type;
    sample.tempo = hints.tempo;
    sample.key = hints.key;

    if let Some(drum) = sample.drum_type {
        sink.ingest_drum(&sample, drum);
    }

    if config.skip_wav_decode {
        sink.ingest_sample(sample.clone());
        return sample;
    }

    if let Some(source) = source {
        let channels = source.channels().max(1) as usize;
        let frames = source.interleaved_samples().len() / channels;
        let duration = Duration::from_secs_f64(frames as f64 / source.sample_rate().max(1) as f64);
        sample.duration = Some(duration);

        let mut is_loop = false;
        let duration_known = duration.as_millis() != 0;
        if duration_known && duration.as_millis() > LOOP_THRESHOLD_MS {
            sample.mark_loop();
            is_loop = true;
        }
        if duration_known && duration.as_millis() < ONE_SHOT_THRESHOLD_MS && !is_loop {
            sample.mark_one_shot();
        }
        if source.has_sampler_loops() {
            sample.mark_loop();
        }
        sample.container_metadata = Some(ContainerMetadata {
            has_sampler_loops: source.has_sampler_loops(),
        });

        let mono = normalize_to_mono(
            source.interleaved_samples(),
            source.channels(),
            source.bits_per_sample(),
        );
        sample.set_pcm(mono);

        let acoustic_bpm = detect_bpm(sample.pcm().unwrap_or(&[]), source.sample_rate());
        if acoustic_bpm >= MIN_VALID_BPM as f32 && acoustic_bpm <= MAX_VALID_BPM as f32 {
            let acoustic_tempo = acoustic_bpm.round() as u32;
            if sample.tempo == 0 {
                sample.tempo = acoustic_tempo;
            } else if sample.tempo != acoustic_tempo {
                tracing::warn!(
                    sample = %sample.display_name,
                    filename_bpm = sample.tempo,
                    acoustic_bpm = acoustic_tempo,
                    "BPM mismatch, trusting acoustic measurement"
                );
                sample.tempo = acoustic_tempo;
            }
        }

        if sample.key_detection_applicable() {
            let chroma = compute_chroma(
                sample.pcm().unwrap_or(&[]),
                source.sample_rate(),
                config.analyze_seconds,
            );
            let candidates = estimate_key_from_chroma(&chroma);
            let acoustic_key = candidates.best.key;
            if sample.key.is_unknown() {
                sample.key = acoustic_key;
            } else if sample.key != acoustic_key {
                tracing::warn!(
                    sample = %sample.display_name,
                    filename_key = %sample.key,
                    acoustic_key = %acoustic_key,
                    "key mismatch, trusting acoustic measurement"
                );
                sample.key = acoustic_key;
            }
        }
    }

    sample.release_pcm();
    sink.ingest_sample(sample.clone());
    sample
}

/// Resolve a MIDI sample: filename pass, then C6 meta-event scan, which
/// only fills fields the filename pass left unset (spec.md §4.7 step 2).
pub fn resolve_midi_sample(
    path: &str,
    name: &str,
    modified: SystemTime,
    file_size: u64,
    midi_bytes: Option<&[u8]>,
    config: &ResolverConfig,
    sink: &dyn LibrarySink,
) -> Sample {
    let _guard = BacklogGuard::enter();

    let mut sample = Sample::new(path, name, modified);
    sample.file_size = file_size;

    let hints = parse_filename(path, name);
    sample.types = hints.types;
    sample.drum_type = hints.drum_type;
    sample.tempo = hints.tempo;
    sample.key = hints.key;
    sample.types.insert(SampleType::Midi);

    if !config.no_midi {
        if let Some(bytes) = midi_bytes {
            if let Ok(info) = parse_midi(bytes) {
                if sample.tempo == 0 && info.tempo > 0 {
                    sample.tempo = info.tempo;
                }
                if sample.key.is_unknown() && !info.key.is_unknown() {
                    sample.key = info.key;
                }
            }
        }
        sink.ingest_midi(&sample);
    }

    sink.ingest_sample(sample.clone());
    sample
}

/// Resolve a sample whose format is not recognized (not a WAV or MIDI
/// file): filename pass only, then publish (spec.md §7's
/// `FormatUnrecognized`, which "yields a Sample with only filename-derived
/// fields" rather than aborting). Mirrors the `default:` branch of the
/// original `Process()`, where the deferred `Library.IngestSample(s)` call
/// set up right after `ParseFilename()` still fires even when the format
/// switch falls through without any type-specific evidence.
pub fn resolve_unknown_sample(
    path: &str,
    name: &str,
    modified: SystemTime,
    file_size: u64,
    sink: &dyn LibrarySink,
) -> Sample {
    let _guard = BacklogGuard::enter();

    let mut sample = Sample::new(path, name, modified);
    sample.file_size = file_size;

    let hints = parse_filename(path, name);
    sample.types = hints.types;
    sample.drum_type = hints.drum_type;
    sample.tempo = hints.tempo;
    sample.key = hints.key;

    if let Some(drum) = sample.drum_type {
        sink.ingest_drum(&sample, drum);
    }

    sink.ingest_sample(sample.clone());
    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::DrumType;
    use std::sync::Mutex;

    struct FakeWav {
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
        samples: Vec<i32>,
        loops: bool,
    }

    impl WavPcmSource for FakeWav {
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
            self.loops
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        published: Mutex<Vec<Sample>>,
    }

    impl LibrarySink for RecordingSink {
        fn ingest_sample(&self, sample: Sample) {
            self.published.lock().unwrap().push(sample);
        }
        fn ingest_drum(&self, _sample: &Sample, _drum: DrumType) {}
        fn ingest_midi(&self, _sample: &Sample) {}
    }

    #[test]
    fn short_wav_is_one_shot_and_skips_key_detection() {
        let sample_rate = 44100u32;
        let samples: Vec<i32> = vec![0; (sample_rate as usize / 1000) * 300]; // 300ms silence
        let wav = FakeWav {
            sample_rate,
            channels: 1,
            bits_per_sample: 16,
            samples,
            loops: false,
        };
        let sink = RecordingSink::default();
        let config = ResolverConfig::default();
        let sample = resolve_wav_sample(
            "/samples/hit.wav",
            "hit.wav",
            SystemTime::now(),
            1024,
            Some(&wav),
            &config,
            &sink,
        );
        assert!(sample.is_type(SampleType::OneShot));
        assert!(!sample.is_type(SampleType::Loop));
        assert!(sample.key.is_unknown());
    }

    #[test]
    fn zero_length_wav_is_not_classified_one_shot() {
        // Empty PCM -> zero frames -> zero duration, which is "unknown", not
        // "short", so it must not be classified OneShot or Loop.
        let wav = FakeWav {
            sample_rate: 44100,
            channels: 1,
            bits_per_sample: 16,
            samples: Vec::new(),
            loops: false,
        };
        let sink = RecordingSink::default();
        let config = ResolverConfig::default();
        let sample = resolve_wav_sample(
            "/samples/empty.wav",
            "empty.wav",
            SystemTime::now(),
            0,
            Some(&wav),
            &config,
            &sink,
        );
        assert!(!sample.is_type(SampleType::OneShot));
        assert!(!sample.is_type(SampleType::Loop));
    }

    #[test]
    fn pcm_is_released_before_publication() {
        let sample_rate = 44100u32;
        let samples: Vec<i32> = vec![0; sample_rate as usize * 2];
        let wav = FakeWav {
            sample_rate,
            channels: 1,
            bits_per_sample: 16,
            samples,
            loops: false,
        };
        let sink = RecordingSink::default();
        let config = ResolverConfig::default();
        let sample = resolve_wav_sample(
            "/samples/loop.wav",
            "loop.wav",
            SystemTime::now(),
            4096,
            Some(&wav),
            &config,
            &sink,
        );
        assert!(sample.pcm().is_none());
        assert!(sink.published.lock().unwrap()[0].pcm().is_none());
    }

    #[test]
    fn skip_wav_decode_yields_filename_only_sample() {
        let sink = RecordingSink::default();
        let config = ResolverConfig {
            skip_wav_decode: true,
            ..Default::default()
        };
        let sample = resolve_wav_sample(
            "/samples/HiHats/hat_120_open.wav",
            "hat_120_open.wav",
            SystemTime::now(),
            2048,
            None,
            &config,
            &sink,
        );
        assert_eq!(sample.tempo, 120);
        assert!(sample.duration.is_none());
        assert_eq!(sink.published.lock().unwrap().len(), 1);
    }

    #[test]
    fn midi_fills_only_unset_fields() {
        // Set Tempo -> 120bpm, Key Signature sf=2 mi=0 -> D major.
        fn var_len(mut value: u32) -> Vec<u8> {
            let mut bytes = vec![(value & 0x7F) as u8];
            value >>= 7;
            while value > 0 {
                bytes.push(((value & 0x7F) as u8) | 0x80);
                value >>= 7;
            }
            bytes.reverse();
            bytes
        }
        fn meta(delta: u32, meta_type: u8, payload: &[u8]) -> Vec<u8> {
            let mut out = var_len(delta);
            out.push(0xFF);
            out.push(meta_type);
            out.extend(var_len(payload.len() as u32));
            out.extend_from_slice(payload);
            out
        }
        let mut track = meta(0, 0x51, &[0x07, 0xA1, 0x20]);
        track.extend(meta(0, 0x59, &[2, 0]));
        let mut file = Vec::new();
        file.extend_from_slice(b"MThd");
        file.extend_from_slice(&6u32.to_be_bytes());
        file.extend_from_slice(&0u16.to_be_bytes());
        file.extend_from_slice(&1u16.to_be_bytes());
        file.extend_from_slice(&480u16.to_be_bytes());
        file.extend_from_slice(b"MTrk");
        file.extend_from_slice(&(track.len() as u32).to_be_bytes());
        file.extend_from_slice(&track);

        let sink = RecordingSink::default();
        let config = ResolverConfig::default();
        // Filename already sets tempo to 140 via a plain numeric token; MIDI
        // tempo must not overwrite it, only the unset key.
        let sample = resolve_midi_sample(
            "/samples/loop_140_song.mid",
            "loop_140_song.mid",
            SystemTime::now(),
            512,
            Some(&file),
            &config,
            &sink,
        );
        assert_eq!(sample.tempo, 140);
        assert_eq!(sample.key.root.unwrap().pitch_class(), 2); // D
    }

    #[test]
    fn unknown_format_still_publishes_filename_only_sample() {
        let sink = RecordingSink::default();
        let sample = resolve_unknown_sample(
            "/samples/Kicks/kick_sub_808.aiff",
            "kick_sub_808.aiff",
            SystemTime::now(),
            256,
            &sink,
        );
        assert_eq!(sample.drum_type, Some(DrumType::Kick));
        assert!(sample.duration.is_none());
        assert_eq!(sink.published.lock().unwrap().len(), 1);
    }
}
