//! Chroma aggregation + key correlator (C4): 12-bin pitch-class energy,
//! correlated against Krumhansl–Schmuckler profiles shifted to all 24 roots.

use crate::key::{Key, KeyCandidates, KeyGuess, Mode, Root};
use crate::spectrum::{whiten, SpectralFrontEnd};
use crate::tuning::estimate_tuning;

/// 12 non-negative reals, index 0 = C ... 11 = B, summed (then averaged)
/// over frames.
pub type ChromaVector = [f32; 12];

const MIN_CHROMA_FREQ: f32 = 65.0;
const MAX_CHROMA_FREQ: f32 = 2100.0;

/// Krumhansl–Schmuckler major-key profile, index 0 = tonic.
const MAJOR_PROFILE: [f32; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl–Schmuckler minor-key profile, index 0 = tonic.
const MINOR_PROFILE: [f32; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Aggregate chroma across frames of `mono`, truncated to `max_seconds`
/// (spec.md §4.4). The first frame's magnitude spectrum also seeds the
/// tuning offset (C3) applied to every frame's bin-to-pitch-class mapping.
pub fn compute_chroma(mono: &[f32], sample_rate: u32, max_seconds: f32) -> ChromaVector {
    let max_samples = (sample_rate as f32 * max_seconds) as usize;
    let samples = &mono[..mono.len().min(max_samples)];
    if samples.is_empty() {
        return [0.0; 12];
    }

    let mut front_end = SpectralFrontEnd::new(samples.len());
    let bin_freqs = front_end.bin_freqs(sample_rate);

    let mut chroma_sum = [0.0f32; 12];
    let mut frame_count = 0u32;
    let mut tuning_offset: Option<f32> = None;

    let starts: Vec<usize> = front_end.frame_starts(samples.len()).collect();
    for start in starts {
        let frame = &samples[start..start + front_end.frame_size];
        let mut mag = front_end.magnitude_spectrum(frame);

        if tuning_offset.is_none() {
            tuning_offset = Some(estimate_tuning(&mag, &bin_freqs));
        }
        let delta_cents = tuning_offset.unwrap_or(0.0);

        whiten(&mut mag);

        for (bin, &freq) in bin_freqs.iter().enumerate() {
            if freq < MIN_CHROMA_FREQ || freq > MAX_CHROMA_FREQ {
                continue;
            }
            let adjusted_freq = freq * 2f32.powf(-delta_cents / 1200.0);
            let midi = 12.0 * (adjusted_freq / 440.0).log2() + 69.0;
            let pitch_class = (midi.round() as i32).rem_euclid(12) as usize;
            chroma_sum[pitch_class] += mag[bin];
        }
        frame_count += 1;
    }

    if frame_count == 0 {
        return [0.0; 12];
    }
    for v in &mut chroma_sum {
        *v /= frame_count as f32;
    }
    chroma_sum
}

/// Shift a 12-element profile so that `root` becomes the tonic:
/// `P_r[i] = P_base[(i - root + 12) mod 12]`.
fn shift_profile(base: &[f32; 12], root: u8) -> [f32; 12] {
    let mut shifted = [0.0f32; 12];
    for (i, slot) in shifted.iter_mut().enumerate() {
        let src = ((i as i32 - root as i32).rem_euclid(12)) as usize;
        *slot = base[src];
    }
    shifted
}

/// Pearson correlation coefficient between two 12-element vectors. Returns
/// 0 if either variance is 0.
fn correlate(a: &ChromaVector, b: &[f32; 12]) -> f32 {
    let mean_a = a.iter().sum::<f32>() / 12.0;
    let mean_b = b.iter().sum::<f32>() / 12.0;

    let mut cov = 0.0f32;
    let mut var_a = 0.0f32;
    let mut var_b = 0.0f32;
    for i in 0..12 {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a * var_b).sqrt()
}

/// Correlate a chroma vector against all 24 shifted Krumhansl–Schmuckler
/// profiles (12 roots x 2 modes), returning the best guess and top 3
/// (spec.md §4.4).
pub fn estimate_key_from_chroma(chroma: &ChromaVector) -> KeyCandidates {
    let mut guesses = Vec::with_capacity(24);
    for root_pc in 0..12u8 {
        let root = Root::from_pitch_class_sharp(root_pc);
        let major_score = correlate(chroma, &shift_profile(&MAJOR_PROFILE, root_pc));
        let minor_score = correlate(chroma, &shift_profile(&MINOR_PROFILE, root_pc));
        guesses.push(KeyGuess {
            key: Key::new(root, Mode::Major),
            score: major_score,
        });
        guesses.push(KeyGuess {
            key: Key::new(root, Mode::Minor),
            score: minor_score,
        });
    }
    KeyCandidates::from_guesses(guesses)
}
