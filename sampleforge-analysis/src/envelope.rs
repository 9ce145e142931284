//! Envelope & autocorrelation (C1): amplitude-envelope tempo estimation.

/// Estimate BPM from a mono signal via full-wave-rectified envelope
/// autocorrelation (spec.md §4.1).
///
/// Downsamples the envelope to ~200Hz, searches lags corresponding to the
/// 60-200 BPM band for the lag with the highest mean-lagged product, and
/// converts the winning lag back to BPM. Returns 0 for empty or degenerate
/// input.
pub fn detect_bpm(mono: &[f32], sample_rate: u32) -> f32 {
    if mono.is_empty() || sample_rate == 0 {
        return 0.0;
    }

    let envelope: Vec<f32> = mono.iter().map(|s| s.abs()).collect();

    const TARGET_RATE: u32 = 200;
    let downsample_factor = (sample_rate / TARGET_RATE).max(1) as usize;

    let env_down: Vec<f32> = envelope
        .chunks(downsample_factor)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect();

    let fs_prime = sample_rate / downsample_factor as u32;
    if fs_prime == 0 {
        return 0.0;
    }

    let l_min = (fs_prime as f64 * 60.0 / 200.0).floor() as usize;
    let l_max = (fs_prime as f64 * 60.0 / 60.0).floor() as usize;
    if l_max <= l_min {
        return 0.0;
    }

    let n = env_down.len();
    let mut best_lag = 0usize;
    let mut best_score = f32::MIN;

    for lag in l_min..l_max {
        if lag == 0 || n <= lag {
            continue;
        }
        let count = n - lag;
        let product: f32 = (0..count).map(|i| env_down[i] * env_down[i + lag]).sum();
        let score = product / count as f32;
        if score > best_score {
            best_score = score;
            best_lag = lag;
        }
    }

    if best_lag == 0 {
        return 0.0;
    }

    60.0 * fs_prime as f32 / best_lag as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_zero() {
        assert_eq!(detect_bpm(&[], 44100), 0.0);
    }

    #[test]
    fn short_input_does_not_panic() {
        let mono = vec![0.1f32; 50];
        let bpm = detect_bpm(&mono, 44100);
        assert!(bpm >= 0.0);
    }

    #[test]
    fn periodic_pulse_train_recovers_approximate_bpm() {
        // 120 BPM -> one pulse every 0.5s.
        let sample_rate = 44100u32;
        let period_samples = sample_rate as usize / 2;
        let total = period_samples * 20;
        let mut mono = vec![0.0f32; total];
        let mut i = 0;
        while i < total {
            mono[i] = 1.0;
            i += period_samples;
        }
        let bpm = detect_bpm(&mono, sample_rate);
        assert!((bpm - 120.0).abs() < 5.0, "expected ~120 BPM, got {bpm}");
    }
}
