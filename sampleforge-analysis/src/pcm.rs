//! PCM normalizer (C8): multi-channel integer PCM -> mono float32 in
//! `[-1, 1]`.

/// Full-scale divisor for a given bit depth, per spec.md §6 (8-bit uses
/// 128.0, not the usual signed 2^(bits-1) midpoint quirk some codecs use).
fn full_scale(bits_per_sample: u16) -> f32 {
    match bits_per_sample {
        8 => 128.0,
        n => 2f32.powi(n as i32 - 1),
    }
}

/// Average interleaved integer PCM samples across channels and normalize to
/// `[-1, 1]` mono float32.
pub fn normalize_to_mono(interleaved: &[i32], channels: u16, bits_per_sample: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    let scale = full_scale(bits_per_sample);
    interleaved
        .chunks(channels)
        .map(|frame| {
            let sum: f64 = frame.iter().map(|&s| s as f64).sum();
            (sum / frame.len() as f64 / scale as f64) as f32
        })
        .collect()
}
