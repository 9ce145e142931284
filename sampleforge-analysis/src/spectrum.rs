//! Spectral front-end (C2): framing, windowing, magnitude spectrum, and
//! spectral whitening shared by the tuning estimator and the chroma
//! correlator.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Framing parameters and the FFT plan for a given signal length.
///
/// Frame size is 4096 samples with a 2048 hop; both shrink together when
/// the input is shorter than a full frame (spec.md §4.2).
pub struct SpectralFrontEnd {
    pub frame_size: usize,
    pub hop_size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
}

impl SpectralFrontEnd {
    pub fn new(signal_len: usize) -> Self {
        let frame_size = if signal_len < 4096 {
            signal_len.max(1)
        } else {
            4096
        };
        let hop_size = if signal_len < 4096 {
            (frame_size / 2).max(1)
        } else {
            2048
        };

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);

        let window: Vec<f32> = (0..frame_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / frame_size as f32).cos()))
            .collect();

        Self {
            frame_size,
            hop_size,
            fft,
            window,
            fft_buffer: vec![Complex::new(0.0, 0.0); frame_size],
        }
    }

    /// Number of magnitude bins produced per frame: `[0, frame_size/2]`.
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Frequency in Hz represented by a given bin index.
    pub fn bin_freq(&self, bin: usize, sample_rate: u32) -> f32 {
        bin as f32 * sample_rate as f32 / self.frame_size as f32
    }

    /// Frequencies of every bin, `bin_freq(0..num_bins())`.
    pub fn bin_freqs(&self, sample_rate: u32) -> Vec<f32> {
        (0..self.num_bins())
            .map(|b| self.bin_freq(b, sample_rate))
            .collect()
    }

    /// Starting sample offsets of each frame that fully fits in `signal_len`.
    pub fn frame_starts(&self, signal_len: usize) -> impl Iterator<Item = usize> + '_ {
        let frame_size = self.frame_size;
        let hop_size = self.hop_size;
        (0..).map(move |i| i * hop_size).take_while(move |&start| {
            start + frame_size <= signal_len
        })
    }

    /// Apply the Hann window, run the FFT, and return magnitudes for bins
    /// `[0, frame_size/2]`. `frame` must be exactly `frame_size` samples.
    pub fn magnitude_spectrum(&mut self, frame: &[f32]) -> Vec<f32> {
        debug_assert_eq!(frame.len(), self.frame_size);
        for (i, (s, w)) in frame.iter().zip(&self.window).enumerate() {
            self.fft_buffer[i] = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.fft_buffer);
        self.fft_buffer[..self.num_bins()].iter().map(|c| c.norm()).collect()
    }
}

/// Spectral whitening (C2): divide each bin by the mean magnitude in a
/// `W`-bin window centered on it, edges clamped. Bins whose local mean is
/// below `1e-9` are left unchanged.
pub fn whiten(mag: &mut [f32]) {
    const W: usize = 15;
    let half = W / 2;
    let original = mag.to_vec();
    for (i, out) in mag.iter_mut().enumerate() {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(original.len());
        let window = &original[start..end];
        let avg: f32 = window.iter().sum::<f32>() / window.len() as f32;
        if avg > 1e-9 {
            *out = original[i] / avg;
        }
    }
}
