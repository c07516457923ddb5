//! FFT wrapper and the Hann window

use rustfft::{FftPlanner, num_complex::Complex64};
use std::f64::consts::PI;
use std::sync::Arc;

/// Periodic (DFT-even) Hann window of `size` samples.
///
/// The periodic form matches spectral estimators that average overlapping
/// segments.
pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
        .collect()
}

/// Forward FFT with a cached plan
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(size);
        Self { fft, size }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Perform forward FFT on real input
    ///
    /// Returns complex spectrum (size/2 + 1 bins for positive frequencies)
    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input.iter().map(|&x| Complex64::new(x, 0.0)).collect();

        // Pad or truncate to FFT size
        buffer.resize(self.size, Complex64::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        // Return only positive frequencies (DC to Nyquist)
        buffer.truncate(self.size / 2 + 1);
        buffer
    }
}

/// Frequencies of the one-sided spectrum of an `n`-point real FFT.
///
/// Bin `k` sits at `k * sample_rate / n`; there are `n / 2 + 1` bins.
pub fn rfft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    (0..n / 2 + 1)
        .map(|k| k as f64 * sample_rate / n as f64)
        .collect()
}

/// Hann-windowed magnitude spectrum of a whole record (FFT size = record
/// length).
pub fn magnitude_spectrum(signal: &[f64]) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let windowed: Vec<f64> = signal
        .iter()
        .zip(hann_window(signal.len()))
        .map(|(x, w)| x * w)
        .collect();
    Fft::new(signal.len())
        .forward(&windowed)
        .iter()
        .map(|c| c.norm())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_bin_of_tone() {
        let fft = Fft::new(256);
        assert_eq!(fft.size(), 256);

        let input: Vec<f64> = (0..256)
            .map(|i| (2.0 * PI * 10.0 * i as f64 / 256.0).sin())
            .collect();

        let spectrum = fft.forward(&input);
        assert_eq!(spectrum.len(), 129);
        // N/2 for a unit sine that fits the frame exactly
        assert!((spectrum[10].norm() - 128.0).abs() < 1e-9);
        assert!(spectrum[11].norm() < 1e-9);
    }

    #[test]
    fn test_window_hann() {
        let buffer = hann_window(100);

        // Periodic Hann: zero at the first sample, 1 at n/2
        assert!(buffer[0].abs() < 1e-12);
        assert!(buffer[99] < 0.01);
        assert!((buffer[50] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dc_detection() {
        let fft = Fft::new(256);

        let input = vec![1.0; 256];
        let spectrum = fft.forward(&input);

        let dc_mag = spectrum[0].norm();
        let other_mag: f64 = spectrum[1..].iter().map(|c| c.norm()).sum();

        assert!(dc_mag > other_mag * 10.0);
    }

    #[test]
    fn test_rfft_frequencies_end_at_nyquist() {
        let freqs = rfft_frequencies(1024, 1000.0);
        assert_eq!(freqs.len(), 513);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[512] - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_magnitude_spectrum_peak() {
        let fs = 1000.0;
        let signal: Vec<f64> = (0..1000)
            .map(|i| (2.0 * PI * 125.0 * i as f64 / fs).sin())
            .collect();
        let mag = magnitude_spectrum(&signal);
        let peak = mag
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 125);
    }
}
