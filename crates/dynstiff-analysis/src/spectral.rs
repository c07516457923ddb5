//! Averaged periodogram (Welch) estimation of auto- and cross-spectra.
//!
//! Segments are mean-removed, Hann-tapered and overlap by half. Spectra are
//! one-sided power densities (units²/Hz): every bin except DC and Nyquist is
//! doubled and the average is scaled by `1 / (fs · Σw²)`.

use crate::config::SpectralConfig;
use crate::error::AnalysisError;
use crate::fft::{Fft, hann_window, rfft_frequencies};
use rustfft::num_complex::Complex64;

/// Auto-spectra of force and response plus their cross-spectrum, on a
/// shared frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSpectra {
    /// Frequency bins (Hz), from 0 to Nyquist.
    pub frequencies: Vec<f64>,
    /// Force auto-spectral density S_ff.
    pub s_ff: Vec<f64>,
    /// Response auto-spectral density S_xx.
    pub s_xx: Vec<f64>,
    /// Cross-spectral density S_xf = E[X · conj(F)].
    pub s_xf: Vec<Complex64>,
    /// Segment length used.
    pub segment_len: usize,
    /// Number of averaged segments.
    pub num_segments: usize,
}

impl CrossSpectra {
    /// Number of frequency bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether there are no bins.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Segment length for a record of `total` samples.
///
/// `min(max_segment, total / target_segments)` floored at `min_segment`,
/// rounded down to an even length so the last bin falls on Nyquist, and
/// never longer than the record.
pub fn segment_length(total: usize, config: &SpectralConfig) -> usize {
    let target = config.target_segments.max(1);
    let nperseg = (total / target)
        .min(config.max_segment)
        .max(config.min_segment)
        .min(total);
    if nperseg > 2 { nperseg & !1 } else { nperseg }
}

/// Welch estimator with a fixed segment length and 50 % overlap.
pub struct WelchEstimator {
    segment_len: usize,
    overlap: usize,
    sample_rate: f64,
    window: Vec<f64>,
    /// `1 / (fs · Σw²)`, the two-sided density scale.
    density_base: f64,
    fft: Fft,
}

impl WelchEstimator {
    /// Create an estimator for segments of `segment_len` samples.
    pub fn new(sample_rate: f64, segment_len: usize) -> Self {
        let window = hann_window(segment_len);
        let win_power: f64 = window.iter().map(|w| w * w).sum();
        Self {
            segment_len,
            overlap: segment_len / 2,
            sample_rate,
            density_base: 1.0 / (sample_rate * win_power),
            window,
            fft: Fft::new(segment_len),
        }
    }

    /// Segment length.
    pub fn segment_len(&self) -> usize {
        self.segment_len
    }

    /// Overlap in samples.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Start indices of the averaged segments.
    pub fn segment_starts(&self, len: usize) -> Vec<usize> {
        let step = (self.segment_len - self.overlap).max(1);
        if self.segment_len == 0 || len < self.segment_len {
            return Vec::new();
        }
        (0..=(len - self.segment_len)).step_by(step).collect()
    }

    /// Frequency axis of the estimates.
    pub fn frequencies(&self) -> Vec<f64> {
        rfft_frequencies(self.segment_len, self.sample_rate)
    }

    fn segment_spectrum(&self, segment: &[f64]) -> Vec<Complex64> {
        let mean = segment.iter().sum::<f64>() / segment.len() as f64;
        let tapered: Vec<f64> = segment
            .iter()
            .zip(&self.window)
            .map(|(s, w)| (s - mean) * w)
            .collect();
        self.fft.forward(&tapered)
    }

    fn density_scale(&self, bin: usize, num_bins: usize) -> f64 {
        let nyquist = self.segment_len.is_multiple_of(2) && bin == num_bins - 1;
        if bin == 0 || nyquist { self.density_base } else { 2.0 * self.density_base }
    }

    /// Averaged auto-spectral density of `signal`.
    pub fn psd(&self, signal: &[f64]) -> Vec<f64> {
        let starts = self.segment_starts(signal.len());
        let num_bins = self.segment_len / 2 + 1;
        let mut acc = vec![0.0; num_bins];
        if starts.is_empty() {
            return acc;
        }
        for &start in &starts {
            let spectrum = self.segment_spectrum(&signal[start..start + self.segment_len]);
            for (a, c) in acc.iter_mut().zip(&spectrum) {
                *a += c.norm_sqr();
            }
        }
        let count = starts.len() as f64;
        acc.iter()
            .enumerate()
            .map(|(k, a)| a / count * self.density_scale(k, num_bins))
            .collect()
    }

    /// Averaged cross-spectral density E[Y · conj(X)] of `x` (reference) and
    /// `y` (response).
    pub fn csd(&self, x: &[f64], y: &[f64]) -> Vec<Complex64> {
        let len = x.len().min(y.len());
        let starts = self.segment_starts(len);
        let num_bins = self.segment_len / 2 + 1;
        let mut acc = vec![Complex64::new(0.0, 0.0); num_bins];
        if starts.is_empty() {
            return acc;
        }
        for &start in &starts {
            let end = start + self.segment_len;
            let sx = self.segment_spectrum(&x[start..end]);
            let sy = self.segment_spectrum(&y[start..end]);
            for ((a, cx), cy) in acc.iter_mut().zip(&sx).zip(&sy) {
                *a += *cy * cx.conj();
            }
        }
        let count = starts.len() as f64;
        acc.iter()
            .enumerate()
            .map(|(k, a)| *a / count * self.density_scale(k, num_bins))
            .collect()
    }
}

/// Estimate S_ff, S_xx and S_xf for a windowed force and response.
///
/// Fails with [`AnalysisError::InsufficientData`] below
/// `config.min_samples` samples.
pub fn estimate_cross_spectra(
    force: &[f64],
    response: &[f64],
    sample_rate: f64,
    config: &SpectralConfig,
) -> Result<CrossSpectra, AnalysisError> {
    let total = force.len().min(response.len());
    if total < config.min_samples {
        return Err(AnalysisError::insufficient("frf", config.min_samples, total));
    }

    let nperseg = segment_length(total, config);
    let welch = WelchEstimator::new(sample_rate, nperseg);
    let num_segments = welch.segment_starts(total).len();
    tracing::debug!(nperseg, noverlap = welch.overlap(), num_segments, "welch parameters");

    let force = &force[..total];
    let response = &response[..total];

    Ok(CrossSpectra {
        frequencies: welch.frequencies(),
        s_ff: welch.psd(force),
        s_xx: welch.psd(response),
        s_xf: welch.csd(force, response),
        segment_len: nperseg,
        num_segments,
    })
}
