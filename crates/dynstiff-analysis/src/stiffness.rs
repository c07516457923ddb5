//! Acceleration FRF inversion to complex dynamic stiffness.
//!
//! K(f) = -ω² / H(f) is ill-conditioned wherever the response vanishes, so
//! antiresonant bins are located first and their stiffness is reconstructed
//! from the well-conditioned neighbours by interpolating the real and
//! imaginary parts separately.

use crate::config::{AntiresonanceConfig, DisplayConfig};
use crate::error::AnalysisError;
use crate::stats::{interp, median};
use rustfft::num_complex::Complex64;
use serde::Serialize;
use std::f64::consts::PI;

/// Complex dynamic stiffness on the FRF frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct StiffnessSpectrum {
    /// Frequency bins (Hz).
    pub frequencies: Vec<f64>,
    /// Complex stiffness (N/m).
    pub stiffness: Vec<Complex64>,
    /// Bins flagged as antiresonant.
    pub antiresonant: Vec<bool>,
    /// Bins inverted directly (the rest are interpolated).
    pub valid: Vec<bool>,
    /// Detection threshold that was applied (dB).
    pub threshold_db: f64,
}

impl StiffnessSpectrum {
    /// |K| in N/m.
    pub fn magnitude(&self) -> Vec<f64> {
        self.stiffness.iter().map(|k| k.norm()).collect()
    }

    /// Wrapped phase of K in degrees.
    pub fn phase_deg(&self) -> Vec<f64> {
        self.stiffness.iter().map(|k| k.arg().to_degrees()).collect()
    }

    /// Number of antiresonant bins.
    pub fn antiresonance_count(&self) -> usize {
        self.antiresonant.iter().filter(|a| **a).count()
    }

    /// Whether any bin was inverted directly.
    pub fn has_valid_bins(&self) -> bool {
        self.valid.iter().any(|v| *v)
    }
}

/// Stiffness restricted to the bins worth displaying.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StiffnessView {
    /// Frequency bins (Hz).
    pub frequencies: Vec<f64>,
    /// |K| (N/m).
    pub magnitude: Vec<f64>,
    /// Phase of K (degrees).
    pub phase_deg: Vec<f64>,
}

impl StiffnessView {
    /// |K| in N/mm.
    pub fn magnitude_n_per_mm(&self) -> Vec<f64> {
        self.magnitude.iter().map(|m| m / 1000.0).collect()
    }

    /// Number of displayed bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether no bin is displayed.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Flag bins where |H| sits in a deep, coherent notch.
///
/// Returns the mask and the threshold in dB, `max(floor_db, median + margin_db)`.
pub fn detect_antiresonances(
    frf: &[Complex64],
    coherence: &[f64],
    config: &AntiresonanceConfig,
) -> (Vec<bool>, f64) {
    let db: Vec<f64> = frf
        .iter()
        .map(|h| 20.0 * (h.norm() + 1e-12).log10())
        .collect();
    let Some(floor) = median(&db) else {
        return (Vec::new(), config.floor_db);
    };
    let threshold = config.floor_db.max(floor + config.margin_db);

    let mask = db
        .iter()
        .zip(coherence)
        .map(|(&level, &coh)| level < threshold && coh > config.min_coherence)
        .collect();
    (mask, threshold)
}

/// Invert an acceleration FRF to dynamic stiffness.
///
/// Bins that are antiresonant or whose |H| is at or below
/// `config.min_magnitude` are filled by linear interpolation from the
/// directly inverted bins. Without any such bin the spectrum is all zero.
pub fn dynamic_stiffness(
    frequencies: &[f64],
    frf: &[Complex64],
    coherence: &[f64],
    config: &AntiresonanceConfig,
) -> StiffnessSpectrum {
    let (antiresonant, threshold_db) = detect_antiresonances(frf, coherence, config);
    let valid: Vec<bool> = frf
        .iter()
        .zip(&antiresonant)
        .map(|(h, &anti)| !anti && h.norm() > config.min_magnitude)
        .collect();

    let mut stiffness = vec![Complex64::new(0.0, 0.0); frf.len()];
    let mut control_f = Vec::new();
    let mut control_re = Vec::new();
    let mut control_im = Vec::new();

    for (i, (&f, h)) in frequencies.iter().zip(frf).enumerate() {
        if valid[i] {
            let omega = 2.0 * PI * f;
            let k = Complex64::new(-omega * omega, 0.0) / *h;
            stiffness[i] = k;
            control_f.push(f);
            control_re.push(k.re);
            control_im.push(k.im);
        }
    }

    if control_f.is_empty() {
        tracing::warn!("no invertible frf bins, stiffness set to zero");
    } else {
        for (i, &f) in frequencies.iter().enumerate() {
            if !valid[i] {
                stiffness[i] = Complex64::new(
                    interp(f, &control_f, &control_re),
                    interp(f, &control_f, &control_im),
                );
            }
        }
    }

    let result = StiffnessSpectrum {
        frequencies: frequencies.to_vec(),
        stiffness,
        antiresonant,
        valid,
        threshold_db,
    };
    tracing::debug!(
        threshold_db,
        antiresonances = result.antiresonance_count(),
        "dynamic stiffness"
    );
    result
}

/// Restrict a stiffness spectrum to bins with enough force excitation.
///
/// A bin is kept when `f >= min_frequency`, the force auto-spectrum exceeds
/// `max(min_force_psd, force_fraction · max S_ff)` and every value involved
/// is finite.
pub fn display_view(
    stiffness: &StiffnessSpectrum,
    s_ff: &[f64],
    config: &DisplayConfig,
) -> Result<StiffnessView, AnalysisError> {
    let peak = s_ff
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !peak.is_finite() {
        return Err(AnalysisError::NoValidFrequencyBins);
    }
    let threshold = config.min_force_psd.max(config.force_fraction * peak);

    let magnitude = stiffness.magnitude();
    let phase = stiffness.phase_deg();
    let mut view = StiffnessView {
        frequencies: Vec::new(),
        magnitude: Vec::new(),
        phase_deg: Vec::new(),
    };

    for (i, (&f, &sff)) in stiffness.frequencies.iter().zip(s_ff).enumerate() {
        let keep = f.is_finite()
            && f >= config.min_frequency
            && sff.is_finite()
            && sff > threshold
            && magnitude[i].is_finite()
            && phase[i].is_finite();
        if keep {
            view.frequencies.push(f);
            view.magnitude.push(magnitude[i]);
            view.phase_deg.push(phase[i]);
        }
    }

    if view.is_empty() {
        return Err(AnalysisError::NoValidFrequencyBins);
    }
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accelerance of a single-degree-of-freedom oscillator.
    fn sdof_accelerance(f: f64, k: f64, m: f64, c: f64) -> Complex64 {
        let w = 2.0 * PI * f;
        let denom = Complex64::new(k - m * w * w, c * w);
        Complex64::new(-w * w, 0.0) / denom
    }

    #[test]
    fn test_inversion_recovers_sdof_stiffness() {
        let (k, m, c) = (1.0e6, 2.0, 50.0);
        let freqs: Vec<f64> = (1..200).map(|i| i as f64 * 2.0).collect();
        let frf: Vec<Complex64> = freqs.iter().map(|&f| sdof_accelerance(f, k, m, c)).collect();
        // Low coherence everywhere: nothing may be flagged
        let coherence = vec![0.5; freqs.len()];
        let result = dynamic_stiffness(&freqs, &frf, &coherence, &AntiresonanceConfig::default());

        assert_eq!(result.antiresonance_count(), 0);
        for (&f, kd) in freqs.iter().zip(&result.stiffness) {
            let w = 2.0 * PI * f;
            let expected = Complex64::new(k - m * w * w, c * w);
            assert!((*kd - expected).norm() / expected.norm() < 1e-9);
        }
    }

    #[test]
    fn test_antiresonance_threshold_and_coherence_gate() {
        let mut frf = vec![Complex64::new(1000.0, 0.0); 11];
        frf[5] = Complex64::new(0.1, 0.0); // -20 dB notch
        let config = AntiresonanceConfig::default();

        // median 60 dB -> threshold max(-35, 70) = 70 dB
        let (mask, threshold) = detect_antiresonances(&frf, &[0.9; 11], &config);
        assert!((threshold - 70.0).abs() < 1e-9);
        assert!(mask.iter().all(|m| *m));

        // Incoherent bins are never flagged
        let (mask, _) = detect_antiresonances(&frf, &[0.5; 11], &config);
        assert!(mask.iter().all(|m| !*m));

        // Quiet FRF: the absolute floor wins
        let quiet = vec![Complex64::new(1e-3, 0.0); 11];
        let (_, threshold) = detect_antiresonances(&quiet, &[0.9; 11], &config);
        assert_eq!(threshold, -35.0);
    }

    #[test]
    fn test_notch_is_interpolated() {
        let freqs: Vec<f64> = (0..11).map(|i| 10.0 + i as f64).collect();
        let mut frf = vec![Complex64::new(-1000.0, 0.0); 11];
        frf[5] = Complex64::new(-1e-3, 0.0);
        let coherence = vec![0.95; 11];

        // Threshold max(-35, 60 - 30) = 30 dB isolates the notch
        let config = AntiresonanceConfig {
            margin_db: -30.0,
            ..AntiresonanceConfig::default()
        };
        let result = dynamic_stiffness(&freqs, &frf, &coherence, &config);
        assert_eq!(result.antiresonant.iter().position(|a| *a), Some(5));
        assert_eq!(result.antiresonance_count(), 1);
        assert!(!result.valid[5]);

        let k = |f: f64| (2.0 * PI * f).powi(2) / 1000.0;
        let expected = 0.5 * (k(14.0) + k(16.0));
        assert!((result.stiffness[5].re - expected).abs() < 1e-9);
        assert!(result.stiffness[5].im.abs() < 1e-12);
    }

    #[test]
    fn test_no_valid_bins_gives_zero_stiffness() {
        let freqs = vec![1.0, 2.0, 3.0];
        let frf = vec![Complex64::new(0.0, 0.0); 3];
        let result = dynamic_stiffness(&freqs, &frf, &[0.0; 3], &AntiresonanceConfig::default());
        assert!(!result.has_valid_bins());
        assert!(result.stiffness.iter().all(|k| k.norm() == 0.0));
    }

    #[test]
    fn test_display_view_masks_weak_force_and_low_frequency() {
        let spectrum = StiffnessSpectrum {
            frequencies: vec![0.0, 10.0, 20.0, 30.0],
            stiffness: vec![Complex64::new(1.0, 0.0); 4],
            antiresonant: vec![false; 4],
            valid: vec![true; 4],
            threshold_db: -35.0,
        };
        let s_ff = [1.0, 1.0, 0.001, 0.5];
        let view = display_view(&spectrum, &s_ff, &DisplayConfig::default()).unwrap();
        assert_eq!(view.frequencies, vec![10.0, 30.0]);
        assert_eq!(view.magnitude_n_per_mm(), vec![0.001, 0.001]);
        assert_eq!(view.phase_deg, vec![0.0, 0.0]);
    }

    #[test]
    fn test_display_view_empty_is_error() {
        let spectrum = StiffnessSpectrum {
            frequencies: vec![0.0, 0.05],
            stiffness: vec![Complex64::new(1.0, 0.0); 2],
            antiresonant: vec![false; 2],
            valid: vec![true; 2],
            threshold_db: -35.0,
        };
        let err = display_view(&spectrum, &[1.0, 1.0], &DisplayConfig::default()).unwrap_err();
        assert_eq!(err, AnalysisError::NoValidFrequencyBins);
    }
}
