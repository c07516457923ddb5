//! Frequency response function estimation.
//!
//! H1 = S_xf / S_ff suppresses noise on the response, H2 = S_xx / conj(S_xf)
//! suppresses noise on the force. The composite Hv picks, per bin, the
//! estimator that coherence says is most trustworthy.

use crate::config::FrfConfig;
use crate::spectral::CrossSpectra;
use rustfft::num_complex::Complex64;
use serde::Serialize;

/// Which estimator Hv used at a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrfSource {
    /// H1 (high coherence).
    H1,
    /// Geometric mean of H1 and H2.
    Blend,
    /// H2 (low coherence).
    H2,
}

/// FRF estimates on the frequency axis of the underlying spectra.
#[derive(Debug, Clone, PartialEq)]
pub struct FrfEstimate {
    /// Frequency bins (Hz).
    pub frequencies: Vec<f64>,
    /// H1 estimator.
    pub h1: Vec<Complex64>,
    /// H2 estimator.
    pub h2: Vec<Complex64>,
    /// Coherence-selected composite.
    pub hv: Vec<Complex64>,
    /// Ordinary coherence, clamped to [0, 1].
    pub coherence: Vec<f64>,
    /// Estimator chosen for each bin of `hv`.
    pub source: Vec<FrfSource>,
}

impl FrfEstimate {
    /// Estimate H1, H2, coherence and Hv from a set of cross spectra.
    pub fn from_spectra(spectra: &CrossSpectra, config: &FrfConfig) -> Self {
        let eps = config.epsilon;
        let h1 = h1(&spectra.s_xf, &spectra.s_ff, eps);
        let h2 = h2(&spectra.s_xx, &spectra.s_xf, eps);
        let coherence = coherence(&spectra.s_xf, &spectra.s_ff, &spectra.s_xx, eps);

        let (hv, source): (Vec<_>, Vec<_>) = h1
            .iter()
            .zip(&h2)
            .zip(&coherence)
            .map(|((&a, &b), &g)| select(a, b, g, config))
            .unzip();

        tracing::debug!(
            h1_bins = source.iter().filter(|s| **s == FrfSource::H1).count(),
            blend_bins = source.iter().filter(|s| **s == FrfSource::Blend).count(),
            h2_bins = source.iter().filter(|s| **s == FrfSource::H2).count(),
            "composite frf"
        );

        Self {
            frequencies: spectra.frequencies.clone(),
            h1,
            h2,
            hv,
            coherence,
            source,
        }
    }

    /// Number of frequency bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether there are no bins.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// H1 = S_xf / (S_ff + ε).
pub fn h1(s_xf: &[Complex64], s_ff: &[f64], eps: f64) -> Vec<Complex64> {
    s_xf.iter().zip(s_ff).map(|(&xf, ff)| xf / (ff + eps)).collect()
}

/// H2 = S_xx / (conj(S_xf) + ε).
pub fn h2(s_xx: &[f64], s_xf: &[Complex64], eps: f64) -> Vec<Complex64> {
    s_xx.iter()
        .zip(s_xf)
        .map(|(&xx, xf)| Complex64::new(xx, 0.0) / (xf.conj() + eps))
        .collect()
}

/// Ordinary coherence |S_xf|² / (S_ff · S_xx + ε), clamped to [0, 1].
pub fn coherence(s_xf: &[Complex64], s_ff: &[f64], s_xx: &[f64], eps: f64) -> Vec<f64> {
    s_xf.iter()
        .zip(s_ff)
        .zip(s_xx)
        .map(|((xf, ff), xx)| {
            let g = xf.norm_sqr() / (ff * xx + eps);
            if g.is_finite() { g.clamp(0.0, 1.0) } else { 0.0 }
        })
        .collect()
}

/// Geometric mean of two FRF estimates on the branch closest to `a`.
///
/// The principal square root of `a · b` can land half a turn away from both
/// inputs; flipping its sign keeps the result on the same side as H1.
pub fn geometric_mean(a: Complex64, b: Complex64) -> Complex64 {
    let g = (a * b).sqrt();
    if (g * a.conj()).re < 0.0 { -g } else { g }
}

fn select(h1: Complex64, h2: Complex64, coherence: f64, config: &FrfConfig) -> (Complex64, FrfSource) {
    if coherence > config.h1_coherence {
        (h1, FrfSource::H1)
    } else if coherence > config.blend_coherence {
        (geometric_mean(h1, h2), FrfSource::Blend)
    } else {
        (h2, FrfSource::H2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectra(s_ff: Vec<f64>, s_xx: Vec<f64>, s_xf: Vec<Complex64>) -> CrossSpectra {
        let n = s_ff.len();
        CrossSpectra {
            frequencies: (0..n).map(|i| i as f64).collect(),
            s_ff,
            s_xx,
            s_xf,
            segment_len: 2 * (n - 1),
            num_segments: 1,
        }
    }

    #[test]
    fn test_noiseless_estimators_coincide() {
        // X = H·F with H = 2 - i, F = 3: S_ff = 9, S_xf = X·conj(F), S_xx = |X|²
        let h = Complex64::new(2.0, -1.0);
        let f = Complex64::new(3.0, 0.0);
        let x = h * f;
        let sp = spectra(vec![f.norm_sqr()], vec![x.norm_sqr()], vec![x * f.conj()]);
        let est = FrfEstimate::from_spectra(&sp, &FrfConfig::default());

        assert!((est.h1[0] - h).norm() < 1e-9);
        assert!((est.h2[0] - h).norm() < 1e-9);
        assert!((est.coherence[0] - 1.0).abs() < 1e-9);
        assert_eq!(est.source[0], FrfSource::H1);
        assert_eq!(est.hv[0], est.h1[0]);
    }

    #[test]
    fn test_selection_by_coherence() {
        let config = FrfConfig::default();
        let a = Complex64::new(1.0, 0.0);
        let b = Complex64::new(4.0, 0.0);
        assert_eq!(select(a, b, 0.9, &config), (a, FrfSource::H1));
        let (blend, source) = select(a, b, 0.7, &config);
        assert_eq!(source, FrfSource::Blend);
        assert!((blend - Complex64::new(2.0, 0.0)).norm() < 1e-12);
        assert_eq!(select(a, b, 0.5, &config), (b, FrfSource::H2));
        // 0.8 itself falls in the blend band
        assert_eq!(select(a, b, 0.8, &config).1, FrfSource::Blend);
    }

    #[test]
    fn test_geometric_mean_branch() {
        // Both estimates near -1: principal sqrt of their product is +1
        let a = Complex64::new(-1.0, 0.01);
        let b = Complex64::new(-1.0, -0.01);
        let g = geometric_mean(a, b);
        assert!(g.re < 0.0, "geometric mean {g} should stay near -1");
    }

    #[test]
    fn test_coherence_clamped_and_zero_safe() {
        let coh = coherence(
            &[Complex64::new(2.0, 0.0), Complex64::new(0.0, 0.0)],
            &[1.0, 0.0],
            &[1.0, 0.0],
            1e-12,
        );
        assert_eq!(coh[0], 1.0);
        assert_eq!(coh[1], 0.0);
    }

    #[test]
    fn test_zero_force_spectrum_is_finite() {
        let out = h1(&[Complex64::new(1.0, 1.0)], &[0.0], 1e-12);
        assert!(out[0].re.is_finite() && out[0].im.is_finite());
    }
}
