//! Property-based tests for dynstiff-analysis estimators.
//!
//! Tests windowing determinism and length preservation, coherence range and
//! composite FRF selection using proptest for randomized input generation.

use dynstiff_analysis::config::{AnalysisConfig, FrfConfig};
use dynstiff_analysis::frf::{FrfSource, coherence, geometric_mean};
use dynstiff_analysis::peaks::{PeakCriteria, find_peaks, local_maxima};
use dynstiff_analysis::spectral::CrossSpectra;
use dynstiff_analysis::{FrfEstimate, exponential_window, force_window};
use proptest::prelude::*;
use rustfft::num_complex::Complex64;

fn signal(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-10.0f64..10.0, len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Both windows return a buffer of the input length, identical across
    /// repeated calls on the same input.
    #[test]
    fn windows_preserve_length_and_are_deterministic(
        samples in signal(0..6000),
        fs in 100.0f64..20_000.0,
    ) {
        let config = AnalysisConfig::default();

        let exp_a = exponential_window(&samples, fs, &config.exponential);
        let exp_b = exponential_window(&samples, fs, &config.exponential);
        prop_assert_eq!(exp_a.len(), samples.len());
        prop_assert_eq!(&exp_a, &exp_b);

        let force_a = force_window(&samples, fs, &config.force);
        let force_b = force_window(&samples, fs, &config.force);
        prop_assert_eq!(force_a.len(), samples.len());
        prop_assert_eq!(&force_a, &force_b);
    }

    /// The force window only ever keeps or attenuates samples.
    #[test]
    fn force_window_never_amplifies(
        samples in signal(1..4000),
        fs in 1000.0f64..20_000.0,
    ) {
        let windowed = force_window(&samples, fs, &AnalysisConfig::default().force);
        for (w, s) in windowed.iter().zip(&samples) {
            prop_assert!(w.abs() <= s.abs() + 1e-12);
        }
    }

    /// Coherence always lies in [0, 1], even for inconsistent spectra.
    #[test]
    fn coherence_in_unit_range(
        bins in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3, 0.0f64..1e3, 0.0f64..1e3), 1..64),
    ) {
        let s_xf: Vec<Complex64> = bins.iter().map(|b| Complex64::new(b.0, b.1)).collect();
        let s_ff: Vec<f64> = bins.iter().map(|b| b.2).collect();
        let s_xx: Vec<f64> = bins.iter().map(|b| b.3).collect();

        for g in coherence(&s_xf, &s_ff, &s_xx, 1e-12) {
            prop_assert!((0.0..=1.0).contains(&g), "coherence {} out of range", g);
        }
    }

    /// Hv follows the coherence thresholds bin by bin.
    #[test]
    fn composite_follows_coherence(
        bins in prop::collection::vec((0.01f64..1e3, -1e3f64..1e3, -1e3f64..1e3, 0.01f64..1e3), 1..64),
    ) {
        let spectra = CrossSpectra {
            frequencies: (0..bins.len()).map(|i| i as f64).collect(),
            s_ff: bins.iter().map(|b| b.0).collect(),
            s_xf: bins.iter().map(|b| Complex64::new(b.1, b.2)).collect(),
            s_xx: bins.iter().map(|b| b.3).collect(),
            segment_len: 256,
            num_segments: 1,
        };
        let config = FrfConfig::default();
        let frf = FrfEstimate::from_spectra(&spectra, &config);

        for i in 0..frf.len() {
            let g = frf.coherence[i];
            match frf.source[i] {
                FrfSource::H1 => {
                    prop_assert!(g > config.h1_coherence);
                    prop_assert_eq!(frf.hv[i], frf.h1[i]);
                }
                FrfSource::Blend => {
                    prop_assert!(g > config.blend_coherence && g <= config.h1_coherence);
                    prop_assert_eq!(frf.hv[i], geometric_mean(frf.h1[i], frf.h2[i]));
                }
                FrfSource::H2 => {
                    prop_assert!(g <= config.blend_coherence);
                    prop_assert_eq!(frf.hv[i], frf.h2[i]);
                }
            }
        }
    }

    /// The geometric mean squares back to the product of its inputs and sits
    /// within a quarter turn of the first.
    #[test]
    fn geometric_mean_branch(
        a in (-10.0f64..10.0, -10.0f64..10.0),
        b in (-10.0f64..10.0, -10.0f64..10.0),
    ) {
        let (a, b) = (Complex64::new(a.0, a.1), Complex64::new(b.0, b.1));
        let g = geometric_mean(a, b);
        prop_assert!((g * g - a * b).norm() <= 1e-9 * (1.0 + (a * b).norm()));
        prop_assert!((g * a.conj()).re >= 0.0);
    }

    /// Every filtered peak is a local maximum meeting the height bound.
    #[test]
    fn peaks_are_local_maxima(
        x in signal(0..300),
        height in -5.0f64..5.0,
        distance in 0usize..6,
    ) {
        let maxima = local_maxima(&x);
        let criteria = PeakCriteria { height: Some(height), prominence: None, distance };
        let peaks = find_peaks(&x, &criteria);
        for w in peaks.windows(2) {
            prop_assert!(w[0] < w[1]);
            if distance > 1 {
                prop_assert!(w[1] - w[0] >= distance);
            }
        }
        for p in peaks {
            prop_assert!(maxima.contains(&p));
            prop_assert!(x[p] >= height);
        }
    }
}
