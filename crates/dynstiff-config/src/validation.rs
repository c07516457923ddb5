//! Profile validation.
//!
//! Every numeric setting of a [`Profile`] is checked against the range in
//! which the engine produces meaningful results. All violations are
//! collected, not just the first one.
//!
//! # Example
//!
//! ```rust
//! use dynstiff_config::{Profile, validate_profile};
//!
//! let profile = Profile::new("bench").with_hammer_mass(2.0);
//! assert!(validate_profile(&profile).is_ok());
//!
//! let heavy = Profile::new("bench").with_hammer_mass(80.0);
//! assert!(validate_profile(&heavy).is_err());
//! ```

use crate::Profile;
use dynstiff_analysis::AnalysisConfig;
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the parameter.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Settings that are individually valid but inconsistent together.
    #[error("inconsistent settings for '{param}': {reason}")]
    Inconsistent {
        /// Dotted path of the parameter.
        param: String,
        /// Description of the conflict.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Default)]
struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    fn range(&mut self, param: &str, value: f64, min: f64, max: f64) {
        if !(value.is_finite() && value >= min && value <= max) {
            self.errors.push(ValidationError::OutOfRange {
                param: param.to_string(),
                value,
                min,
                max,
            });
        }
    }

    fn count(&mut self, param: &str, value: usize, min: usize, max: usize) {
        self.range(param, value as f64, min as f64, max as f64);
    }

    fn require(&mut self, param: &str, ok: bool, reason: impl Into<String>) {
        if !ok {
            self.errors.push(ValidationError::Inconsistent {
                param: param.to_string(),
                reason: reason.into(),
            });
        }
    }

    fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }
}

/// Validate an engine configuration.
pub fn validate_analysis(config: &AnalysisConfig) -> ValidationResult<()> {
    let mut c = Checker::default();
    check_analysis(&mut c, config);
    c.finish()
}

/// Validate a profile: test parameters and engine configuration.
pub fn validate_profile(profile: &Profile) -> ValidationResult<()> {
    let mut c = Checker::default();
    let hammer = &profile.analysis.hammer;

    c.range(
        "hammer_mass_kg",
        profile.hammer_mass_kg,
        hammer.min_mass,
        hammer.max_mass,
    );
    for (i, &f) in profile.expected_modes_hz.iter().enumerate() {
        c.range(&format!("expected_modes_hz[{i}]"), f, 0.0, 1e6);
    }
    check_analysis(&mut c, &profile.analysis);
    c.finish()
}

fn check_analysis(c: &mut Checker, a: &AnalysisConfig) {
    c.range("grid.irregularity_tolerance", a.grid.irregularity_tolerance, 0.0, 1.0);
    c.range("grid.fallback_interval", a.grid.fallback_interval, 1e-9, 1.0);

    c.range("hammer.min_mass", a.hammer.min_mass, 1e-6, 1e3);
    c.range("hammer.max_mass", a.hammer.max_mass, 1e-6, 1e3);
    c.range("hammer.default_mass", a.hammer.default_mass, a.hammer.min_mass, a.hammer.max_mass);
    c.range("hammer.gravity", a.hammer.gravity, 1.0, 30.0);
    c.require(
        "hammer.min_mass",
        a.hammer.min_mass <= a.hammer.max_mass,
        "min_mass must not exceed max_mass",
    );

    if let Some(tau) = a.exponential.tau {
        c.range("exponential.tau", tau, 1e-4, 1e4);
    }
    c.range("exponential.short_record_secs", a.exponential.short_record_secs, 0.0, 3600.0);
    c.range("exponential.decay_threshold", a.exponential.decay_threshold, 1e-6, 1.0);
    c.range("exponential.damping_estimate", a.exponential.damping_estimate, 1e-4, 1.0);
    c.range(
        "exponential.long_record_tau_fraction",
        a.exponential.long_record_tau_fraction,
        0.0,
        10.0,
    );
    c.range("exponential.min_tau", a.exponential.min_tau, 1e-6, 100.0);

    c.range("force.threshold", a.force.threshold, 0.0, 1.0);
    c.range("force.safety_margin", a.force.safety_margin, 0.0, 10.0);
    c.range("force.min_window", a.force.min_window, 0.0, 10.0);
    c.range("force.max_window", a.force.max_window, 0.0, 10.0);
    c.range("force.taper_fraction", a.force.taper_fraction, 0.0, 1.0);
    c.range("force.min_taper", a.force.min_taper, 0.0, 1.0);
    c.range("force.fallback_impact", a.force.fallback_impact, 0.0, 10.0);
    c.require(
        "force.min_window",
        a.force.min_window <= a.force.max_window,
        "min_window must not exceed max_window",
    );

    c.count("spectral.min_segment", a.spectral.min_segment, 8, 1 << 20);
    c.count("spectral.max_segment", a.spectral.max_segment, 8, 1 << 20);
    c.count("spectral.target_segments", a.spectral.target_segments, 1, 1000);
    c.count("spectral.min_samples", a.spectral.min_samples, 8, 1 << 24);
    c.require(
        "spectral.min_segment",
        a.spectral.min_segment <= a.spectral.max_segment,
        "min_segment must not exceed max_segment",
    );

    c.range("frf.h1_coherence", a.frf.h1_coherence, 0.0, 1.0);
    c.range("frf.blend_coherence", a.frf.blend_coherence, 0.0, 1.0);
    c.range("frf.epsilon", a.frf.epsilon, 0.0, 1e-3);
    c.require(
        "frf.blend_coherence",
        a.frf.blend_coherence <= a.frf.h1_coherence,
        "blend_coherence must not exceed h1_coherence",
    );

    c.range("antiresonance.floor_db", a.antiresonance.floor_db, -300.0, 100.0);
    c.range("antiresonance.margin_db", a.antiresonance.margin_db, -100.0, 100.0);
    c.range("antiresonance.min_coherence", a.antiresonance.min_coherence, 0.0, 1.0);
    c.range("antiresonance.min_magnitude", a.antiresonance.min_magnitude, 0.0, 1.0);

    c.range("display.min_frequency", a.display.min_frequency, 0.0, 1e6);
    c.range("display.force_fraction", a.display.force_fraction, 0.0, 1.0);
    c.range("display.min_force_psd", a.display.min_force_psd, 0.0, 1.0);

    c.range("damping.noise_factor", a.damping.noise_factor, 0.0, 100.0);
    c.count("damping.min_peak_distance", a.damping.min_peak_distance, 0, 10_000);
    c.range("damping.search_window_hz", a.damping.search_window_hz, 0.0, 1e4);
    c.range("damping.max_modal_zeta", a.damping.max_modal_zeta, 1e-6, 1.0);
    c.range("damping.decay_prominence", a.damping.decay_prominence, 0.0, 1.0);
    c.count("damping.max_decay_peaks", a.damping.max_decay_peaks, 2, 10_000);
    c.range("damping.max_global_zeta", a.damping.max_global_zeta, 1e-6, 1.0);

    c.range(
        "segmentation.min_segment_duration",
        a.segmentation.min_segment_duration,
        1e-4,
        3600.0,
    );
    c.range("segmentation.overlap", a.segmentation.overlap, 0.0, 0.95);
    c.count("segmentation.max_segments", a.segmentation.max_segments, 1, 100_000);
    c.count("segmentation.min_segment_samples", a.segmentation.min_segment_samples, 1, 1 << 24);
    c.count(
        "segmentation.max_points_per_segment",
        a.segmentation.max_points_per_segment,
        1,
        1 << 24,
    );

    c.count("cutting.min_fft_points", a.cutting.min_fft_points, 1, 1 << 26);
    c.count("cutting.min_waterfall_segments", a.cutting.min_waterfall_segments, 1, 10_000);
    c.count("cutting.min_segment_points", a.cutting.min_segment_points, 1, 1 << 24);
    c.count("cutting.welch_segment", a.cutting.welch_segment, 1, 1 << 24);
    c.count("cutting.welch_segments", a.cutting.welch_segments, 1, 10_000);

    c.count("filter.order", a.filter.order, 2, 16);
    c.require(
        "filter.order",
        a.filter.order.is_multiple_of(2),
        "order must be even",
    );
    c.range("filter.initial_bandwidth_hz", a.filter.initial_bandwidth_hz, 1e-3, 1e5);
    c.range("filter.max_energy_loss", a.filter.max_energy_loss, 0.0, 1.0);
    c.count("filter.max_iterations", a.filter.max_iterations, 1, 100);
    c.range("filter.bandwidth_growth", a.filter.bandwidth_growth, 1.0, 10.0);
    c.range("filter.min_frequency", a.filter.min_frequency, 0.0, 1e3);
}
