//! Analysis configuration.
//!
//! Every empirically chosen constant of the pipeline lives here with its
//! default value, so that callers (profiles, the CLI, tests) can override
//! any of them explicitly instead of relying on process-wide state.
//!
//! All structs deserialize with `#[serde(default)]`, so a partial TOML table
//! only overrides the keys it names:
//!
//! ```toml
//! [frf]
//! h1_coherence = 0.85
//!
//! [antiresonance]
//! floor_db = -40.0
//! ```

use serde::{Deserialize, Serialize};

/// Standard gravity used to convert g-units to SI.
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Top-level configuration for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Time axis regularization.
    pub grid: GridConfig,
    /// Hammer mass limits and unit conversion.
    pub hammer: HammerConfig,
    /// Exponential response window.
    pub exponential: ExponentialWindowConfig,
    /// Adaptive force window.
    pub force: ForceWindowConfig,
    /// Averaged periodogram sizing.
    pub spectral: SpectralConfig,
    /// FRF estimator selection.
    pub frf: FrfConfig,
    /// Antiresonance detection.
    pub antiresonance: AntiresonanceConfig,
    /// Stiffness display masking.
    pub display: DisplayConfig,
    /// Modal damping extraction.
    pub damping: DampingConfig,
    /// Time-frequency segmentation.
    pub segmentation: SegmentationConfig,
    /// Record cutting minimums.
    pub cutting: CuttingConfig,
    /// Pre-processing filter design.
    pub filter: FilterConfig,
}

/// Time axis regularization settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Relative std/mean of successive time differences above which the
    /// time axis is regenerated.
    pub irregularity_tolerance: f64,
    /// Sample interval used when none can be derived (seconds).
    pub fallback_interval: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            irregularity_tolerance: 0.05,
            fallback_interval: 0.001,
        }
    }
}

/// Hammer mass validation and unit scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HammerConfig {
    /// Lightest accepted hammer (kg).
    pub min_mass: f64,
    /// Heaviest accepted hammer (kg).
    pub max_mass: f64,
    /// Mass used when none or an invalid one is supplied (kg).
    pub default_mass: f64,
    /// Gravity used for g → SI conversion (m/s²).
    pub gravity: f64,
}

impl Default for HammerConfig {
    fn default() -> Self {
        Self {
            min_mass: 0.1,
            max_mass: 50.0,
            default_mass: 1.0,
            gravity: STANDARD_GRAVITY,
        }
    }
}

/// Adaptive exponential window for response signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExponentialWindowConfig {
    /// Explicit time constant (seconds); estimated when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tau: Option<f64>,
    /// Records shorter than this (seconds) use the short-record rule.
    pub short_record_secs: f64,
    /// Records with fewer samples use the short-record rule.
    pub short_record_samples: usize,
    /// Fraction of the peak envelope that marks the end of the decay.
    pub decay_threshold: f64,
    /// Damping ratio assumed when τ is derived from the dominant frequency.
    pub damping_estimate: f64,
    /// Lower bound on τ as a fraction of the record duration (long records).
    pub long_record_tau_fraction: f64,
    /// Absolute floor on the estimated τ (seconds).
    pub min_tau: f64,
}

impl Default for ExponentialWindowConfig {
    fn default() -> Self {
        Self {
            tau: None,
            short_record_secs: 2.0,
            short_record_samples: 5000,
            decay_threshold: 0.05,
            damping_estimate: 0.02,
            long_record_tau_fraction: 0.7,
            min_tau: 0.01,
        }
    }
}

/// Adaptive rectangular-plus-taper window for the hammer force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceWindowConfig {
    /// Fraction of the normalized peak that delimits the impact region.
    pub threshold: f64,
    /// Extra length appended to the impact region, as a fraction of it.
    pub safety_margin: f64,
    /// Shortest window (seconds).
    pub min_window: f64,
    /// Longest window (seconds).
    pub max_window: f64,
    /// Fraction of the window covered by the closing half-cosine taper.
    pub taper_fraction: f64,
    /// Shortest taper (seconds).
    pub min_taper: f64,
    /// Impact length assumed when no sample crosses the threshold (seconds).
    pub fallback_impact: f64,
}

impl Default for ForceWindowConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            safety_margin: 0.2,
            min_window: 0.0005,
            max_window: 0.05,
            taper_fraction: 0.15,
            min_taper: 0.001,
            fallback_impact: 0.005,
        }
    }
}

/// Averaged periodogram sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// Upper bound on segment length.
    pub max_segment: usize,
    /// Lower bound on segment length.
    pub min_segment: usize,
    /// Number of segments the sizing aims for.
    pub target_segments: usize,
    /// Minimum record length for FRF estimation.
    pub min_samples: usize,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            max_segment: 1024,
            min_segment: 256,
            target_segments: 6,
            min_samples: 1024,
        }
    }
}

/// Composite FRF selection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrfConfig {
    /// Coherence above which H1 is used.
    pub h1_coherence: f64,
    /// Coherence above which the H1/H2 geometric mean is used (below: H2).
    pub blend_coherence: f64,
    /// Denominator floor.
    pub epsilon: f64,
}

impl Default for FrfConfig {
    fn default() -> Self {
        Self {
            h1_coherence: 0.8,
            blend_coherence: 0.5,
            epsilon: 1e-12,
        }
    }
}

/// Antiresonance detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiresonanceConfig {
    /// Absolute floor of the detection threshold (dB).
    pub floor_db: f64,
    /// Margin added to the median |H| level (dB).
    pub margin_db: f64,
    /// Coherence a bin needs to be flagged.
    pub min_coherence: f64,
    /// |H| at or below which a bin cannot be inverted.
    pub min_magnitude: f64,
}

impl Default for AntiresonanceConfig {
    fn default() -> Self {
        Self {
            floor_db: -35.0,
            margin_db: 10.0,
            min_coherence: 0.6,
            min_magnitude: 1e-10,
        }
    }
}

/// Noise rejection applied before the stiffness spectrum is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Lowest frequency kept (Hz).
    pub min_frequency: f64,
    /// Force auto-spectrum must exceed this fraction of its peak.
    pub force_fraction: f64,
    /// Absolute floor on the force auto-spectrum threshold.
    pub min_force_psd: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            min_frequency: 0.1,
            force_fraction: 0.01,
            min_force_psd: 1e-8,
        }
    }
}

/// Modal damping extraction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DampingConfig {
    /// Multiplier applied to median (height) and MAD (prominence).
    pub noise_factor: f64,
    /// Minimum distance between spectral peaks (bins).
    pub min_peak_distance: usize,
    /// Grouping distance for expected frequencies; the search spans half of
    /// it on either side of a group (Hz).
    pub search_window_hz: f64,
    /// Upper bound (exclusive) on an accepted modal damping ratio.
    pub max_modal_zeta: f64,
    /// Time-domain peak prominence as a fraction of peak-to-peak range.
    pub decay_prominence: f64,
    /// Number of time-domain peaks used by the log-decrement fit.
    pub max_decay_peaks: usize,
    /// Upper bound (inclusive) on an accepted global damping ratio.
    pub max_global_zeta: f64,
}

impl Default for DampingConfig {
    fn default() -> Self {
        Self {
            noise_factor: 2.0,
            min_peak_distance: 3,
            search_window_hz: 5.0,
            max_modal_zeta: 0.5,
            decay_prominence: 0.05,
            max_decay_peaks: 8,
            max_global_zeta: 1.0,
        }
    }
}

/// Amplitude scale for time-frequency output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmplitudeScale {
    /// Linear FFT magnitude.
    #[default]
    Linear,
    /// 20·log10 of the magnitude.
    Db,
}

/// Time-frequency segmentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Shortest segment duration (seconds).
    pub min_segment_duration: f64,
    /// Fractional overlap between consecutive segments.
    pub overlap: f64,
    /// Maximum number of segments.
    pub max_segments: usize,
    /// Segments shorter than this are skipped.
    pub min_segment_samples: usize,
    /// Maximum number of frequency points emitted per segment.
    pub max_points_per_segment: usize,
    /// Amplitude scale of the emitted points.
    pub scale: AmplitudeScale,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_segment_duration: 0.05,
            overlap: 0.5,
            max_segments: 120,
            min_segment_samples: 512,
            max_points_per_segment: 2000,
            scale: AmplitudeScale::Linear,
        }
    }
}

/// Minimum point counts enforced when cutting a record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuttingConfig {
    /// Minimum points for a whole-record FFT.
    pub min_fft_points: usize,
    /// Minimum waterfall segments.
    pub min_waterfall_segments: usize,
    /// Minimum points per waterfall segment.
    pub min_segment_points: usize,
    /// Welch segment length assumed for the minimum.
    pub welch_segment: usize,
    /// Welch segment count assumed for the minimum.
    pub welch_segments: usize,
}

impl Default for CuttingConfig {
    fn default() -> Self {
        Self {
            min_fft_points: 4096,
            min_waterfall_segments: 6,
            min_segment_points: 256,
            welch_segment: 1024,
            welch_segments: 6,
        }
    }
}

impl CuttingConfig {
    /// Smallest number of points a cut record must contain.
    pub fn min_points(&self) -> usize {
        let waterfall = self.min_waterfall_segments * self.min_segment_points;
        let welch = self.welch_segment + self.welch_segments.saturating_sub(1) * (self.welch_segment / 2);
        self.min_fft_points.max(waterfall).max(welch)
    }
}

/// Design parameters of the pre-processing filters.
///
/// Which filters run is chosen per request with
/// [`crate::filters::FilterRequest`]; this table only shapes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Butterworth order of the high-pass and of each band edge (even).
    pub order: usize,
    /// Starting bandwidth of each adaptive band (Hz).
    pub initial_bandwidth_hz: f64,
    /// Largest accepted fraction of signal variance removed by one band.
    pub max_energy_loss: f64,
    /// Bandwidth attempts per band.
    pub max_iterations: usize,
    /// Bandwidth multiplier between attempts.
    pub bandwidth_growth: f64,
    /// Lowest band edge, also kept below Nyquist by this amount (Hz).
    pub min_frequency: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            order: 4,
            initial_bandwidth_hz: 20.0,
            max_energy_loss: 0.10,
            max_iterations: 5,
            bandwidth_growth: 1.2,
            min_frequency: 0.1,
        }
    }
}
