//! Dynstiff Analysis - Impact-hammer FRF, dynamic stiffness and damping
//!
//! This crate turns one impact test (hammer force plus a response
//! accelerometer, both in g) into the dynamic-stiffness spectrum of the
//! structure and its modal damping:
//!
//! - [`fft`] - FFT wrapper and the Hann window
//! - [`input`] - Impact record, hammer mass validation, unit conversion
//! - [`grid`] - Temporal grid diagnosis and regularization
//! - [`windowing`] - Adaptive exponential and force windows
//! - [`spectral`] - Welch auto- and cross-spectral densities
//! - [`frf`] - H1, H2, coherence and the coherence-selected Hv
//! - [`stiffness`] - K(f) = −ω²/H with antiresonance repair and display masking
//! - [`peaks`] - Peak detection with height, distance and prominence criteria
//! - [`damping`] - Half-power modal damping and log-decrement global damping
//! - [`segmentation`] - Overlapping-segment spectra for waterfall displays
//! - [`cutting`] - Time-range cutting with a minimum length guarantee
//! - [`filters`] - Median, high-pass and adaptive multiband pre-filters
//! - [`engine`] - [`StiffnessAnalyzer`], the end-to-end entry point
//! - [`export`] - CSV and JSON export
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use dynstiff_analysis::{AnalysisConfig, Axis, ImpactRecord, StiffnessAnalyzer};
//!
//! let record = ImpactRecord::uniform(2000.0, force_g).with_axis(Axis::X, accel_g)?;
//! let analyzer = StiffnessAnalyzer::new(AnalysisConfig::default());
//! let report = analyzer.analyze(&record, Axis::X, Some(1.2), &[50.0, 150.0]);
//!
//! if let Ok(view) = &report.view {
//!     println!("{} stiffness bins", view.len());
//! }
//! for mode in &report.damping.modes {
//!     println!("{:.1} Hz  zeta={:.4}", mode.frequency_hz, mode.zeta);
//! }
//! ```
//!
//! ## Waterfall
//!
//! ```rust,ignore
//! let waterfall = analyzer.waterfall(&record, Axis::X, Some(0.5))?;
//! let points = waterfall.points(&analyzer.config().segmentation);
//! ```

pub mod config;
pub mod cutting;
pub mod damping;
pub mod engine;
pub mod error;
pub mod export;
pub mod fft;
pub mod filters;
pub mod frf;
pub mod grid;
pub mod input;
pub mod peaks;
pub mod segmentation;
pub mod spectral;
pub mod stats;
pub mod stiffness;
pub mod windowing;

// Re-export main types
pub use config::{AmplitudeScale, AnalysisConfig, FilterConfig, STANDARD_GRAVITY};
pub use cutting::cut_record;
pub use damping::{DampingReport, GlobalDamping, ModalDamping, Mode, damping_per_mass, global_damping, modal_damping};
pub use engine::{AnalysisReport, StiffnessAnalyzer};
pub use error::AnalysisError;
pub use fft::{Fft, hann_window};
pub use filters::{FilterRequest, adaptive_bandpass, filter_record, median_filter};
pub use frf::{FrfEstimate, FrfSource};
pub use grid::{RegularGrid, estimate_sample_interval, regularize_time};
pub use input::{Axis, ImpactRecord, accel_to_si, force_to_newtons, validate_hammer_mass};
pub use peaks::{PeakCriteria, find_peaks};
pub use segmentation::{Waterfall, WaterfallPoint, segment_response};
pub use spectral::{CrossSpectra, WelchEstimator, estimate_cross_spectra};
pub use stiffness::{StiffnessSpectrum, StiffnessView, display_view, dynamic_stiffness};
pub use windowing::{exponential_window, force_window};
