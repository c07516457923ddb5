//! Analysis entry point.
//!
//! [`StiffnessAnalyzer`] chains the stages for one impact record:
//!
//! ```text
//! time axis ─► regular grid ─► sample rate
//! force (g) ─► force window ─► N ─┐
//!                                 ├─► Welch/CSD ─► H1/H2/Hv ─► K(f) ─► display mask
//! accel (g) ─► exp. window ─► m/s²┘
//! accel (g) ─────────────────────────► half-power modes + log-decrement ζ
//! ```
//!
//! No stage failure escapes [`StiffnessAnalyzer::analyze`]: each fallible
//! output is a `Result` inside the report, and every problem adds a line to
//! [`AnalysisReport::diagnostics`].

use crate::config::AnalysisConfig;
use crate::damping::DampingReport;
use crate::error::AnalysisError;
use crate::filters::{FilterRequest, filter_record};
use crate::frf::FrfEstimate;
use crate::grid::{RegularGrid, estimate_sample_interval, regularize_time};
use crate::input::{Axis, ImpactRecord, accel_to_si, force_to_newtons, validate_hammer_mass};
use crate::segmentation::{Waterfall, segment_response};
use crate::spectral::{CrossSpectra, estimate_cross_spectra};
use crate::stiffness::{StiffnessSpectrum, StiffnessView, display_view, dynamic_stiffness};
use crate::windowing::{exponential_window, force_window};

/// Everything one analysis request produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Acceleration axis analysed.
    pub axis: Axis,
    /// Regularized time axis and sample rate.
    pub grid: Result<RegularGrid, AnalysisError>,
    /// Hammer mass actually used (kg).
    pub hammer_mass_kg: f64,
    /// Auto- and cross-spectra of the windowed signals.
    pub spectra: Result<CrossSpectra, AnalysisError>,
    /// H1, H2, coherence and Hv.
    pub frf: Result<FrfEstimate, AnalysisError>,
    /// Complex dynamic stiffness on the full frequency axis.
    pub stiffness: Result<StiffnessSpectrum, AnalysisError>,
    /// Stiffness restricted to well-excited bins.
    pub view: Result<StiffnessView, AnalysisError>,
    /// Half-power modes and log-decrement damping.
    pub damping: DampingReport,
    /// C/m = 2ζ·2π·f₁ (1/s), when both estimators produced a result.
    pub damping_per_mass: Option<f64>,
    /// Human-readable notes from every stage.
    pub diagnostics: Vec<String>,
}

impl AnalysisReport {
    /// Sample rate (Hz), if the time axis was usable.
    pub fn sample_rate(&self) -> Option<f64> {
        self.grid.as_ref().ok().map(|g| g.sample_rate)
    }

    /// Whether a stiffness spectrum could be displayed.
    pub fn has_stiffness(&self) -> bool {
        self.view.is_ok()
    }
}

/// Dynamic stiffness and damping analyzer.
///
/// Holds only configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct StiffnessAnalyzer {
    config: AnalysisConfig,
}

impl StiffnessAnalyzer {
    /// Create an analyzer with the given configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse one acceleration axis of `record`.
    ///
    /// `hammer_mass` is validated (see [`validate_hammer_mass`]);
    /// `expected_modes` (Hz) narrows the modal peak search when non-empty.
    pub fn analyze(
        &self,
        record: &ImpactRecord,
        axis: Axis,
        hammer_mass: Option<f64>,
        expected_modes: &[f64],
    ) -> AnalysisReport {
        let config = &self.config;
        let mut diagnostics = Vec::new();

        let (hammer_mass_kg, mass_message) = validate_hammer_mass(hammer_mass, &config.hammer);
        diagnostics.push(mass_message);

        let grid = regularize_time(&record.time, &config.grid);
        match &grid {
            Ok(g) if g.fallback => diagnostics.push(format!(
                "time axis unusable, assumed {} s sample interval",
                g.sample_interval
            )),
            Ok(g) if g.regenerated => diagnostics.push(format!(
                "irregular time axis ({:.1} % spread), regenerated a uniform grid",
                g.irregularity * 100.0
            )),
            Ok(_) => {}
            Err(err) => diagnostics.push(err.to_string()),
        }

        let accel = match (&grid, record.axis(axis)) {
            (Err(err), _) => Err(err.clone()),
            (Ok(_), None) => Err(AnalysisError::MissingAxis(axis)),
            (Ok(g), Some(samples)) => Ok((g.sample_rate, samples)),
        };

        let spectra = accel.clone().and_then(|(fs, samples)| {
            let force = force_window(&record.force, fs, &config.force);
            let force = force_to_newtons(&force, hammer_mass_kg, config.hammer.gravity);
            let response = exponential_window(samples, fs, &config.exponential);
            let response = accel_to_si(&response, config.hammer.gravity);
            check_finite(&force, &response)?;
            estimate_cross_spectra(&force, &response, fs, &config.spectral)
        });
        if let Err(err) = &spectra {
            tracing::warn!(%err, "spectral estimation skipped");
            diagnostics.push(err.to_string());
        }

        let frf = spectra
            .as_ref()
            .map(|s| FrfEstimate::from_spectra(s, &config.frf))
            .map_err(Clone::clone);

        let stiffness = frf.as_ref().map_err(Clone::clone).map(|h| {
            dynamic_stiffness(&h.frequencies, &h.hv, &h.coherence, &config.antiresonance)
        });
        if let Ok(k) = &stiffness {
            if !k.has_valid_bins() {
                diagnostics.push("no invertible FRF bins, dynamic stiffness set to zero".to_string());
            } else if k.antiresonance_count() > 0 {
                diagnostics.push(format!(
                    "{} antiresonant bins interpolated (threshold {:.1} dB)",
                    k.antiresonance_count(),
                    k.threshold_db
                ));
            }
        }

        let view = match (&stiffness, &spectra) {
            (Ok(k), Ok(s)) => display_view(k, &s.s_ff, &config.display),
            (Err(err), _) | (_, Err(err)) => Err(err.clone()),
        };
        if let Err(AnalysisError::NoValidFrequencyBins) = &view {
            diagnostics.push(AnalysisError::NoValidFrequencyBins.to_string());
        }

        let damping = match &accel {
            Ok((fs, samples)) => {
                DampingReport::estimate(samples, *fs, expected_modes, &config.damping)
            }
            Err(err) => DampingReport {
                messages: vec![format!("damping not estimated: {err}")],
                ..DampingReport::default()
            },
        };
        diagnostics.extend(damping.messages.iter().cloned());
        let damping_per_mass = damping.damping_per_mass();

        tracing::info!(
            %axis,
            modes = damping.modes.len(),
            global_zeta = damping.global.map(|g| g.zeta),
            stiffness = view.is_ok(),
            "analysis complete"
        );

        AnalysisReport {
            axis,
            grid,
            hammer_mass_kg,
            spectra,
            frf,
            stiffness,
            view,
            damping,
            damping_per_mass,
            diagnostics,
        }
    }

    /// Run the pre-processing filters of `request` on `record`.
    ///
    /// The sample rate comes from the median time step. Returns the filtered
    /// record and one message per filter applied.
    pub fn filter(
        &self,
        record: &ImpactRecord,
        request: &FilterRequest,
    ) -> Result<(ImpactRecord, Vec<String>), AnalysisError> {
        let dt = estimate_sample_interval(&record.time, &self.config.grid);
        filter_record(record, 1.0 / dt, request, &self.config.filter)
    }

    /// Time-frequency segmentation of one acceleration axis.
    pub fn waterfall(
        &self,
        record: &ImpactRecord,
        axis: Axis,
        segment_duration: Option<f64>,
    ) -> Result<Waterfall, AnalysisError> {
        let samples = record.axis(axis).ok_or(AnalysisError::MissingAxis(axis))?;
        segment_response(
            &record.time,
            samples,
            segment_duration,
            &self.config.grid,
            &self.config.segmentation,
        )
    }
}

fn check_finite(force: &[f64], response: &[f64]) -> Result<(), AnalysisError> {
    for (stage, signal) in [("force", force), ("response", response)] {
        let finite = signal.iter().filter(|v| v.is_finite()).count();
        if finite < signal.len() {
            return Err(AnalysisError::insufficient(stage, signal.len(), finite));
        }
    }
    Ok(())
}
