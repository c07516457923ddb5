//! Time axis diagnosis and regularization.
//!
//! Spectral estimation assumes a uniform sample interval. Recorded tables
//! often carry jittery or partly duplicated timestamps, so the time axis is
//! checked first: if the relative spread of the successive differences
//! exceeds the configured tolerance, a uniform axis with the same sample
//! count is regenerated between the original start and end times. The
//! samples themselves are never moved.

use crate::config::GridConfig;
use crate::error::AnalysisError;
use crate::stats::{mean, median, std_dev};
use serde::Serialize;

/// Outcome of regularizing a time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegularGrid {
    /// Time axis to use for the analysis (seconds).
    #[serde(skip)]
    pub time: Vec<f64>,
    /// Uniform sample interval (seconds).
    pub sample_interval: f64,
    /// Sample rate (Hz).
    pub sample_rate: f64,
    /// Relative std/mean of the positive time differences of the input.
    pub irregularity: f64,
    /// Whether the time axis was regenerated.
    pub regenerated: bool,
    /// Whether the default interval had to be used.
    pub fallback: bool,
}

/// Diagnose `time` and return a uniform grid.
///
/// Fails only with fewer than two samples; an unusable axis falls back to
/// `config.fallback_interval`.
pub fn regularize_time(time: &[f64], config: &GridConfig) -> Result<RegularGrid, AnalysisError> {
    let n = time.len();
    if n < 2 {
        return Err(AnalysisError::insufficient("sample interval", 2, n));
    }

    let diffs: Vec<f64> = time
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| d.is_finite() && *d > 0.0)
        .collect();

    if diffs.is_empty() {
        tracing::warn!("no positive time differences, using default interval");
        return Ok(fallback_grid(time[0], n, 1.0, config));
    }

    let mut dt = median(&diffs).unwrap_or(0.0);
    if dt <= 0.0 {
        dt = (time[n - 1] - time[0]) / (n - 1) as f64;
    }

    let irregularity = match (mean(&diffs), std_dev(&diffs)) {
        (Some(m), Some(s)) if m > 0.0 => s / m,
        _ => 1.0,
    };

    let (axis, dt, regenerated) = if irregularity > config.irregularity_tolerance {
        tracing::info!(
            irregularity,
            tolerance = config.irregularity_tolerance,
            "irregular time axis, regenerating uniform grid"
        );
        let (start, end) = (time[0], time[n - 1]);
        if end > start && end.is_finite() && start.is_finite() {
            let step = (end - start) / (n - 1) as f64;
            (linspace(start, step, n), step, true)
        } else {
            (linspace(0.0, dt, n), dt, true)
        }
    } else {
        (time.to_vec(), dt, false)
    };

    if !(dt.is_finite() && dt > 0.0) {
        tracing::warn!(dt, "invalid final sample interval, using default");
        return Ok(fallback_grid(time[0], n, irregularity, config));
    }

    tracing::debug!(dt, sample_rate = 1.0 / dt, regenerated, "temporal grid");

    Ok(RegularGrid {
        time: axis,
        sample_interval: dt,
        sample_rate: 1.0 / dt,
        irregularity,
        regenerated,
        fallback: false,
    })
}

/// Sample interval estimate for display paths: median positive difference,
/// else average step over the span, else the configured default.
pub fn estimate_sample_interval(time: &[f64], config: &GridConfig) -> f64 {
    let positive: Vec<f64> = time
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| d.is_finite() && *d > 0.0)
        .collect();

    if positive.is_empty() {
        return config.fallback_interval;
    }

    match median(&positive) {
        Some(dt) if dt.is_finite() && dt > 0.0 => dt,
        _ => {
            let n = time.len();
            let span = (time[n - 1] - time[0]) / (n - 1) as f64;
            if span.is_finite() && span > 0.0 {
                span
            } else {
                config.fallback_interval
            }
        }
    }
}

fn fallback_grid(start: f64, n: usize, irregularity: f64, config: &GridConfig) -> RegularGrid {
    let dt = config.fallback_interval;
    let start = if start.is_finite() { start } else { 0.0 };
    RegularGrid {
        time: linspace(start, dt, n),
        sample_interval: dt,
        sample_rate: 1.0 / dt,
        irregularity,
        regenerated: true,
        fallback: true,
    }
}

fn linspace(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * step).collect()
}
