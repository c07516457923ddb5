//! Modal damping extraction.
//!
//! Two independent estimators that cross-check each other:
//!
//! - [`modal_damping`]: half-power bandwidth of each resonance peak in the
//!   Hann-windowed magnitude spectrum, ζ = (f2 − f1) / (2·f).
//! - [`global_damping`]: least-squares fit of ln|A| against time over the
//!   first time-domain peaks (logarithmic decrement), ζ = −slope / (2π·f̄).

use crate::config::DampingConfig;
use crate::error::AnalysisError;
use crate::fft::{magnitude_spectrum, rfft_frequencies};
use crate::peaks::{PeakCriteria, find_peaks};
use crate::stats::{linear_fit, mean, median, median_abs_deviation};
use serde::Serialize;
use std::f64::consts::PI;

/// A resonance with its half-power damping estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mode {
    /// Peak frequency (Hz).
    pub frequency_hz: f64,
    /// Modal damping ratio.
    pub zeta: f64,
    /// Lower half-power frequency (Hz).
    pub f1: f64,
    /// Upper half-power frequency (Hz).
    pub f2: f64,
}

/// Result of the half-power estimator.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ModalDamping {
    /// Accepted modes in ascending frequency.
    pub modes: Vec<Mode>,
    /// Peaks that were rejected, with the reason.
    pub messages: Vec<String>,
}

/// Result of the log-decrement estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalDamping {
    /// Damping ratio.
    pub zeta: f64,
    /// Mean oscillation frequency of the fitted peaks (Hz).
    pub frequency_hz: f64,
    /// Number of peaks used by the fit.
    pub peaks_used: usize,
    /// Fitted decay rate of ln|A| (1/s).
    pub slope: f64,
}

/// Both damping estimates of one response, kept side by side.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DampingReport {
    /// Half-power modes.
    pub modes: Vec<Mode>,
    /// Log-decrement estimate, if the decay could be fitted.
    pub global: Option<GlobalDamping>,
    /// Diagnostics from both estimators.
    pub messages: Vec<String>,
}

impl DampingReport {
    /// Run both estimators on a raw response.
    pub fn estimate(
        response: &[f64],
        sample_rate: f64,
        expected_modes: &[f64],
        config: &DampingConfig,
    ) -> Self {
        let modal = modal_damping(response, sample_rate, expected_modes, config);
        let mut messages = modal.messages;

        let global = match global_damping(response, sample_rate, config) {
            Ok(global) => Some(global),
            Err(err) => {
                tracing::warn!(%err, "log-decrement fit failed");
                messages.push(format!("global damping could not be estimated: {err}"));
                None
            }
        };

        Self {
            modes: modal.modes,
            global,
            messages,
        }
    }

    /// Damping per unit mass from the global ζ and the first mode.
    pub fn damping_per_mass(&self) -> Option<f64> {
        damping_per_mass(self.global.as_ref(), &self.modes)
    }
}

/// Half-power bandwidth damping of each resonance.
///
/// Without `expected_modes` every spectral peak above `noise_factor ×
/// median` with prominence above `noise_factor × MAD` is analysed. With
/// expected centre frequencies, nearby centres (within `search_window_hz`)
/// are grouped and only the strongest peak within half a window of each
/// group is analysed.
pub fn modal_damping(
    response: &[f64],
    sample_rate: f64,
    expected_modes: &[f64],
    config: &DampingConfig,
) -> ModalDamping {
    let mut result = ModalDamping::default();
    if response.len() < 4 {
        result
            .messages
            .push(AnalysisError::insufficient("modal damping", 4, response.len()).to_string());
        return result;
    }

    let magnitude = magnitude_spectrum(response);
    let frequencies = rfft_frequencies(response.len(), sample_rate);

    let criteria = PeakCriteria {
        height: median(&magnitude).map(|m| m * config.noise_factor),
        prominence: median_abs_deviation(&magnitude).map(|m| m * config.noise_factor),
        distance: config.min_peak_distance,
    };

    let peaks = if expected_modes.is_empty() {
        find_peaks(&magnitude, &criteria)
    } else {
        grouped_peaks(&magnitude, &frequencies, expected_modes, &criteria, config)
    };
    tracing::debug!(peaks = peaks.len(), "spectral peaks");

    for peak in peaks {
        match half_power_mode(&magnitude, &frequencies, peak) {
            None => result.messages.push(format!(
                "could not estimate bandwidth for mode at {:.2} Hz",
                frequencies[peak]
            )),
            Some(mode) if mode.zeta > 0.0 && mode.zeta < config.max_modal_zeta => {
                result.modes.push(mode);
            }
            Some(mode) => result.messages.push(
                AnalysisError::ImplausibleDamping {
                    frequency_hz: mode.frequency_hz,
                    zeta: mode.zeta,
                }
                .to_string(),
            ),
        }
    }

    result
}

/// Strongest peak near each group of expected frequencies, ascending and
/// without duplicates.
fn grouped_peaks(
    magnitude: &[f64],
    frequencies: &[f64],
    expected: &[f64],
    criteria: &PeakCriteria,
    config: &DampingConfig,
) -> Vec<usize> {
    let mut centres: Vec<f64> = expected.iter().copied().filter(|f| f.is_finite()).collect();
    centres.sort_by(|a, b| a.total_cmp(b));

    let mut groups: Vec<Vec<f64>> = Vec::new();
    for f in centres {
        match groups.last_mut() {
            Some(group) if group.last().is_some_and(|last| (f - last).abs() <= config.search_window_hz) => {
                group.push(f);
            }
            _ => groups.push(vec![f]),
        }
    }

    let half = config.search_window_hz / 2.0;
    let mut peaks = Vec::new();
    for group in &groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let (lo, hi) = (first - half, last + half);
        let Some(start) = frequencies.iter().position(|&f| f >= lo) else {
            continue;
        };
        let end = frequencies.iter().rposition(|&f| f <= hi).map_or(start, |e| e + 1);
        if end <= start {
            continue;
        }

        let sub = &magnitude[start..end];
        let strongest = find_peaks(sub, criteria)
            .into_iter()
            .max_by(|&a, &b| sub[a].total_cmp(&sub[b]));
        if let Some(p) = strongest {
            peaks.push(start + p);
        }
    }

    peaks.sort_unstable();
    peaks.dedup();
    peaks
}

/// Walk outward from `peak` while the magnitude stays above peak/√2.
/// Returns `None` when either walk reaches the spectrum edge.
fn half_power_mode(magnitude: &[f64], frequencies: &[f64], peak: usize) -> Option<Mode> {
    let half_power = magnitude[peak] / 2.0_f64.sqrt();
    let last = magnitude.len() - 1;

    let mut left = peak;
    while left > 0 && magnitude[left] > half_power {
        left -= 1;
    }
    let mut right = peak;
    while right < last && magnitude[right] > half_power {
        right += 1;
    }
    if left == 0 || right == last {
        return None;
    }

    let (f1, f2, fn_) = (frequencies[left], frequencies[right], frequencies[peak]);
    Some(Mode {
        frequency_hz: fn_,
        zeta: (f2 - f1) / (2.0 * fn_),
        f1,
        f2,
    })
}

/// Global damping ratio from the decay of the time-domain peaks.
pub fn global_damping(
    response: &[f64],
    sample_rate: f64,
    config: &DampingConfig,
) -> Result<GlobalDamping, AnalysisError> {
    let (min, max) = response
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = if response.is_empty() { 0.0 } else { max - min };
    let peaks = find_peaks(response, &PeakCriteria::prominence(config.decay_prominence * range));
    if peaks.len() < 2 {
        return Err(AnalysisError::insufficient("log decrement", 2, peaks.len()));
    }

    let used = &peaks[..peaks.len().min(config.max_decay_peaks)];
    let times: Vec<f64> = used.iter().map(|&p| p as f64 / sample_rate).collect();
    let log_amp: Vec<f64> = used.iter().map(|&p| response[p].abs().ln()).collect();

    let periods: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
    if periods.iter().any(|&p| p.is_nan() || p <= 0.0) {
        return Err(AnalysisError::InvalidTemporalGrid {
            reason: "non-positive period between decay peaks".to_string(),
        });
    }
    let frequency_hz = mean(&periods).map_or(0.0, |p| 1.0 / p);

    let Some((slope, _)) = linear_fit(&times, &log_amp) else {
        return Err(AnalysisError::insufficient("log decrement", 2, used.len()));
    };
    let zeta = -slope / (2.0 * PI * frequency_hz);
    if !zeta.is_finite() || !(0.0..=config.max_global_zeta).contains(&zeta) {
        return Err(AnalysisError::ImplausibleDamping { frequency_hz, zeta });
    }

    tracing::debug!(zeta, frequency_hz, peaks = used.len(), "log-decrement fit");
    Ok(GlobalDamping {
        zeta,
        frequency_hz,
        peaks_used: used.len(),
        slope,
    })
}

/// Mass-normalized damping coefficient C/m = 2ζ·2π·f₁ (1/s), with ζ the
/// global estimate and f₁ the first accepted mode.
pub fn damping_per_mass(global: Option<&GlobalDamping>, modes: &[Mode]) -> Option<f64> {
    let global = global?;
    let first = modes.first()?;
    Some(2.0 * global.zeta * 2.0 * PI * first.frequency_hz)
}
