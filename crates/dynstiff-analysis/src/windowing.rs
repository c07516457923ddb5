//! Adaptive tapering of impact-test signals.
//!
//! Two policies, both pure functions of `(samples, sample_rate)` that return
//! a new buffer of the same length:
//!
//! - [`exponential_window`] for responses: multiplies by `exp(-t/τ)` with an
//!   adaptively chosen τ, suppressing the noise tail of a decaying record.
//! - [`force_window`] for the hammer force: keeps the impact region (plus a
//!   safety margin) and zeroes everything else, with a half-cosine taper at
//!   the cutoff to limit leakage.

use crate::config::{ExponentialWindowConfig, ForceWindowConfig};
use crate::fft::Fft;
use std::f64::consts::PI;

/// Dominant frequency of a signal from its (boxcar, mean-removed)
/// periodogram. Returns 0.0 for empty or flat signals.
pub fn dominant_frequency(samples: &[f64], sample_rate: f64) -> f64 {
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let detrended: Vec<f64> = samples.iter().map(|s| s - mean).collect();
    let spectrum = Fft::new(n).forward(&detrended);

    let last = spectrum.len() - 1;
    let mut best = (0usize, 0.0f64);
    for (k, c) in spectrum.iter().enumerate() {
        let mut power = c.norm_sqr();
        // One-sided density doubles every bin but DC (and Nyquist for even n)
        if k != 0 && !(n.is_multiple_of(2) && k == last) {
            power *= 2.0;
        }
        if power > best.1 {
            best = (k, power);
        }
    }
    best.0 as f64 * sample_rate / n as f64
}

/// Estimate the decay time constant τ (seconds) of a response.
///
/// Uses the first sample whose envelope falls below the decay threshold
/// (τ = decay time / 3); if the envelope never falls that low, derives τ
/// from the dominant frequency and the assumed damping ratio, and as a last
/// resort from the record length. The result is capped at a third of the
/// record duration and floored at `config.min_tau`.
pub fn estimate_tau(samples: &[f64], sample_rate: f64, config: &ExponentialWindowConfig) -> f64 {
    let n = samples.len();
    let duration = n as f64 / sample_rate;
    let peak = samples.iter().fold(0.0f64, |m, s| m.max(s.abs()));
    let threshold = config.decay_threshold * peak;

    let tau = match samples.iter().position(|s| s.abs() < threshold) {
        Some(idx) => idx as f64 / sample_rate / 3.0,
        None => {
            let f0 = dominant_frequency(samples, sample_rate);
            if f0 > 0.0 {
                1.0 / (2.0 * PI * f0 * config.damping_estimate)
            } else if duration > 5.0 {
                duration / 3.0
            } else if duration > 1.0 {
                duration / 4.0
            } else {
                duration / 5.0
            }
        }
    };

    tau.min(duration / 3.0).max(config.min_tau)
}

/// Apply the adaptive exponential window to a response signal.
///
/// Short records (below `short_record_secs` or `short_record_samples`) use
/// τ = max(duration/2, 0.5 s). Longer records use the configured or
/// estimated τ, raised to at least `long_record_tau_fraction` of the
/// duration.
pub fn exponential_window(
    samples: &[f64],
    sample_rate: f64,
    config: &ExponentialWindowConfig,
) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }
    let tau = window_tau(samples, sample_rate, config);
    tracing::debug!(tau, "exponential window");

    samples
        .iter()
        .enumerate()
        .map(|(i, &s)| s * (-(i as f64 / sample_rate) / tau).exp())
        .collect()
}

/// Time constant the exponential window will use for `samples`.
pub fn window_tau(samples: &[f64], sample_rate: f64, config: &ExponentialWindowConfig) -> f64 {
    let n = samples.len();
    let duration = n as f64 / sample_rate;
    if duration < config.short_record_secs || n < config.short_record_samples {
        return (duration * 0.5).max(0.5);
    }
    let tau = config
        .tau
        .unwrap_or_else(|| estimate_tau(samples, sample_rate, config));
    tau.max(duration * config.long_record_tau_fraction)
}

/// Sample span selected by the force window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpactSpan {
    /// First sample of the window.
    pub start: usize,
    /// One past the last sample of the window.
    pub end: usize,
    /// Nominal window length before truncation at the record end.
    pub length: usize,
    /// Taper length in samples.
    pub taper: usize,
}

/// Locate the impact region of a force signal.
///
/// Returns `None` for an identically zero (or empty) signal.
pub fn impact_span(samples: &[f64], sample_rate: f64, config: &ForceWindowConfig) -> Option<ImpactSpan> {
    let peak = samples.iter().fold(0.0f64, |m, s| m.max(s.abs()));
    if peak == 0.0 || !peak.is_finite() {
        return None;
    }

    let above = |s: &f64| s.abs() / peak > config.threshold;
    let (start, impact_samples) = match (
        samples.iter().position(above),
        samples.iter().rposition(above),
    ) {
        (Some(first), Some(last)) => (first, last - first + 1),
        _ => (0, (config.fallback_impact * sample_rate) as usize),
    };

    let margin = (config.safety_margin * impact_samples as f64) as usize;
    let min_samples = (config.min_window * sample_rate) as usize;
    let max_samples = (config.max_window * sample_rate) as usize;
    let length = (impact_samples + margin).clamp(min_samples, max_samples.max(min_samples));

    let end = (start + length).min(samples.len());
    let taper = ((config.taper_fraction * length as f64) as usize)
        .max((config.min_taper * sample_rate) as usize);

    Some(ImpactSpan {
        start,
        end,
        length,
        taper,
    })
}

/// Apply the adaptive force window to a hammer force signal.
///
/// An identically zero signal is returned unchanged.
pub fn force_window(samples: &[f64], sample_rate: f64, config: &ForceWindowConfig) -> Vec<f64> {
    let Some(span) = impact_span(samples, sample_rate, config) else {
        return samples.to_vec();
    };
    tracing::debug!(
        start = span.start,
        end = span.end,
        taper = span.taper,
        "force window"
    );

    let mut window = vec![0.0; samples.len()];
    for w in &mut window[span.start..span.end] {
        *w = 1.0;
    }

    // Half-cosine taper over the closing samples of the window
    for i in 0..span.taper {
        let idx = span.end as isize - span.taper as isize + i as isize;
        if idx >= 0 && (idx as usize) < window.len() {
            window[idx as usize] *= 0.5 * (1.0 + (PI * i as f64 / span.taper as f64).cos());
        }
    }

    samples.iter().zip(&window).map(|(s, w)| s * w).collect()
}
