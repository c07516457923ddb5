//! Pre-processing filters for impact records.
//!
//! Three optional stages run on each selected column, in order:
//!
//! 1. a median filter (odd kernel, zero-padded edges) against isolated spikes,
//! 2. a Butterworth high-pass against drift and offset,
//! 3. an adaptive multiband band-pass that keeps a band around each
//!    expected mode, widening it until the band keeps enough of the signal
//!    variance.
//!
//! IIR stages are cascades of second-order sections run forward and then
//! backward over an odd-extended copy of the signal, which cancels their
//! phase response and squares their magnitude response.

use crate::config::FilterConfig;
use crate::error::AnalysisError;
use crate::input::ImpactRecord;
use crate::stats::std_dev;
use std::f64::consts::PI;

/// Biquad coefficients `(b0, b1, b2, a0, a1, a2)`.
pub type Coefficients = (f64, f64, f64, f64, f64, f64);

/// Second-order IIR section in Direct Form I.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Section with the given coefficients, normalized by `a0`.
    pub fn new((b0, b1, b2, a0, a1, a2): Coefficients) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }

    /// Gain at 0 Hz.
    pub fn dc_gain(&self) -> f64 {
        let gain = (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2);
        if gain.is_finite() { gain } else { 0.0 }
    }

    /// Set the delay lines to the steady state of a constant input `level`.
    pub fn prime(&mut self, level: f64) {
        let out = level * self.dc_gain();
        self.x1 = level;
        self.x2 = level;
        self.y1 = out;
        self.y2 = out;
    }
}

/// Low-pass section coefficients (RBJ cookbook).
pub fn lowpass_coefficients(frequency: f64, q: f64, sample_rate: f64) -> Coefficients {
    let omega = 2.0 * PI * frequency / sample_rate;
    let (sin_omega, cos_omega) = omega.sin_cos();
    let alpha = sin_omega / (2.0 * q);

    let b1 = 1.0 - cos_omega;
    (b1 / 2.0, b1, b1 / 2.0, 1.0 + alpha, -2.0 * cos_omega, 1.0 - alpha)
}

/// High-pass section coefficients (RBJ cookbook).
pub fn highpass_coefficients(frequency: f64, q: f64, sample_rate: f64) -> Coefficients {
    let omega = 2.0 * PI * frequency / sample_rate;
    let (sin_omega, cos_omega) = omega.sin_cos();
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 + cos_omega) / 2.0;
    (b0, -(1.0 + cos_omega), b0, 1.0 + alpha, -2.0 * cos_omega, 1.0 - alpha)
}

/// Pole quality factors of an even-order Butterworth prototype.
fn butterworth_q(order: usize) -> impl Iterator<Item = f64> {
    let n = order as f64;
    (0..order / 2).map(move |k| 1.0 / (2.0 * ((2 * k + 1) as f64 * PI / (2.0 * n)).cos()))
}

/// Cascade of second-order sections.
#[derive(Debug, Clone, Default)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    /// Butterworth high-pass of even `order`.
    pub fn highpass(order: usize, cutoff: f64, sample_rate: f64) -> Self {
        let sections = butterworth_q(order)
            .map(|q| Biquad::new(highpass_coefficients(cutoff, q, sample_rate)))
            .collect();
        Self { sections }
    }

    /// Butterworth low-pass of even `order`.
    pub fn lowpass(order: usize, cutoff: f64, sample_rate: f64) -> Self {
        let sections = butterworth_q(order)
            .map(|q| Biquad::new(lowpass_coefficients(cutoff, q, sample_rate)))
            .collect();
        Self { sections }
    }

    /// Band-pass built from a high-pass at `low` and a low-pass at `high`.
    pub fn bandpass(order: usize, low: f64, high: f64, sample_rate: f64) -> Self {
        let mut filter = Self::highpass(order, low, sample_rate);
        filter
            .sections
            .extend(Self::lowpass(order, high, sample_rate).sections);
        filter
    }

    /// Number of second-order sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the cascade has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Process one sample through every section.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.sections.iter_mut().fold(input, |x, s| s.process(x))
    }

    /// Zero-phase filtering: forward, then backward.
    ///
    /// The signal is extended at both ends by an odd reflection of
    /// `3 * (2 * sections + 1)` samples (at most `len - 1`), and every pass
    /// starts from the steady state of its first sample.
    pub fn filtfilt(&self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n < 2 || self.is_empty() {
            return signal.to_vec();
        }
        let pad = (3 * (2 * self.len() + 1)).min(n - 1);
        let (first, last) = (signal[0], signal[n - 1]);

        let mut ext = Vec::with_capacity(n + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
        ext.extend_from_slice(signal);
        ext.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));

        let mut pass = self.clone();
        pass.run_primed(&mut ext);
        ext.reverse();
        pass.run_primed(&mut ext);
        ext.reverse();

        ext.drain(pad..pad + n).collect()
    }

    fn run_primed(&mut self, data: &mut [f64]) {
        let Some(&first) = data.first() else {
            return;
        };
        let mut level = first;
        for section in &mut self.sections {
            section.prime(level);
            level *= section.dc_gain();
        }
        for sample in data.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

/// Running median over an odd `kernel`, with zeros beyond both ends.
pub fn median_filter(signal: &[f64], kernel: usize) -> Result<Vec<f64>, AnalysisError> {
    if kernel == 0 || kernel.is_multiple_of(2) {
        return Err(AnalysisError::InvalidFilter(format!(
            "median kernel must be odd and positive, got {kernel}"
        )));
    }
    let half = kernel / 2;
    let n = signal.len();
    let mut window = Vec::with_capacity(kernel);

    Ok((0..n)
        .map(|i| {
            window.clear();
            window.extend((0..kernel).map(|k| {
                (i + k)
                    .checked_sub(half)
                    .and_then(|j| signal.get(j))
                    .copied()
                    .unwrap_or(0.0)
            }));
            window.sort_by(|a, b| a.total_cmp(b));
            window[half]
        })
        .collect())
}

/// Zero-phase Butterworth high-pass at `cutoff` Hz.
pub fn highpass(
    signal: &[f64],
    cutoff: f64,
    sample_rate: f64,
    config: &FilterConfig,
) -> Result<Vec<f64>, AnalysisError> {
    let nyquist = sample_rate / 2.0;
    if !(cutoff > 0.0 && cutoff < nyquist) {
        return Err(AnalysisError::InvalidFilter(format!(
            "high-pass cutoff {cutoff} Hz outside (0, {nyquist:.1}) Hz"
        )));
    }
    Ok(SosFilter::highpass(config.order, cutoff, sample_rate).filtfilt(signal))
}

fn variance(signal: &[f64]) -> f64 {
    std_dev(signal).map_or(0.0, |s| s * s)
}

/// Band-pass around each of `centers` (Hz) in turn.
///
/// Each band starts `initial_bandwidth_hz` wide and grows by
/// `bandwidth_growth` until it removes at most `max_energy_loss` of the
/// variance of the signal entering it, for at most `max_iterations`
/// attempts. A band that never qualifies leaves the signal untouched.
/// Returns the filtered signal and one message per band.
pub fn adaptive_bandpass(
    signal: &[f64],
    sample_rate: f64,
    centers: &[f64],
    config: &FilterConfig,
) -> (Vec<f64>, Vec<String>) {
    let mut current = signal.to_vec();
    let mut messages = Vec::with_capacity(centers.len());
    let nyquist = sample_rate / 2.0;

    for &fc in centers {
        if !(fc > 0.0 && fc < nyquist) {
            messages.push(format!(
                "{fc:.1} Hz outside the valid range (0-{nyquist:.1} Hz)"
            ));
            continue;
        }

        let energy_in = variance(&current).max(1e-10);
        let mut bandwidth = config.initial_bandwidth_hz;
        let mut accepted = None;

        for _ in 0..config.max_iterations {
            let low = (fc - bandwidth / 2.0).max(config.min_frequency);
            let high = (fc + bandwidth / 2.0).min(nyquist - config.min_frequency);
            if low >= high {
                break;
            }
            let candidate = SosFilter::bandpass(config.order, low, high, sample_rate).filtfilt(&current);
            let loss = 1.0 - variance(&candidate) / energy_in;
            tracing::debug!(fc, bandwidth, loss, "band attempt");
            if loss <= config.max_energy_loss {
                accepted = Some((candidate, bandwidth, loss));
                break;
            }
            bandwidth *= config.bandwidth_growth;
        }

        match accepted {
            Some((filtered, bandwidth, loss)) => {
                messages.push(format!(
                    "{fc:.1} Hz: bandwidth {bandwidth:.1} Hz, energy loss {:.2}%",
                    loss * 100.0
                ));
                current = filtered;
            }
            None => messages.push(format!("could not fit a band around {fc:.1} Hz")),
        }
    }

    (current, messages)
}

/// Which filters to run on a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    /// Median kernel length (odd).
    pub median_kernel: Option<usize>,
    /// High-pass cutoff (Hz).
    pub highpass_hz: Option<f64>,
    /// Centres of the adaptive bands (Hz).
    pub bandpass_centers_hz: Vec<f64>,
    /// Filter the force column too, not only the acceleration axes.
    pub include_force: bool,
}

impl FilterRequest {
    /// Whether no filter is requested.
    pub fn is_empty(&self) -> bool {
        self.median_kernel.is_none() && self.highpass_hz.is_none() && self.bandpass_centers_hz.is_empty()
    }

    fn apply(
        &self,
        column: &str,
        samples: &[f64],
        sample_rate: f64,
        config: &FilterConfig,
        messages: &mut Vec<String>,
    ) -> Result<Vec<f64>, AnalysisError> {
        let mut out = samples.to_vec();
        if let Some(kernel) = self.median_kernel {
            out = median_filter(&out, kernel)?;
            messages.push(format!("median applied to {column}: kernel {kernel}"));
        }
        if let Some(cutoff) = self.highpass_hz {
            out = highpass(&out, cutoff, sample_rate, config)?;
            messages.push(format!("high-pass applied to {column}: {cutoff} Hz"));
        }
        if !self.bandpass_centers_hz.is_empty() {
            let (filtered, bands) = adaptive_bandpass(&out, sample_rate, &self.bandpass_centers_hz, config);
            out = filtered;
            messages.push(format!("multiband {column}: {}", bands.join("; ")));
        }
        Ok(out)
    }
}

/// Run `request` on the acceleration axes of `record` (and its force when
/// asked). The time axis is never touched.
pub fn filter_record(
    record: &ImpactRecord,
    sample_rate: f64,
    request: &FilterRequest,
    config: &FilterConfig,
) -> Result<(ImpactRecord, Vec<String>), AnalysisError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(AnalysisError::InvalidFilter(format!(
            "sample rate {sample_rate} Hz"
        )));
    }
    let mut out = record.clone();
    let mut messages = Vec::new();
    if request.is_empty() {
        return Ok((out, messages));
    }

    if request.include_force {
        out.force = request.apply("force", &record.force, sample_rate, config, &mut messages)?;
    }
    for axis in record.axes() {
        if let Some(samples) = record.axis(axis) {
            let filtered = request.apply(axis.column_name(), samples, sample_rate, config, &mut messages)?;
            out.set_axis(axis, filtered)?;
        }
    }
    tracing::info!(sample_rate, filters = messages.len(), "record filtered");
    Ok((out, messages))
}
