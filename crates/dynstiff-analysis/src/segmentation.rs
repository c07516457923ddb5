//! Time-frequency segmentation for waterfall displays.
//!
//! The response is cut into half-overlapping segments of a requested
//! duration (never shorter than the configured minimum), each segment is
//! Hann-windowed and transformed on its own, and the result is flattened to
//! `(segment, centre time, frequency, amplitude)` points.

use crate::config::{AmplitudeScale, GridConfig, SegmentationConfig};
use crate::error::AnalysisError;
use crate::fft::{Fft, hann_window, rfft_frequencies};
use crate::grid::estimate_sample_interval;
use serde::Serialize;

/// One point of the flattened time-frequency surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaterfallPoint {
    /// Segment index (position among the selected segment starts).
    pub segment: usize,
    /// Time at the centre of the segment (s).
    pub center_time: f64,
    /// Frequency (Hz).
    pub frequency_hz: f64,
    /// Amplitude, linear or dB.
    pub amplitude: f64,
}

/// Magnitude spectrum of one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallSegment {
    /// Segment index.
    pub index: usize,
    /// First sample of the segment.
    pub start: usize,
    /// Time at the centre of the segment (s).
    pub center_time: f64,
    /// |FFT| of the windowed segment.
    pub magnitude: Vec<f64>,
}

/// Per-segment spectra of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct Waterfall {
    /// Sample rate derived from the time axis (Hz).
    pub sample_rate: f64,
    /// Samples per segment.
    pub segment_len: usize,
    /// Samples between consecutive (unsubsampled) segment starts.
    pub step: usize,
    /// Frequency axis shared by every segment (Hz).
    pub frequencies: Vec<f64>,
    /// Analysed segments, in time order.
    pub segments: Vec<WaterfallSegment>,
}

impl Waterfall {
    /// Flatten to points, keeping at most `max_points_per_segment` evenly
    /// strided bins per segment and dropping non-finite values.
    pub fn points(&self, config: &SegmentationConfig) -> Vec<WaterfallPoint> {
        let nfreq = self.frequencies.len();
        let stride = self.bin_stride(config);

        let mut points = Vec::new();
        for segment in &self.segments {
            for j in (0..nfreq).step_by(stride) {
                let frequency_hz = self.frequencies[j];
                let amplitude = scale(segment.magnitude[j], config.scale);
                if frequency_hz.is_finite() && amplitude.is_finite() {
                    points.push(WaterfallPoint {
                        segment: segment.index,
                        center_time: segment.center_time,
                        frequency_hz,
                        amplitude,
                    });
                }
            }
        }
        points
    }

    /// Bin decimation that keeps at most `max_points_per_segment` bins.
    pub fn bin_stride(&self, config: &SegmentationConfig) -> usize {
        (self.frequencies.len() / config.max_points_per_segment.max(1)).max(1)
    }

    /// Nyquist frequency (Hz).
    pub fn max_frequency(&self) -> f64 {
        self.sample_rate / 2.0
    }
}

pub(crate) fn scale(magnitude: f64, scale: AmplitudeScale) -> f64 {
    match scale {
        AmplitudeScale::Linear => magnitude,
        AmplitudeScale::Db => 20.0 * magnitude.max(1e-12).log10(),
    }
}

/// Start indices of `segment_len`-sample segments `step` apart, uniformly
/// subsampled down to `max_segments` when there are more.
pub fn segment_starts(total: usize, segment_len: usize, step: usize, max_segments: usize) -> Vec<usize> {
    if segment_len == 0 || segment_len > total {
        return Vec::new();
    }
    let starts: Vec<usize> = (0..=total - segment_len).step_by(step.max(1)).collect();
    if starts.len() <= max_segments || max_segments == 0 {
        return starts;
    }
    if max_segments == 1 {
        return vec![starts[0]];
    }

    let last = (starts.len() - 1) as f64;
    let div = (max_segments - 1) as f64;
    (0..max_segments)
        .map(|i| starts[((i as f64 * last / div) as usize).min(starts.len() - 1)])
        .collect()
}

/// Segment a response for time-frequency display.
///
/// `segment_duration` (seconds) is floored at the configured minimum; with
/// `None` or a non-positive value the minimum is used. Segments shorter than
/// `min_segment_samples` are skipped.
pub fn segment_response(
    time: &[f64],
    response: &[f64],
    segment_duration: Option<f64>,
    grid: &GridConfig,
    config: &SegmentationConfig,
) -> Result<Waterfall, AnalysisError> {
    let total = time.len().min(response.len());
    if total < 2 {
        return Err(AnalysisError::insufficient("waterfall", 2, total));
    }

    let dt = estimate_sample_interval(&time[..total], grid);
    let sample_rate = 1.0 / dt;

    let duration = match segment_duration {
        Some(d) if d > 0.0 => d.max(config.min_segment_duration),
        _ => config.min_segment_duration,
    };
    let segment_len = ((duration * sample_rate) as usize).min(total);
    let step = ((segment_len as f64 * (1.0 - config.overlap)) as usize).max(1);
    let starts = segment_starts(total, segment_len, step, config.max_segments);

    tracing::debug!(
        segment_len,
        step,
        segments = starts.len(),
        sample_rate,
        "waterfall segmentation"
    );

    let mut segments = Vec::new();
    if segment_len < config.min_segment_samples.max(1) {
        tracing::warn!(
            segment_len,
            min = config.min_segment_samples,
            "no waterfall segment long enough"
        );
        return Ok(Waterfall {
            sample_rate,
            segment_len,
            step,
            frequencies: rfft_frequencies(segment_len, sample_rate),
            segments,
        });
    }

    let window = hann_window(segment_len);
    let fft = Fft::new(segment_len);

    for (index, &start) in starts.iter().enumerate() {
        let end = (start + segment_len).min(total);
        if end - start < config.min_segment_samples {
            continue;
        }
        let windowed: Vec<f64> = response[start..end]
            .iter()
            .zip(&window)
            .map(|(s, w)| s * w)
            .collect();
        let magnitude: Vec<f64> = fft.forward(&windowed).iter().map(|c| c.norm()).collect();
        if !magnitude.iter().any(|m| m.is_finite()) {
            continue;
        }
        segments.push(WaterfallSegment {
            index,
            start,
            center_time: time[start + (end - start) / 2],
            magnitude,
        });
    }

    Ok(Waterfall {
        sample_rate,
        segment_len,
        step,
        frequencies: rfft_frequencies(segment_len, sample_rate),
        segments,
    })
}
