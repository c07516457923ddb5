//! Time-range cutting of impact records.
//!
//! A cut must leave enough samples for the whole-record FFT, the waterfall
//! and the averaged spectra. When the requested range is too short it is
//! widened: first the end forward to the timestamp that completes the
//! minimum row count (at most the last timestamp), then the start backward
//! in the same way.

use crate::config::CuttingConfig;
use crate::error::AnalysisError;
use crate::input::ImpactRecord;

/// Keep the rows of `record` with `start <= t <= end`, widening the range
/// until it holds at least [`CuttingConfig::min_points`] rows (or the whole
/// record). Returns the cut record and a message describing the range.
pub fn cut_record(
    record: &ImpactRecord,
    start: f64,
    end: f64,
    config: &CuttingConfig,
) -> Result<(ImpactRecord, String), AnalysisError> {
    if record.is_empty() {
        return Err(AnalysisError::insufficient("cutting", 1, 0));
    }
    if !(start.is_finite() && end.is_finite()) || start >= end {
        return Err(AnalysisError::InvalidRange(format!(
            "start {start} s must be before end {end} s"
        )));
    }

    let time = &record.time;
    let mut sorted: Vec<f64> = time.iter().copied().filter(|t| t.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let (Some(&t_min), Some(&t_max)) = (sorted.first(), sorted.last()) else {
        return Err(AnalysisError::InvalidRange("time axis has no finite values".to_string()));
    };

    let count = |lo: f64, hi: f64| {
        sorted.partition_point(|&t| t <= hi) - sorted.partition_point(|&t| t < lo)
    };

    let min_points = config.min_points();
    let (mut lo, mut hi) = (start, end);
    let mut widened = false;

    // Jump by index in the sorted axis so the loop count never depends on
    // the spacing of the timestamps.
    if count(lo, hi) < min_points && hi < t_max {
        widened = true;
        let first_idx = sorted.partition_point(|&t| t < lo);
        let idx = (first_idx + min_points).min(sorted.len()) - 1;
        hi = sorted[idx].max(hi).min(t_max);
    }
    if count(lo, hi) < min_points && lo > t_min {
        widened = true;
        let end_idx = sorted.partition_point(|&t| t <= hi);
        let idx = end_idx.saturating_sub(min_points);
        lo = sorted[idx].min(lo).max(t_min);
    }

    let first = time.iter().position(|&t| t >= lo && t <= hi);
    let last = time.iter().rposition(|&t| t >= lo && t <= hi);
    let (Some(first), Some(last)) = (first, last) else {
        return Err(AnalysisError::InvalidRange(format!(
            "no data between {lo:.2} s and {hi:.2} s"
        )));
    };

    let mut cut = record.slice(first..last + 1);
    if !time[first..=last].iter().all(|&t| t >= lo && t <= hi) {
        // Unsorted time axis: fall back to a row-by-row filter
        let keep: Vec<usize> = (0..record.len())
            .filter(|&i| time[i] >= lo && time[i] <= hi)
            .collect();
        cut = select_rows(record, &keep)?;
    }

    let message = if widened {
        tracing::info!(start, end, lo, hi, rows = cut.len(), "cut range widened");
        format!(
            "requested cut: {start:.2} s to {end:.2} s. applied cut: {lo:.2} s to {hi:.2} s, {} points \
             (range widened to keep at least {min_points} points)",
            cut.len()
        )
    } else {
        format!("applied cut: {lo:.2} s to {hi:.2} s, {} points", cut.len())
    };

    Ok((cut, message))
}

fn select_rows(record: &ImpactRecord, rows: &[usize]) -> Result<ImpactRecord, AnalysisError> {
    let pick = |v: &[f64]| rows.iter().map(|&i| v[i]).collect::<Vec<f64>>();
    let mut out = ImpactRecord::new(pick(&record.time), pick(&record.force))?;
    for axis in record.axes() {
        if let Some(samples) = record.axis(axis) {
            out.set_axis(axis, pick(samples))?;
        }
    }
    Ok(out)
}
