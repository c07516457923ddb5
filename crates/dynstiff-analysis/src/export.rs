//! Export formats for analysis results.
//!
//! - CSV for the stiffness view, the FRF estimators, the modal table and
//!   the waterfall (flattened points or a time-by-frequency matrix)
//! - JSON summary of a complete [`AnalysisReport`]

use crate::config::SegmentationConfig;
use crate::damping::{GlobalDamping, Mode};
use crate::engine::AnalysisReport;
use crate::frf::{FrfEstimate, FrfSource};
use crate::input::Axis;
use crate::segmentation::{Waterfall, scale};
use crate::stiffness::StiffnessView;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;

fn create(path: impl AsRef<Path>) -> std::io::Result<BufWriter<std::fs::File>> {
    Ok(BufWriter::new(std::fs::File::create(path)?))
}

/// Export the displayed dynamic stiffness to CSV.
///
/// Columns: `frequency_hz,stiffness_n_per_m,stiffness_n_per_mm,phase_deg`
pub fn export_stiffness_csv(view: &StiffnessView, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = create(path)?;
    writeln!(file, "frequency_hz,stiffness_n_per_m,stiffness_n_per_mm,phase_deg")?;

    for i in 0..view.len() {
        let k = view.magnitude[i];
        writeln!(
            file,
            "{:.6},{:.6e},{:.6e},{:.4}",
            view.frequencies[i],
            k,
            k / 1000.0,
            view.phase_deg[i]
        )?;
    }

    file.flush()
}

/// Export all three FRF estimators and the coherence to CSV.
///
/// Complex values are written as separate real and imaginary columns.
pub fn export_frf_csv(frf: &FrfEstimate, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = create(path)?;
    writeln!(
        file,
        "frequency_hz,h1_re,h1_im,h2_re,h2_im,hv_re,hv_im,coherence"
    )?;

    for i in 0..frf.len() {
        let (h1, h2, hv) = (frf.h1[i], frf.h2[i], frf.hv[i]);
        writeln!(
            file,
            "{:.6},{:.6e},{:.6e},{:.6e},{:.6e},{:.6e},{:.6e},{:.6}",
            frf.frequencies[i], h1.re, h1.im, h2.re, h2.im, hv.re, hv.im, frf.coherence[i]
        )?;
    }

    file.flush()
}

/// Export the half-power modal table to CSV.
pub fn export_modes_csv(modes: &[Mode], path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = create(path)?;
    writeln!(file, "frequency_hz,zeta,f1_hz,f2_hz")?;
    for mode in modes {
        writeln!(
            file,
            "{:.4},{:.6},{:.4},{:.4}",
            mode.frequency_hz, mode.zeta, mode.f1, mode.f2
        )?;
    }
    file.flush()
}

/// Export a waterfall as flattened `(segment, time, frequency, amplitude)`
/// rows, decimated and scaled per `config`.
pub fn export_waterfall_csv(
    waterfall: &Waterfall,
    config: &SegmentationConfig,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let mut file = create(path)?;
    writeln!(file, "segment,center_time_s,frequency_hz,amplitude")?;
    for point in waterfall.points(config) {
        writeln!(
            file,
            "{},{:.6},{:.4},{:.6e}",
            point.segment, point.center_time, point.frequency_hz, point.amplitude
        )?;
    }
    file.flush()
}

/// Export a waterfall as a matrix: a header of frequencies, then one row
/// per segment starting with its centre time.
///
/// Bins are decimated and amplitudes scaled the same way as
/// [`export_waterfall_csv`].
pub fn export_waterfall_matrix_csv(
    waterfall: &Waterfall,
    config: &SegmentationConfig,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let mut file = create(path)?;
    let bins: Vec<usize> = (0..waterfall.frequencies.len())
        .step_by(waterfall.bin_stride(config))
        .collect();

    write!(file, "center_time_s")?;
    for &j in &bins {
        write!(file, ",{:.4}", waterfall.frequencies[j])?;
    }
    writeln!(file)?;

    for segment in &waterfall.segments {
        write!(file, "{:.6}", segment.center_time)?;
        for &j in &bins {
            write!(file, ",{:.6e}", scale(segment.magnitude[j], config.scale))?;
        }
        writeln!(file)?;
    }

    file.flush()
}

/// Serializable digest of an [`AnalysisReport`].
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    /// Analysed axis.
    pub axis: Axis,
    /// Sample rate (Hz).
    pub sample_rate: Option<f64>,
    /// Whether the time axis was regenerated.
    pub grid_regenerated: Option<bool>,
    /// Hammer mass used (kg).
    pub hammer_mass_kg: f64,
    /// Welch segment length.
    pub welch_segment_len: Option<usize>,
    /// Number of averaged Welch segments.
    pub welch_segments: Option<usize>,
    /// Bins answered by each FRF estimator: `[h1, blend, h2]`.
    pub frf_sources: Option<[usize; 3]>,
    /// Antiresonant bins replaced by interpolation.
    pub antiresonant_bins: Option<usize>,
    /// Stiffness on well-excited bins.
    pub stiffness: Option<&'a StiffnessView>,
    /// Half-power modes.
    pub modes: &'a [Mode],
    /// Log-decrement damping.
    pub global_damping: Option<GlobalDamping>,
    /// C/m (1/s).
    pub damping_per_mass: Option<f64>,
    /// Stage diagnostics.
    pub diagnostics: &'a [String],
}

impl<'a> ReportSummary<'a> {
    /// Summarize `report`.
    pub fn new(report: &'a AnalysisReport) -> Self {
        let grid = report.grid.as_ref().ok();
        let spectra = report.spectra.as_ref().ok();
        let frf_sources = report.frf.as_ref().ok().map(|frf| {
            let count = |s: FrfSource| frf.source.iter().filter(|&&x| x == s).count();
            [
                count(FrfSource::H1),
                count(FrfSource::Blend),
                count(FrfSource::H2),
            ]
        });

        Self {
            axis: report.axis,
            sample_rate: grid.map(|g| g.sample_rate),
            grid_regenerated: grid.map(|g| g.regenerated),
            hammer_mass_kg: report.hammer_mass_kg,
            welch_segment_len: spectra.map(|s| s.segment_len),
            welch_segments: spectra.map(|s| s.num_segments),
            frf_sources,
            antiresonant_bins: report
                .stiffness
                .as_ref()
                .ok()
                .map(|k| k.antiresonance_count()),
            stiffness: report.view.as_ref().ok(),
            modes: &report.damping.modes,
            global_damping: report.damping.global,
            damping_per_mass: report.damping_per_mass,
            diagnostics: &report.diagnostics,
        }
    }
}

/// Export a JSON summary of `report`.
pub fn export_report_json(report: &AnalysisReport, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = create(path)?;
    serde_json::to_writer_pretty(&mut file, &ReportSummary::new(report))?;
    writeln!(file)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damping::DampingReport;
    use crate::error::AnalysisError;
    use crate::config::AmplitudeScale;
    use crate::segmentation::WaterfallSegment;
    use tempfile::NamedTempFile;

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_stiffness_csv_units() {
        let view = StiffnessView {
            frequencies: vec![10.0, 20.0],
            magnitude: vec![2.0e6, 4.0e6],
            phase_deg: vec![0.0, -90.0],
        };
        let temp_file = NamedTempFile::new().unwrap();
        export_stiffness_csv(&view, temp_file.path()).unwrap();

        let content = read(temp_file.path());
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("frequency_hz"));
        let fields: Vec<f64> = lines[2].split(',').map(|f| f.parse().unwrap()).collect();
        assert_eq!(fields, vec![20.0, 4.0e6, 4.0e3, -90.0]);
    }

    #[test]
    fn test_modes_csv() {
        let modes = [Mode {
            frequency_hz: 50.0,
            zeta: 0.02,
            f1: 49.0,
            f2: 51.0,
        }];
        let temp_file = NamedTempFile::new().unwrap();
        export_modes_csv(&modes, temp_file.path()).unwrap();

        let content = read(temp_file.path());
        assert!(content.contains("50.0000,0.020000,49.0000,51.0000"));
    }

    #[test]
    fn test_waterfall_csv() {
        let waterfall = Waterfall {
            sample_rate: 1000.0,
            segment_len: 4,
            step: 2,
            frequencies: vec![0.0, 250.0, 500.0],
            segments: vec![WaterfallSegment {
                index: 0,
                start: 0,
                center_time: 0.002,
                magnitude: vec![1.0, 2.0, 3.0],
            }],
        };
        let temp_file = NamedTempFile::new().unwrap();
        export_waterfall_csv(&waterfall, &SegmentationConfig::default(), temp_file.path()).unwrap();

        let content = read(temp_file.path());
        assert_eq!(content.lines().count(), 4);
        assert!(content.lines().nth(2).unwrap().starts_with("0,0.002000,250.0000"));
    }

    #[test]
    fn test_waterfall_matrix_csv() {
        let segment = |index: usize, center_time: f64| WaterfallSegment {
            index,
            start: index * 2,
            center_time,
            magnitude: vec![1.0, 10.0, 100.0],
        };
        let waterfall = Waterfall {
            sample_rate: 1000.0,
            segment_len: 4,
            step: 2,
            frequencies: vec![0.0, 250.0, 500.0],
            segments: vec![segment(0, 0.002), segment(1, 0.004)],
        };
        let config = SegmentationConfig {
            scale: AmplitudeScale::Db,
            ..SegmentationConfig::default()
        };
        let temp_file = NamedTempFile::new().unwrap();
        export_waterfall_matrix_csv(&waterfall, &config, temp_file.path()).unwrap();

        let content = read(temp_file.path());
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "center_time_s,0.0000,250.0000,500.0000");
        let row: Vec<f64> = lines[2].split(',').map(|f| f.parse().unwrap()).collect();
        assert_eq!(row.len(), 4);
        assert_eq!(row[0], 0.004);
        assert!((row[2] - 20.0).abs() < 1e-9);
        assert!((row[3] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_json_with_failed_stages() {
        let err = AnalysisError::insufficient("frf", 1024, 10);
        let report = AnalysisReport {
            axis: Axis::Y,
            grid: Err(err.clone()),
            hammer_mass_kg: 1.5,
            spectra: Err(err.clone()),
            frf: Err(err.clone()),
            stiffness: Err(err.clone()),
            view: Err(err),
            damping: DampingReport::default(),
            damping_per_mass: None,
            diagnostics: vec!["hammer mass: 1.5 kg".to_string()],
        };
        let temp_file = NamedTempFile::new().unwrap();
        export_report_json(&report, temp_file.path()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&read(temp_file.path())).unwrap();
        assert_eq!(value["axis"], "y");
        assert_eq!(value["hammer_mass_kg"], 1.5);
        assert!(value["stiffness"].is_null());
        assert_eq!(value["modes"].as_array().unwrap().len(), 0);
        assert_eq!(value["diagnostics"][0], "hammer mass: 1.5 kg");
    }
}
