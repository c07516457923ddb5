//! Shared CLI helpers used across multiple commands.

use clap::Args;
use dynstiff_analysis::{FilterRequest, ImpactRecord, StiffnessAnalyzer, cut_record};
use dynstiff_config::{ConfigError, Profile, resolve_profile, validate_profile};
use dynstiff_io::read_table;
use std::path::Path;

/// Parse a `frequency:zeta` mode specification for clap's `value_parser`.
pub fn parse_mode_spec(s: &str) -> Result<(f64, f64), String> {
    let (freq, zeta) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid mode '{}' (expected frequency:zeta)", s))?;
    let freq: f64 = freq
        .trim()
        .parse()
        .map_err(|_| format!("Invalid frequency in '{}'", s))?;
    let zeta: f64 = zeta
        .trim()
        .parse()
        .map_err(|_| format!("Invalid damping ratio in '{}'", s))?;
    if !(freq > 0.0 && freq.is_finite()) {
        return Err(format!("Mode frequency must be positive: '{}'", s));
    }
    if !(zeta > 0.0 && zeta < 1.0) {
        return Err(format!("Damping ratio must be in (0, 1): '{}'", s));
    }
    Ok((freq, zeta))
}

/// Pre-processing filter options shared by the analysis commands.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Median filter kernel length (odd)
    #[arg(long, value_name = "KERNEL")]
    median: Option<usize>,

    /// Butterworth high-pass cutoff (Hz)
    #[arg(long, value_name = "HZ")]
    highpass: Option<f64>,

    /// Centres of the adaptive band-pass filter (e.g., "50,150")
    #[arg(long, value_name = "HZ", value_delimiter = ',')]
    bandpass: Vec<f64>,

    /// Filter the force column as well as the acceleration axes
    #[arg(long)]
    filter_force: bool,
}

impl FilterArgs {
    /// The filters to run.
    pub fn request(&self) -> FilterRequest {
        FilterRequest {
            median_kernel: self.median,
            highpass_hz: self.highpass,
            bandpass_centers_hz: self.bandpass.clone(),
            include_force: self.filter_force,
        }
    }
}

/// Load a profile by name or path, falling back to the engine defaults.
///
/// The profile is validated before use.
pub fn load_profile(name: Option<&str>) -> anyhow::Result<Profile> {
    let profile = match name {
        Some(name) => resolve_profile(name).map_err(|e| match e {
            ConfigError::ProfileNotFound(_) => anyhow::anyhow!(
                "Profile '{}' not found. Use 'dynstiff profile list' to see available profiles.",
                name
            ),
            other => other.into(),
        })?,
        None => Profile::default(),
    };
    validate_profile(&profile)?;
    Ok(profile)
}

/// Read an impact table, filter it and optionally cut it to `[start, end]`.
///
/// Filters run on the whole record before the cut. A missing bound
/// defaults to the corresponding end of the record.
pub fn load_record(
    path: &Path,
    start: Option<f64>,
    end: Option<f64>,
    filters: &FilterRequest,
    profile: &Profile,
) -> anyhow::Result<ImpactRecord> {
    let mut record = read_table(path)?;
    let axes: Vec<String> = record.axes().iter().map(|a| a.to_string()).collect();
    println!(
        "  {} rows, axes: {}",
        record.len(),
        if axes.is_empty() {
            "none".to_string()
        } else {
            axes.join(", ")
        }
    );

    if !filters.is_empty() {
        let analyzer = StiffnessAnalyzer::new(profile.analysis.clone());
        let (filtered, messages) = analyzer.filter(&record, filters)?;
        for message in &messages {
            println!("  {}", message);
        }
        record = filtered;
    }

    if start.is_none() && end.is_none() {
        return Ok(record);
    }

    let first = record.time.first().copied().unwrap_or(0.0);
    let last = record.time.last().copied().unwrap_or(0.0);
    let (cut, message) = cut_record(
        &record,
        start.unwrap_or(first),
        end.unwrap_or(last),
        &profile.analysis.cutting,
    )?;
    println!("  {}", message);
    Ok(cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_spec() {
        assert_eq!(parse_mode_spec("50:0.02"), Ok((50.0, 0.02)));
        assert_eq!(parse_mode_spec(" 150 : 0.05 "), Ok((150.0, 0.05)));
        assert!(parse_mode_spec("50").is_err());
        assert!(parse_mode_spec("-5:0.02").is_err());
        assert!(parse_mode_spec("50:1.5").is_err());
        assert!(parse_mode_spec("fifty:0.1").is_err());
    }

    #[test]
    fn test_filter_args_request() {
        let args = FilterArgs {
            median: Some(5),
            bandpass: vec![50.0, 150.0],
            ..FilterArgs::default()
        };
        let request = args.request();
        assert_eq!(request.median_kernel, Some(5));
        assert_eq!(request.highpass_hz, None);
        assert_eq!(request.bandpass_centers_hz, vec![50.0, 150.0]);
        assert!(!request.include_force);
        assert!(FilterArgs::default().request().is_empty());
    }

    #[test]
    fn test_default_profile_loads() {
        let profile = load_profile(None).unwrap();
        assert_eq!(profile.hammer_mass_kg, 1.0);
        assert!(load_profile(Some("machine-tool")).is_ok());
        assert!(load_profile(Some("no-such-profile-98765")).is_err());
    }
}
