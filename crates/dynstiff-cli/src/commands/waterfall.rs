//! Time-frequency waterfall command.

use super::common::{FilterArgs, load_profile, load_record};
use clap::Args;
use dynstiff_analysis::export::{export_waterfall_csv, export_waterfall_matrix_csv};
use dynstiff_analysis::{AmplitudeScale, Axis, StiffnessAnalyzer};
use std::path::PathBuf;

#[derive(Args)]
pub struct WaterfallArgs {
    /// Input table (time, force and acceleration columns)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Acceleration axis (x, y or z)
    #[arg(long)]
    axis: Option<Axis>,

    /// Segment duration in seconds (floored at the profile minimum)
    #[arg(long)]
    segment_duration: Option<f64>,

    /// Emit amplitudes in dB instead of linear magnitude
    #[arg(long)]
    db: bool,

    /// Profile name or path
    #[arg(long)]
    profile: Option<String>,

    /// Start of the analysed time range (s)
    #[arg(long)]
    start: Option<f64>,

    /// End of the analysed time range (s)
    #[arg(long)]
    end: Option<f64>,

    #[command(flatten)]
    filters: FilterArgs,

    /// Output CSV file
    #[arg(short, long)]
    output: PathBuf,

    /// Also write a time-by-frequency matrix CSV
    #[arg(long, value_name = "OUT")]
    matrix: Option<PathBuf>,
}

pub fn run(args: WaterfallArgs) -> anyhow::Result<()> {
    let mut profile = load_profile(args.profile.as_deref())?;
    let axis = args.axis.unwrap_or(profile.axis);
    if args.db {
        profile.analysis.segmentation.scale = AmplitudeScale::Db;
    }

    println!("Segmenting {} (axis {})...", args.input.display(), axis);
    let record = load_record(&args.input, args.start, args.end, &args.filters.request(), &profile)?;

    let analyzer = StiffnessAnalyzer::new(profile.analysis);
    let waterfall = analyzer.waterfall(&record, axis, args.segment_duration)?;

    println!(
        "  {} segments of {} samples ({:.3} s), 0-{:.1} Hz",
        waterfall.segments.len(),
        waterfall.segment_len,
        waterfall.segment_len as f64 / waterfall.sample_rate,
        waterfall.max_frequency()
    );
    if waterfall.segments.is_empty() {
        anyhow::bail!(
            "No segment reached {} samples; use a longer --segment-duration",
            analyzer.config().segmentation.min_segment_samples
        );
    }

    export_waterfall_csv(&waterfall, &analyzer.config().segmentation, &args.output)?;
    println!("\nWrote waterfall to {}", args.output.display());

    if let Some(path) = &args.matrix {
        export_waterfall_matrix_csv(&waterfall, &analyzer.config().segmentation, path)?;
        println!("Wrote waterfall matrix to {}", path.display());
    }
    Ok(())
}
