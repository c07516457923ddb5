//! Impact-test analysis command.

use super::common::{FilterArgs, load_profile, load_record};
use clap::Args;
use dynstiff_analysis::export::{export_frf_csv, export_report_json, export_stiffness_csv};
use dynstiff_analysis::{AnalysisReport, Axis, StiffnessAnalyzer};
use std::path::PathBuf;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input table (time, force and acceleration columns)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Acceleration axis to analyse (x, y or z)
    #[arg(long)]
    axis: Option<Axis>,

    /// Hammer mass in kg
    #[arg(long)]
    mass: Option<f64>,

    /// Profile name or path
    #[arg(long)]
    profile: Option<String>,

    /// Expected modal frequencies in Hz (e.g., "50,150")
    #[arg(long, value_delimiter = ',')]
    modes: Vec<f64>,

    /// Start of the analysed time range (s)
    #[arg(long)]
    start: Option<f64>,

    /// End of the analysed time range (s)
    #[arg(long)]
    end: Option<f64>,

    #[command(flatten)]
    filters: FilterArgs,

    /// Write a JSON report
    #[arg(long, value_name = "OUT")]
    json: Option<PathBuf>,

    /// Write the dynamic stiffness as CSV
    #[arg(long, value_name = "OUT")]
    stiffness_csv: Option<PathBuf>,

    /// Write H1, H2, Hv and coherence as CSV
    #[arg(long, value_name = "OUT")]
    frf_csv: Option<PathBuf>,
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let profile = load_profile(args.profile.as_deref())?;
    let axis = args.axis.unwrap_or(profile.axis);
    let mass = args.mass.unwrap_or(profile.hammer_mass_kg);
    let modes = if args.modes.is_empty() {
        profile.expected_modes_hz.clone()
    } else {
        args.modes.clone()
    };

    println!("Analyzing {} (axis {})...", args.input.display(), axis);
    let record = load_record(&args.input, args.start, args.end, &args.filters.request(), &profile)?;

    let analyzer = StiffnessAnalyzer::new(profile.analysis);
    let report = analyzer.analyze(&record, axis, Some(mass), &modes);
    print_report(&report);

    if let Some(path) = &args.json {
        export_report_json(&report, path)?;
        println!("\nWrote report to {}", path.display());
    }

    if let Some(path) = &args.stiffness_csv {
        match &report.view {
            Ok(view) => {
                export_stiffness_csv(view, path)?;
                println!("Wrote stiffness to {}", path.display());
            }
            Err(err) => anyhow::bail!("Cannot export stiffness: {}", err),
        }
    }

    if let Some(path) = &args.frf_csv {
        match &report.frf {
            Ok(frf) => {
                export_frf_csv(frf, path)?;
                println!("Wrote FRF to {}", path.display());
            }
            Err(err) => anyhow::bail!("Cannot export FRF: {}", err),
        }
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("\nTemporal grid:");
    match &report.grid {
        Ok(grid) => {
            println!(
                "  fs = {:.2} Hz, dt = {:.6} s, irregularity {:.2}%",
                grid.sample_rate,
                grid.sample_interval,
                grid.irregularity * 100.0
            );
            if grid.regenerated {
                println!("  time axis regenerated");
            }
            if grid.fallback {
                println!("  default sample interval used");
            }
        }
        Err(err) => println!("  unavailable: {}", err),
    }
    println!("  hammer mass: {} kg", report.hammer_mass_kg);

    println!("\nModal damping (half-power):");
    if report.damping.modes.is_empty() {
        println!("  (no modes found)");
    } else {
        println!(
            "  {:>10}  {:>8}  {:>10}  {:>10}",
            "Freq (Hz)", "zeta", "f1 (Hz)", "f2 (Hz)"
        );
        println!(
            "  {:>10}  {:>8}  {:>10}  {:>10}",
            "---------", "----", "-------", "-------"
        );
        for mode in &report.damping.modes {
            println!(
                "  {:>10.2}  {:>8.4}  {:>10.2}  {:>10.2}",
                mode.frequency_hz, mode.zeta, mode.f1, mode.f2
            );
        }
    }

    match &report.damping.global {
        Some(global) => println!(
            "\nGlobal damping (log decrement): zeta = {:.4} from {} peaks at {:.2} Hz",
            global.zeta, global.peaks_used, global.frequency_hz
        ),
        None => println!("\nGlobal damping (log decrement): unavailable"),
    }
    if let Some(c_per_m) = report.damping_per_mass {
        println!("Damping per unit mass C/m: {:.3} 1/s", c_per_m);
    }

    match &report.view {
        Ok(view) if !view.is_empty() => {
            let (i_min, k_min) = view
                .magnitude
                .iter()
                .copied()
                .enumerate()
                .fold((0, f64::INFINITY), |acc, (i, k)| if k < acc.1 { (i, k) } else { acc });
            println!(
                "\nDynamic stiffness: {} bins from {:.1} to {:.1} Hz",
                view.len(),
                view.frequencies[0],
                view.frequencies[view.len() - 1]
            );
            println!(
                "  minimum |K| = {:.4e} N/m ({:.3} N/mm) at {:.2} Hz",
                k_min,
                k_min / 1000.0,
                view.frequencies[i_min]
            );
        }
        Ok(_) => println!("\nDynamic stiffness: no bins displayed"),
        Err(err) => println!("\nDynamic stiffness: unavailable ({})", err),
    }

    if !report.diagnostics.is_empty() {
        println!("\nDiagnostics:");
        for line in &report.diagnostics {
            println!("  - {}", line);
        }
    }
}
