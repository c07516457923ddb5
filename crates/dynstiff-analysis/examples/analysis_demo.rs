//! Analysis demo: synthetic two-mode impact test, stiffness and damping.
//!
//! Run with: cargo run -p dynstiff-analysis --example analysis_demo

use dynstiff_analysis::{AnalysisConfig, Axis, ImpactRecord, StiffnessAnalyzer};
use std::f64::consts::PI;

fn main() {
    let sample_rate = 2000.0;
    let duration = 20.0;
    let onset = 10.0;
    let modes = [(50.0, 0.02), (150.0, 0.05)];
    let n = (sample_rate * duration) as usize;

    // --- Synthesize the impact test ---
    println!("=== Synthetic Impact Test ===\n");

    let force: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate - onset;
            if (0.0..0.002).contains(&t) {
                50.0 * (PI * t / 0.002).sin()
            } else {
                0.0
            }
        })
        .collect();
    let accel: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate - onset;
            if t < 0.0 {
                return 0.0;
            }
            modes
                .iter()
                .map(|&(f, zeta)| (-zeta * 2.0 * PI * f * t).exp() * (2.0 * PI * f * t).sin())
                .sum()
        })
        .collect();

    for (f, zeta) in modes {
        println!("Mode: {f:.1} Hz, zeta = {zeta:.3}");
    }
    println!("Record: {n} samples at {sample_rate} Hz\n");

    let record = match ImpactRecord::uniform(sample_rate, force).with_axis(Axis::X, accel) {
        Ok(record) => record,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    // --- Run the analysis ---
    let analyzer = StiffnessAnalyzer::new(AnalysisConfig::default());
    let report = analyzer.analyze(&record, Axis::X, Some(1.0), &[50.0, 150.0]);

    println!("=== Modal Damping (half-power) ===\n");
    println!("{:>10} {:>10} {:>10} {:>10}", "f (Hz)", "zeta", "f1 (Hz)", "f2 (Hz)");
    println!("{:->10} {:->10} {:->10} {:->10}", "", "", "", "");
    for mode in &report.damping.modes {
        println!(
            "{:>10.2} {:>10.4} {:>10.2} {:>10.2}",
            mode.frequency_hz, mode.zeta, mode.f1, mode.f2
        );
    }

    if let Some(global) = report.damping.global {
        println!("\nGlobal zeta (log decrement): {:.4}", global.zeta);
    }
    if let Some(c_per_m) = report.damping_per_mass {
        println!("C/m: {c_per_m:.3} 1/s");
    }

    // --- Dynamic stiffness ---
    println!("\n=== Dynamic Stiffness ===\n");
    match &report.view {
        Ok(view) => {
            println!("{:>10} {:>14} {:>10}", "f (Hz)", "|K| (N/mm)", "phase");
            println!("{:->10} {:->14} {:->10}", "", "", "");
            let k_mm = view.magnitude_n_per_mm();
            for i in (0..view.len()).step_by((view.len() / 12).max(1)) {
                println!(
                    "{:>10.1} {:>14.4e} {:>10.1}",
                    view.frequencies[i], k_mm[i], view.phase_deg[i]
                );
            }
        }
        Err(err) => println!("No stiffness spectrum: {err}"),
    }

    println!("\n=== Diagnostics ===\n");
    for line in &report.diagnostics {
        println!("- {line}");
    }
}
