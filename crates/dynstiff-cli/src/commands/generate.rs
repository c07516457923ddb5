//! Synthetic impact-test generation.

use super::common::parse_mode_spec;
use clap::Args;
use dynstiff_analysis::{Axis, ImpactRecord};
use dynstiff_io::write_table;
use std::f64::consts::PI;
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    /// Output table
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Sample rate in Hz
    #[arg(long, default_value = "2048")]
    sample_rate: f64,

    /// Duration in seconds
    #[arg(long, default_value = "4.0")]
    duration: f64,

    /// Modes as frequency:zeta pairs (e.g., "50:0.02,150:0.05")
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_mode_spec,
        default_values = ["50:0.02", "150:0.05"]
    )]
    modes: Vec<(f64, f64)>,

    /// Uniform noise amplitude (g) added to force and response
    #[arg(long, default_value = "0.0")]
    noise: f64,

    /// Acceleration axis to write
    #[arg(long, default_value = "x")]
    axis: Axis,

    /// Impact time (s)
    #[arg(long, default_value = "0.1")]
    onset: f64,

    /// Hammer contact duration (s)
    #[arg(long, default_value = "0.002")]
    pulse_width: f64,

    /// Peak hammer force signal (g)
    #[arg(long, default_value = "50.0")]
    force_peak: f64,

    /// Peak response amplitude (g)
    #[arg(long, default_value = "1.0")]
    response_peak: f64,

    /// Noise generator seed
    #[arg(long, default_value = "1")]
    seed: u64,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    if !(args.sample_rate > 0.0 && args.duration > 0.0) {
        anyhow::bail!("Sample rate and duration must be positive");
    }
    let n = (args.sample_rate * args.duration) as usize;
    if n < 2 {
        anyhow::bail!("Duration too short for {} Hz", args.sample_rate);
    }

    println!(
        "Generating {:.2}s impact test at {} Hz to {}...",
        args.duration,
        args.sample_rate,
        args.output.display()
    );

    let mut force = half_sine_pulse(
        n,
        args.sample_rate,
        args.onset,
        args.pulse_width,
        args.force_peak,
    );
    let mut response = modal_response(&force, args.sample_rate, &args.modes);
    let peak = response.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if peak > 0.0 {
        let gain = args.response_peak / peak;
        response.iter_mut().for_each(|v| *v *= gain);
    }

    let mut rng = XorShift::new(args.seed);
    if args.noise > 0.0 {
        for v in force.iter_mut().chain(response.iter_mut()) {
            *v += args.noise * rng.next_signed();
        }
    }

    let record = ImpactRecord::uniform(args.sample_rate, force).with_axis(args.axis, response)?;
    write_table(&args.output, &record)?;

    for (freq, zeta) in &args.modes {
        println!("  mode {:.2} Hz, zeta {:.4}", freq, zeta);
    }
    println!("  {} samples written", n);
    Ok(())
}

/// Half-sine hammer pulse of `width` seconds starting at `onset`.
fn half_sine_pulse(n: usize, sample_rate: f64, onset: f64, width: f64, peak: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate - onset;
            if width > 0.0 && (0.0..width).contains(&t) {
                peak * (PI * t / width).sin()
            } else {
                0.0
            }
        })
        .collect()
}

/// Convolve `force` with the impulse response of a sum of lightly damped
/// modes, each `exp(-zeta*w*t) * sin(wd*t)`.
fn modal_response(force: &[f64], sample_rate: f64, modes: &[(f64, f64)]) -> Vec<f64> {
    let n = force.len();
    let dt = 1.0 / sample_rate;
    let kernel: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 * dt;
            modes
                .iter()
                .map(|&(f, zeta)| {
                    let w = 2.0 * PI * f;
                    let wd = w * (1.0 - zeta * zeta).sqrt();
                    (-zeta * w * t).exp() * (wd * t).sin()
                })
                .sum()
        })
        .collect();

    let mut out = vec![0.0; n];
    for (j, &f) in force.iter().enumerate() {
        if f == 0.0 {
            continue;
        }
        for (o, k) in out[j..].iter_mut().zip(&kernel) {
            *o += f * k * dt;
        }
    }
    out
}

struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    /// Uniform value in [-1, 1].
    fn next_signed(&mut self) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_shape() {
        let pulse = half_sine_pulse(100, 1024.0, 10.0 / 1024.0, 4.0 / 1024.0, 2.0);
        assert_eq!(pulse[9], 0.0);
        assert_eq!(pulse[10], 0.0);
        assert!((pulse[12] - 2.0).abs() < 1e-12);
        assert_eq!(pulse[14], 0.0);
        assert_eq!(pulse.iter().filter(|v| **v > 0.0).count(), 3);
    }

    #[test]
    fn test_response_is_causal() {
        let mut force = vec![0.0; 256];
        force[100] = 1.0;
        let response = modal_response(&force, 1024.0, &[(50.0, 0.02)]);
        assert!(response[..101].iter().all(|v| *v == 0.0));
        assert!(response[105] != 0.0);
    }

    #[test]
    fn test_noise_is_bounded_and_seeded() {
        let mut a = XorShift::new(7);
        let mut b = XorShift::new(7);
        for _ in 0..1000 {
            let v = a.next_signed();
            assert!((-1.0..=1.0).contains(&v));
            assert_eq!(v, b.next_signed());
        }
    }
}
