//! Criterion benchmarks for dynstiff-analysis components
//!
//! Run with: cargo bench -p dynstiff-analysis

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dynstiff_analysis::{
    AnalysisConfig, Axis, DampingReport, Fft, FilterRequest, ImpactRecord, StiffnessAnalyzer,
    WelchEstimator,
    config::{DampingConfig, SpectralConfig},
    estimate_cross_spectra,
};
use std::f64::consts::PI;

const SAMPLE_RATE: f64 = 2000.0;

/// Decaying 50 Hz response starting halfway through the record
fn generate_response(size: usize) -> Vec<f64> {
    let onset = size as f64 / SAMPLE_RATE / 2.0;
    (0..size)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE - onset;
            if t < 0.0 {
                0.0
            } else {
                (-0.02 * 2.0 * PI * 50.0 * t).exp() * (2.0 * PI * 50.0 * t).sin()
            }
        })
        .collect()
}

/// Half-sine hammer pulse aligned with the response onset
fn generate_force(size: usize) -> Vec<f64> {
    let onset = size / 2;
    let width = (0.002 * SAMPLE_RATE) as usize;
    (0..size)
        .map(|i| {
            if i >= onset && i < onset + width {
                50.0 * (PI * (i - onset) as f64 / width as f64).sin()
            } else {
                0.0
            }
        })
        .collect()
}

fn impact_record(size: usize) -> ImpactRecord {
    ImpactRecord::uniform(SAMPLE_RATE, generate_force(size))
        .with_axis(Axis::X, generate_response(size))
        .unwrap()
}

// ============================================================================
// FFT benchmarks
// ============================================================================

fn bench_fft_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("FFT_Forward");

    for &size in &[256, 1024, 4096, 40_000] {
        let fft = Fft::new(size);
        let input = generate_response(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(fft.forward(black_box(&input))))
        });
    }

    group.finish();
}

// ============================================================================
// Spectral estimation benchmarks
// ============================================================================

fn bench_welch_csd(c: &mut Criterion) {
    let mut group = c.benchmark_group("Welch_CSD");

    for &size in &[4096, 40_000, 200_000] {
        let force = generate_force(size);
        let response = generate_response(size);
        let config = SpectralConfig::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                black_box(estimate_cross_spectra(
                    black_box(&force),
                    black_box(&response),
                    SAMPLE_RATE,
                    &config,
                ))
            })
        });
    }

    group.finish();
}

fn bench_welch_psd(c: &mut Criterion) {
    let signal = generate_response(40_000);
    let welch = WelchEstimator::new(SAMPLE_RATE, 1024);

    c.bench_function("Welch_PSD_40000", |b| {
        b.iter(|| black_box(welch.psd(black_box(&signal))))
    });
}

// ============================================================================
// Damping and segmentation benchmarks
// ============================================================================

fn bench_damping(c: &mut Criterion) {
    let response = generate_response(40_000);
    let config = DampingConfig::default();

    c.bench_function("Damping_40000", |b| {
        b.iter(|| {
            black_box(DampingReport::estimate(
                black_box(&response),
                SAMPLE_RATE,
                &[50.0],
                &config,
            ))
        })
    });
}

fn bench_waterfall(c: &mut Criterion) {
    let mut group = c.benchmark_group("Waterfall");
    let record = impact_record(40_000);
    let analyzer = StiffnessAnalyzer::default();

    for &duration in &[0.3, 1.0, 4.0] {
        group.bench_with_input(
            BenchmarkId::from_parameter(duration),
            &duration,
            |b, &duration| {
                b.iter(|| black_box(analyzer.waterfall(&record, Axis::X, Some(duration))))
            },
        );
    }

    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let record = impact_record(40_000);
    let analyzer = StiffnessAnalyzer::default();
    let request = FilterRequest {
        median_kernel: Some(5),
        highpass_hz: Some(2.0),
        bandpass_centers_hz: vec![50.0],
        include_force: false,
    };

    c.bench_function("Filters_40000", |b| {
        b.iter(|| black_box(analyzer.filter(black_box(&record), &request)))
    });
}

// ============================================================================
// Full pipeline
// ============================================================================

fn bench_full_analysis_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("Full_Analysis");
    let analyzer = StiffnessAnalyzer::new(AnalysisConfig::default());

    for &size in &[8192, 40_000] {
        let record = impact_record(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(analyzer.analyze(black_box(&record), Axis::X, Some(1.0), &[50.0])))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fft_forward,
    bench_welch_csd,
    bench_welch_psd,
    bench_damping,
    bench_waterfall,
    bench_filters,
    bench_full_analysis_pipeline,
);

criterion_main!(benches);
