//! Benchmarks for the ocean pipeline and noise generation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ocean_fft::grid::ComplexGrid;
use ocean_fft::noise::{octave_textures, NoiseGenerator, NoiseTextureConfig};
use ocean_fft::ocean::{ButterflyEngine, InitialSpectrum, OceanConfigBuilder, OceanSimulation};
use rustfft::num_complex::Complex32;
use std::num::NonZeroU32;

fn bench_butterfly(c: &mut Criterion) {
    let mut group = c.benchmark_group("Butterfly Transform");

    for n in [64usize, 128, 256, 512] {
        let spectrum = ComplexGrid::from_fn(n, |x, y| {
            Complex32::new((x as f32 * 0.1).sin(), (y as f32 * 0.2).cos())
        });

        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::new("inverse", n), &n, |b, &n| {
            let mut engine = ButterflyEngine::new(n).unwrap();
            b.iter(|| {
                black_box(engine.inverse(&spectrum).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_initial_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Initial Spectrum");

    for n in [128usize, 512] {
        let config = OceanConfigBuilder::new().resolution(n).build().unwrap();
        group.bench_with_input(BenchmarkId::new("generate", n), &config, |b, config| {
            b.iter(|| {
                black_box(InitialSpectrum::generate(config).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_simulation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simulation Step");
    group.sample_size(20);

    for (n, choppiness) in [(128usize, 0.0f32), (128, 1.0), (256, 1.0)] {
        let config = OceanConfigBuilder::new()
            .resolution(n)
            .choppiness(choppiness)
            .build()
            .unwrap();

        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(
            BenchmarkId::new("step", format!("{}_chop{}", n, choppiness)),
            &config,
            |b, config| {
                let mut sim = OceanSimulation::new(config.clone()).unwrap();
                b.iter(|| {
                    black_box(sim.step(1.0 / 60.0).unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("Noise");

    let generator = NoiseGenerator::new(42);
    let period = NonZeroU32::new(16).unwrap();
    group.throughput(Throughput::Elements(1024));
    group.bench_function("noise_1024", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for i in 0..1024 {
                sum += generator.noise(i as f32 * 0.137, i as f32 * 0.071, period);
            }
            black_box(sum)
        });
    });

    let config = NoiseTextureConfig::default();
    group.sample_size(10);
    group.bench_function("octave_textures_256", |b| {
        b.iter(|| {
            black_box(octave_textures(&config).unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_butterfly,
    bench_initial_spectrum,
    bench_simulation_step,
    bench_noise
);
criterion_main!(benches);
