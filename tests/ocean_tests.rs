//! Integration tests for the CPU ocean pipeline.

use ocean_fft::grid::{ComplexGrid, Grid};
use ocean_fft::ocean::{
    compose_spectrum, ButterflyEngine, InitialSpectrum, OceanConfig, OceanConfigBuilder,
    OceanError, OceanSimulation, PhaseState,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rustfft::num_complex::Complex32;
use std::f32::consts::TAU;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn zero() -> Complex32 {
    Complex32::new(0.0, 0.0)
}

fn random_grid(n: usize, seed: u64) -> ComplexGrid {
    let mut rng = Pcg32::seed_from_u64(seed);
    Grid::from_fn(n, |_, _| {
        Complex32::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    })
}

#[test]
fn test_single_bin_gives_pure_sinusoid() {
    init_logger();
    let n = 4;
    let a = Complex32::from_polar(0.5, 0.3);

    let mut spectrum = ComplexGrid::new(n, zero());
    spectrum.set(1, 0, a);
    spectrum.set(3, 0, a.conj());

    let mut engine = ButterflyEngine::new(n).unwrap();
    let field = engine.inverse_transform(&spectrum).unwrap();
    assert!(field.imaginary_residual < 1e-6);

    for y in 0..n {
        for x in 0..n {
            let expected = 2.0 * a.norm() * (TAU * x as f32 / n as f32 + a.arg()).cos();
            let got = *field.height.get(x, y);
            assert!(
                (got - expected).abs() < 1e-5,
                "({}, {}): expected {}, got {}",
                x,
                y,
                expected,
                got
            );
        }
    }
}

#[test]
fn test_single_base_amplitude_composes_to_sinusoid() {
    // Frequency (1, 0) sits at centered index (1 + N/2, N/2).
    let n = 4;
    let h0 = Complex32::from_polar(0.25, -1.1);
    let mut amplitudes = ComplexGrid::new(n, zero());
    amplitudes.set(3, 2, h0);
    let initial = InitialSpectrum::from_grid(amplitudes, 10.0).unwrap();

    let phases = Grid::new(n, 0.0f32);
    let evolved = compose_spectrum(&initial, &phases, 0.0).unwrap();
    assert!(evolved.horizontal.is_none());
    assert_eq!(*evolved.height.get(1, 0), h0);
    assert_eq!(*evolved.height.get(3, 0), h0.conj());

    let mut engine = ButterflyEngine::new(n).unwrap();
    let field = engine.inverse_transform(&evolved.height).unwrap();
    for x in 0..n {
        let expected = 2.0 * h0.norm() * (TAU * x as f32 / n as f32 + h0.arg()).cos();
        for y in 0..n {
            assert!((*field.height.get(x, y) - expected).abs() < 1e-5);
        }
    }
}

#[test]
fn test_zero_wind_has_no_energy() {
    let config = OceanConfigBuilder::new()
        .resolution(32)
        .wind(0.0, 0.0)
        .build()
        .unwrap();
    let initial = InitialSpectrum::generate(&config).unwrap();
    assert_eq!(initial.energy(), 0.0);
    assert!(initial.grid().as_slice().iter().all(|c| *c == zero()));
}

#[test]
fn test_round_trip_reproduces_input() {
    for n in [1usize, 2, 8, 64] {
        let input = random_grid(n, n as u64);
        let mut engine = ButterflyEngine::new(n).unwrap();
        let spectrum = engine.forward(&input).unwrap();
        let mut output = engine.inverse(&spectrum).unwrap();
        output.scale(1.0 / (n * n) as f32);

        for (a, b) in input.as_slice().iter().zip(output.as_slice()) {
            assert!((a - b).norm() < 1e-4, "n = {}: {} vs {}", n, a, b);
        }
    }
}

#[test]
fn test_hermitian_spectrum_inverts_to_real_heights() {
    let config = OceanConfigBuilder::new()
        .resolution(64)
        .size(120.0)
        .wind(12.0, -4.0)
        .amplitude(5e-3)
        .seed(99)
        .build()
        .unwrap();
    let initial = InitialSpectrum::generate(&config).unwrap();
    let phases = PhaseState::random(64, 7).unwrap();
    let evolved = compose_spectrum(&initial, phases.current(), config.choppiness).unwrap();
    assert!(evolved.height.hermitian_error() < 1e-6);

    let mut engine = ButterflyEngine::new(64).unwrap();
    let field = engine.inverse_transform(&evolved.height).unwrap();
    let (lo, hi) = field.height_range();
    let scale = lo.abs().max(hi.abs());
    assert!(scale > 0.0);
    assert!(
        field.imaginary_residual <= scale * 1e-3 + 1e-6,
        "residual {} for height scale {}",
        field.imaginary_residual,
        scale
    );
}

#[test]
fn test_simulation_interface() {
    init_logger();
    let config = OceanConfigBuilder::new()
        .resolution(32)
        .size(64.0)
        .wind(10.0, 10.0)
        .amplitude(1e-2)
        .build()
        .unwrap();
    let mut sim = OceanSimulation::new(config).unwrap();

    let spectrum = sim.evolve_phase(0.25).unwrap().clone();
    assert_eq!(spectrum.resolution(), 32);

    let field = sim.inverse_transform(&spectrum).unwrap();
    let normals = sim.derive_normals(&field);
    for n in normals.as_slice() {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert!(n[1] > 0.0);
    }
}

#[test]
fn test_choppy_frame_carries_horizontal_displacement() {
    let config = OceanConfigBuilder::new()
        .resolution(32)
        .size(64.0)
        .wind(8.0, 0.0)
        .amplitude(1e-2)
        .choppiness(1.5)
        .build()
        .unwrap();
    let mut sim = OceanSimulation::new(config).unwrap();
    let frame = sim.step(0.1).unwrap();
    let horizontal = frame.displacement.horizontal.as_ref().unwrap();
    assert!(horizontal.as_slice().iter().any(|d| d[0].abs() > 0.0));

    let calm = OceanConfigBuilder::new()
        .resolution(32)
        .choppiness(0.0)
        .build()
        .unwrap();
    let mut sim = OceanSimulation::new(calm).unwrap();
    assert!(sim.step(0.1).unwrap().displacement.horizontal.is_none());
}

#[test]
fn test_rejects_non_power_of_two() {
    for n in [0usize, 3, 100, 513] {
        let config = OceanConfig {
            resolution: n,
            ..OceanConfig::default()
        };
        assert!(matches!(
            OceanSimulation::new(config),
            Err(OceanError::InvalidResolution(got)) if got == n
        ));
        assert!(ButterflyEngine::new(n).is_err());
    }
}
