//! Phase evolution and spectrum composition.
//!
//! Phases live in two buffers. Each tick reads the current buffer, writes the
//! next one and swaps roles, so a buffer is never read and written at once.

use std::f32::consts::TAU;

use rand::Rng;
use rand_pcg::Pcg32;
use rayon::prelude::*;
use rustfft::num_complex::Complex32;

use super::spectrum::{wave_vector, InitialSpectrum};
use super::{validate_resolution, OceanError};
use crate::grid::{ComplexGrid, Grid};

/// PCG stream for initial phases, distinct from the spectrum's Gaussian draws.
const PHASE_STREAM: u64 = 0x7068_6173_6573;

/// Double-buffered per-bin phase angles (centered bin order).
#[derive(Debug, Clone)]
pub struct PhaseState {
    buffers: [Grid<f32>; 2],
    current: usize,
}

impl PhaseState {
    /// Start every bin at phase zero.
    pub fn zeroed(resolution: usize) -> Result<Self, OceanError> {
        validate_resolution(resolution)?;
        Ok(Self {
            buffers: [Grid::new(resolution, 0.0), Grid::new(resolution, 0.0)],
            current: 0,
        })
    }

    /// Start from uniformly random phases in `[0, 2π)`.
    ///
    /// Draws from its own PCG stream, so sharing a seed with
    /// [`InitialSpectrum::generate`] does not correlate the two.
    pub fn random(resolution: usize, seed: u64) -> Result<Self, OceanError> {
        validate_resolution(resolution)?;
        let mut rng = Pcg32::new(seed, PHASE_STREAM);
        let initial = Grid::from_fn(resolution, |_, _| rng.gen::<f32>() * TAU);
        Ok(Self::from_phases(initial))
    }

    /// Start from explicit phases.
    pub fn from_phases(initial: Grid<f32>) -> Self {
        let resolution = initial.resolution();
        Self {
            buffers: [initial, Grid::new(resolution, 0.0)],
            current: 0,
        }
    }

    pub fn resolution(&self) -> usize {
        self.buffers[0].resolution()
    }

    /// The readable buffer.
    pub fn current(&self) -> &Grid<f32> {
        &self.buffers[self.current]
    }

    /// Index (0 or 1) of the readable buffer.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Borrow the readable buffer and the writable one together.
    fn split(&mut self) -> (&Grid<f32>, &mut Grid<f32>) {
        let [a, b] = &mut self.buffers;
        if self.current == 0 {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn swap(&mut self) {
        self.current ^= 1;
    }
}

/// Lifecycle of a [`PhaseEvolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    /// No tick has run yet.
    Idle,
    /// At least one tick has advanced the phases.
    Evolving,
}

/// Advances phases with the deep-water dispersion relation `ω = sqrt(g|k|)`.
#[derive(Debug, Clone)]
pub struct PhaseEvolver {
    state: PhaseState,
    omega: Grid<f32>,
    elapsed: f64,
    ticks: u64,
}

impl PhaseEvolver {
    pub fn new(state: PhaseState, size: f32, gravity: f32) -> Self {
        let n = state.resolution();
        let omega = Grid::from_fn(n, |x, y| {
            let k = wave_vector(x, y, n, size);
            dispersion(k, gravity)
        });
        Self {
            state,
            omega,
            elapsed: 0.0,
            ticks: 0,
        }
    }

    /// Advance every bin by `delta_time` seconds and swap buffers.
    pub fn tick(&mut self, delta_time: f32) -> &Grid<f32> {
        let n = self.state.resolution();
        let omega = &self.omega;
        let (current, next) = self.state.split();

        next.as_mut_slice()
            .par_chunks_mut(n)
            .zip(current.as_slice().par_chunks(n))
            .zip(omega.as_slice().par_chunks(n))
            .for_each(|((out, phase), omega)| {
                for ((o, &p), &w) in out.iter_mut().zip(phase).zip(omega) {
                    *o = (p + w * delta_time).rem_euclid(TAU);
                }
            });

        self.state.swap();
        self.elapsed += delta_time as f64;
        self.ticks += 1;
        log::trace!("phase tick {} (t = {:.4}s)", self.ticks, self.elapsed);
        self.state.current()
    }

    pub fn status(&self) -> PhaseStatus {
        if self.ticks == 0 {
            PhaseStatus::Idle
        } else {
            PhaseStatus::Evolving
        }
    }

    pub fn state(&self) -> &PhaseState {
        &self.state
    }

    pub fn phases(&self) -> &Grid<f32> {
        self.state.current()
    }

    /// Angular frequency of each bin.
    pub fn omega(&self) -> &Grid<f32> {
        &self.omega
    }

    /// Simulated seconds since construction.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Deep-water gravity wave dispersion.
#[inline]
pub fn dispersion(k: [f32; 2], gravity: f32) -> f32 {
    (gravity * (k[0] * k[0] + k[1] * k[1]).sqrt()).sqrt()
}

/// Spectra ready for the inverse transform, in transform bin order.
#[derive(Debug, Clone)]
pub struct EvolvedSpectrum {
    /// Height spectrum `h(k)`.
    pub height: ComplexGrid,
    /// Packed horizontal spectrum whose transform gives `dx + i·dz`.
    pub horizontal: Option<ComplexGrid>,
}

/// Combine base amplitudes and phases into a Hermitian height spectrum.
///
/// `h(k) = h₀(k)e^{iφ(k)} + conj(h₀(-k)e^{iφ(-k)})`. Frequency `m` lands at
/// index `m mod N`, so the inverse transform yields heights directly. With a
/// non-zero `choppiness` the packed horizontal spectrum is produced as well.
pub fn compose_spectrum(
    initial: &InitialSpectrum,
    phases: &Grid<f32>,
    choppiness: f32,
) -> Result<EvolvedSpectrum, OceanError> {
    let n = initial.resolution();
    phases.ensure_resolution(n)?;
    let half = n / 2;
    let size = initial.size();
    let amplitudes = initial.grid();

    let zero = Complex32::new(0.0, 0.0);
    let mut height = ComplexGrid::new(n, zero);
    let mut horizontal = (choppiness != 0.0).then(|| ComplexGrid::new(n, zero));

    for y in 0..n {
        for x in 0..n {
            let (mx, my) = amplitudes.mirror(x, y);
            let wave = *amplitudes.get(x, y) * Complex32::from_polar(1.0, *phases.get(x, y));
            let partner = *amplitudes.get(mx, my) * Complex32::from_polar(1.0, *phases.get(mx, my));
            let h = wave + partner.conj();

            let tx = (x + half) % n;
            let ty = (y + half) % n;
            height.set(tx, ty, h);

            if let Some(horizontal) = horizontal.as_mut() {
                let k = wave_vector(x, y, n, size);
                let k_len = (k[0] * k[0] + k[1] * k[1]).sqrt();
                // Nyquist bins (centered index 0) have no well-defined direction.
                let packed = if k_len > 0.0 && x != 0 && y != 0 {
                    // -i·k̂x·h + i·(-i·k̂z·h) = (k̂z - i·k̂x)·h
                    Complex32::new(k[1] / k_len, -k[0] / k_len) * h * choppiness
                } else {
                    zero
                };
                horizontal.set(tx, ty, packed);
            }
        }
    }

    Ok(EvolvedSpectrum { height, horizontal })
}
