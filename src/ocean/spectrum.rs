//! Initial wave spectrum (Phillips model).
//!
//! Bins are stored in centered order: bin `n` holds frequency `n - N/2`,
//! wavenumber `k = 2π(n - N/2)/size`. The spectrum is generated once; only
//! phases change over time.

use std::f32::consts::PI;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rustfft::num_complex::Complex32;

use super::{OceanConfig, OceanError};
use crate::grid::ComplexGrid;

/// Wavenumber vector of centered bin `(x, y)`.
#[inline]
pub fn wave_vector(x: usize, y: usize, resolution: usize, size: f32) -> [f32; 2] {
    let half = (resolution / 2) as f32;
    [
        2.0 * PI * (x as f32 - half) / size,
        2.0 * PI * (y as f32 - half) / size,
    ]
}

/// Phillips spectrum energy for wave vector `k`.
///
/// Zero only at the exact `k = 0` bin and for a calm wind. Waves are weighted by the squared
/// alignment with the wind and damped below `damping × L`.
pub fn phillips(k: [f32; 2], config: &OceanConfig) -> f32 {
    let k_len_sq = k[0] * k[0] + k[1] * k[1];
    let wind_speed = config.wind_speed();
    if k_len_sq == 0.0 || wind_speed <= 0.0 {
        return 0.0;
    }

    // Largest wave arising from a continuous wind of this speed
    let l = wind_speed * wind_speed / config.gravity;
    let k_len = k_len_sq.sqrt();
    let alignment = (k[0] * config.wind[0] + k[1] * config.wind[1]) / (k_len * wind_speed);
    let small = l * config.damping;

    config.amplitude * (-1.0 / (k_len_sq * l * l)).exp() / (k_len_sq * k_len_sq)
        * alignment
        * alignment
        * (-k_len_sq * small * small).exp()
}

/// Time-invariant complex amplitudes `h₀(k)`.
#[derive(Debug, Clone)]
pub struct InitialSpectrum {
    amplitudes: ComplexGrid,
    size: f32,
}

impl InitialSpectrum {
    /// Synthesize a spectrum realization from `config`.
    pub fn generate(config: &OceanConfig) -> Result<Self, OceanError> {
        config.validate()?;
        let n = config.resolution;
        let mut rng = Pcg32::seed_from_u64(config.seed);

        let amplitudes = ComplexGrid::from_fn(n, |x, y| {
            // Draw for every bin so the realization does not depend on which bins are zero.
            let (xi_r, xi_i) = gaussian_pair(&mut rng);
            let energy = phillips(wave_vector(x, y, n, config.size), config);
            Complex32::new(xi_r, xi_i) * (energy * 0.5).sqrt()
        });

        log::debug!(
            "initial spectrum: {}x{} bins, wind {:?}, size {}m",
            n,
            n,
            config.wind,
            config.size
        );

        Ok(Self {
            amplitudes,
            size: config.size,
        })
    }

    /// Wrap precomputed amplitudes (centered bin order).
    pub fn from_grid(amplitudes: ComplexGrid, size: f32) -> Result<Self, OceanError> {
        super::validate_resolution(amplitudes.resolution())?;
        Ok(Self { amplitudes, size })
    }

    pub fn resolution(&self) -> usize {
        self.amplitudes.resolution()
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn amplitude(&self, x: usize, y: usize) -> Complex32 {
        *self.amplitudes.get(x, y)
    }

    pub fn grid(&self) -> &ComplexGrid {
        &self.amplitudes
    }

    pub fn into_grid(self) -> ComplexGrid {
        self.amplitudes
    }

    /// Total spectral energy `Σ|h₀|²`.
    pub fn energy(&self) -> f32 {
        self.amplitudes.as_slice().iter().map(|c| c.norm_sqr()).sum()
    }
}

/// Two independent standard normal samples (Box-Muller).
fn gaussian_pair(rng: &mut Pcg32) -> (f32, f32) {
    // 1 - u keeps the logarithm argument in (0, 1]
    let u1 = 1.0 - rng.gen::<f32>();
    let u2 = rng.gen::<f32>();
    let radius = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;
    (radius * theta.cos(), radius * theta.sin())
}
