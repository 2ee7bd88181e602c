//! Octave noise textures for terrain and water detail maps.

use std::num::NonZeroU32;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use super::NoiseGenerator;
use crate::grid::Grid;

/// Parameters for a stack of tileable octave textures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseTextureConfig {
    /// Texture edge length in texels.
    pub size: u32,
    /// Number of octave layers.
    pub octaves: u32,
    /// Texels per noise cell at octave 0.
    pub cell_size: f32,
    /// Base seed; octave `o` uses `seed + o`.
    pub seed: u64,
}

impl Default for NoiseTextureConfig {
    fn default() -> Self {
        Self {
            size: 256,
            octaves: 4,
            cell_size: 32.0,
            seed: 0,
        }
    }
}

/// Deepest octave a texture stack may request.
pub const MAX_OCTAVES: u32 = 16;

/// Errors raised for unusable texture parameters.
#[derive(Debug, thiserror::Error)]
pub enum NoiseError {
    #[error("Invalid noise parameter: {0}")]
    InvalidParameter(String),
    #[error("Tiling period of octave {octave} overflows u32")]
    PeriodOverflow { octave: u32 },
}

impl NoiseTextureConfig {
    /// Check that every octave has a finite frequency and a representable period.
    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.size == 0 {
            return Err(NoiseError::InvalidParameter(
                "size must be positive".to_string(),
            ));
        }
        if self.octaves > MAX_OCTAVES {
            return Err(NoiseError::InvalidParameter(format!(
                "octaves must be at most {}, got {}",
                MAX_OCTAVES, self.octaves
            )));
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(NoiseError::InvalidParameter(format!(
                "cell_size must be finite and positive, got {}",
                self.cell_size
            )));
        }
        if let Some(deepest) = self.octaves.checked_sub(1) {
            self.period(deepest)?;
        }
        Ok(())
    }

    /// Tiling period of octave `o`, chosen so the texture wraps seamlessly.
    fn period(&self, octave: u32) -> Result<NonZeroU32, NoiseError> {
        let cells = (self.size as f32 / self.cell_size).round().max(1.0);
        if cells > u32::MAX as f32 {
            return Err(NoiseError::PeriodOverflow { octave });
        }
        1u32.checked_shl(octave)
            .and_then(|scale| (cells as u32).checked_mul(scale))
            .and_then(NonZeroU32::new)
            .ok_or(NoiseError::PeriodOverflow { octave })
    }

    fn frequency(&self, octave: u32) -> f32 {
        2f32.powi(octave as i32) / self.cell_size
    }
}

impl NoiseGenerator {
    /// Sample one octave layer as normalized heights in `[0, 1]`.
    pub fn octave_layer(
        &self,
        config: &NoiseTextureConfig,
        octave: u32,
    ) -> Result<Grid<f32>, NoiseError> {
        let frequency = config.frequency(octave);
        let period = config.period(octave)?;
        Ok(Grid::from_fn(config.size as usize, |x, y| {
            let value = self.noise(x as f32 * frequency, y as f32 * frequency, period);
            (value * 0.5 + 0.5).clamp(0.0, 1.0)
        }))
    }
}

/// Generate one 8-bit grayscale texture per octave.
///
/// Each octave gets its own generator so layers are uncorrelated.
pub fn octave_textures(config: &NoiseTextureConfig) -> Result<Vec<GrayImage>, NoiseError> {
    config.validate()?;
    (0..config.octaves)
        .map(|octave| {
            let generator = NoiseGenerator::new(config.seed.wrapping_add(octave as u64));
            let layer = generator.octave_layer(config, octave)?;
            log::debug!(
                "generated noise octave {} ({}x{}, period {})",
                octave,
                config.size,
                config.size,
                config.period(octave)?
            );
            Ok(GrayImage::from_fn(config.size, config.size, |x, y| {
                let h = *layer.get(x as usize, y as usize);
                image::Luma([(h * 255.0).round() as u8])
            }))
        })
        .collect()
}

/// Sum octave layers into a single height map in `[0, 1]`.
///
/// Octave `o` is weighted by `persistence^o`.
pub fn fractal_height(
    config: &NoiseTextureConfig,
    persistence: f32,
) -> Result<Grid<f32>, NoiseError> {
    config.validate()?;
    let size = config.size as usize;
    let mut height = Grid::new(size, 0.0f32);
    let mut total_weight = 0.0f32;
    let mut weight = 1.0f32;

    for octave in 0..config.octaves {
        let generator = NoiseGenerator::new(config.seed.wrapping_add(octave as u64));
        let layer = generator.octave_layer(config, octave)?;
        for (h, l) in height.as_mut_slice().iter_mut().zip(layer.as_slice()) {
            *h += weight * l;
        }
        total_weight += weight;
        weight *= persistence;
    }

    if total_weight > 0.0 {
        for h in height.as_mut_slice() {
            *h /= total_weight;
        }
    }
    Ok(height)
}
