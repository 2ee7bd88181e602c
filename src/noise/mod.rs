//! Tileable 2D gradient noise.
//!
//! Perlin-style surflet summation over a shuffled permutation table and 256
//! gradient directions spaced evenly on the unit circle. The result tiles
//! with any integer period, which makes it suitable for wrapping textures.

mod texture;

pub use texture::{fractal_height, octave_textures, NoiseError, NoiseTextureConfig, MAX_OCTAVES};

use std::f32::consts::PI;
use std::num::NonZeroU32;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Number of entries in the permutation and gradient tables.
pub const MAX_PERM: usize = 256;

/// Tileable gradient noise generator.
///
/// Each instance owns its own permutation; two generators built from the same
/// seed (or permutation) produce identical output.
#[derive(Clone)]
pub struct NoiseGenerator {
    perm: [u8; MAX_PERM * 2],
    dirs: [[f32; 2]; MAX_PERM],
}

impl NoiseGenerator {
    /// Create a generator whose permutation is shuffled by a PCG32 seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut source = [0u8; MAX_PERM];
        for (i, slot) in source.iter_mut().enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle
        for i in (1..MAX_PERM).rev() {
            let j = rng.gen_range(0..=i);
            source.swap(i, j);
        }

        Self::from_permutation(source)
    }

    /// Create a generator from an explicit permutation of `0..256`.
    ///
    /// The table is used as given; no check is made that it is a true permutation.
    pub fn from_permutation(permutation: [u8; MAX_PERM]) -> Self {
        let mut perm = [0u8; MAX_PERM * 2];
        perm[..MAX_PERM].copy_from_slice(&permutation);
        perm[MAX_PERM..].copy_from_slice(&permutation);

        let mut dirs = [[0.0f32; 2]; MAX_PERM];
        for (i, dir) in dirs.iter_mut().enumerate() {
            let angle = i as f32 * 2.0 * PI / MAX_PERM as f32;
            *dir = [angle.cos(), angle.sin()];
        }

        Self { perm, dirs }
    }

    /// The duplicated 512-entry permutation table.
    pub fn permutation(&self) -> &[u8; MAX_PERM * 2] {
        &self.perm
    }

    /// Gradient direction `i`, at angle `2πi/256`.
    pub fn direction(&self, i: usize) -> [f32; 2] {
        self.dirs[i % MAX_PERM]
    }

    /// Evaluate noise at `(x, y)`, tiling every `period` units on both axes.
    ///
    /// Output is roughly in `[-1, 1]`; callers usually remap with `* 0.5 + 0.5`.
    pub fn noise(&self, x: f32, y: f32, period: NonZeroU32) -> f32 {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let period = period.get() as i64;

        self.surflet(x, y, x0, y0, period)
            + self.surflet(x, y, x0 + 1, y0, period)
            + self.surflet(x, y, x0, y0 + 1, period)
            + self.surflet(x, y, x0 + 1, y0 + 1, period)
    }

    fn surflet(&self, x: f32, y: f32, grid_x: i64, grid_y: i64, period: i64) -> f32 {
        let offset_x = x - grid_x as f32;
        let offset_y = y - grid_y as f32;
        let poly_x = falloff(offset_x.abs());
        let poly_y = falloff(offset_y.abs());

        let dir = self.dirs[self.hash(grid_x, grid_y, period)];
        let grad = offset_x * dir[0] + offset_y * dir[1];
        poly_x * poly_y * grad
    }

    #[inline]
    fn hash(&self, grid_x: i64, grid_y: i64, period: i64) -> usize {
        // Reduce into 0..256 so periods above the table size stay in bounds.
        let hx = (grid_x.rem_euclid(period) as usize) % MAX_PERM;
        let hy = (grid_y.rem_euclid(period) as usize) % MAX_PERM;
        self.perm[self.perm[hx] as usize + hy] as usize
    }
}

/// Quintic falloff `1 - 6d^5 + 15d^4 - 10d^3`; 1 at `d = 0`, 0 at `d = 1`.
#[inline]
pub fn falloff(d: f32) -> f32 {
    let d3 = d * d * d;
    1.0 - d3 * (d * (6.0 * d - 15.0) + 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(p: u32) -> NonZeroU32 {
        NonZeroU32::new(p).unwrap()
    }

    fn identity_permutation() -> [u8; MAX_PERM] {
        let mut perm = [0u8; MAX_PERM];
        for (i, p) in perm.iter_mut().enumerate() {
            *p = i as u8;
        }
        perm
    }

    #[test]
    fn test_falloff_endpoints() {
        assert_eq!(falloff(0.0), 1.0);
        assert!(falloff(1.0).abs() < 1e-6);
        assert!((falloff(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_permutation_is_shuffled_bijection() {
        let generator = NoiseGenerator::new(7);
        let perm = generator.permutation();
        let mut seen = [false; MAX_PERM];
        for &p in &perm[..MAX_PERM] {
            seen[p as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(perm[..MAX_PERM], perm[MAX_PERM..]);
        assert_ne!(perm[..MAX_PERM], identity_permutation()[..]);
    }

    #[test]
    fn test_directions_are_unit() {
        let generator = NoiseGenerator::new(1);
        for i in 0..MAX_PERM {
            let [dx, dy] = generator.direction(i);
            assert!(((dx * dx + dy * dy).sqrt() - 1.0).abs() < 1e-5);
        }
        let quarter = generator.direction(64);
        assert!(quarter[0].abs() < 1e-5 && (quarter[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_same_seed_same_noise() {
        let a = NoiseGenerator::new(42);
        let b = NoiseGenerator::new(42);
        for i in 0..64 {
            let x = i as f32 * 0.37;
            let y = i as f32 * 0.11;
            assert_eq!(a.noise(x, y, period(8)), b.noise(x, y, period(8)));
        }
    }

    #[test]
    fn test_zero_at_lattice_points() {
        let generator = NoiseGenerator::new(3);
        for y in -3..6 {
            for x in -3..6 {
                let value = generator.noise(x as f32, y as f32, period(4));
                assert!(value.abs() < 1e-6, "noise({x}, {y}) = {value}");
            }
        }
    }

    #[test]
    fn test_negative_coordinates_tile() {
        let generator = NoiseGenerator::new(9);
        let a = generator.noise(-0.75, -2.25, period(4));
        let b = generator.noise(3.25, 1.75, period(4));
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn test_large_period_stays_in_bounds() {
        let generator = NoiseGenerator::new(11);
        let a = generator.noise(300.5, 511.25, period(512));
        let b = generator.noise(300.5 + 512.0, 511.25, period(512));
        assert!((a - b).abs() < 1e-3);
    }
}
