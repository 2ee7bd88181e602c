//! Square toroidal grids shared by every stage of the ocean pipeline.
//!
//! All grids are `N×N`, row-major (`y * N + x`) and wrap at their edges.

use rustfft::num_complex::Complex32;

use crate::ocean::OceanError;

/// An `N×N` grid of values with periodic boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    resolution: usize,
    cells: Vec<T>,
}

/// Grid of complex pairs: a spectrum, an evolved spectrum or a transform buffer.
pub type ComplexGrid = Grid<Complex32>;

/// Frequency-domain grid. Same storage as [`ComplexGrid`].
pub type FrequencyGrid = ComplexGrid;

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`.
    pub fn new(resolution: usize, fill: T) -> Self {
        Self {
            resolution,
            cells: vec![fill; resolution * resolution],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer.
    pub fn from_vec(resolution: usize, cells: Vec<T>) -> Result<Self, OceanError> {
        let expected = resolution * resolution;
        if cells.len() != expected {
            return Err(OceanError::GridMismatch {
                expected,
                got: cells.len(),
            });
        }
        Ok(Self { resolution, cells })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(resolution: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(resolution * resolution);
        for y in 0..resolution {
            for x in 0..resolution {
                cells.push(f(x, y));
            }
        }
        Self { resolution, cells }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.resolution + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let i = self.index(x, y);
        &mut self.cells[i]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let i = self.index(x, y);
        self.cells[i] = value;
    }

    /// Read a cell with toroidal wrapping on both axes.
    #[inline]
    pub fn get_wrapped(&self, x: isize, y: isize) -> &T {
        let n = self.resolution as isize;
        self.get(x.rem_euclid(n) as usize, y.rem_euclid(n) as usize)
    }

    /// Index of the Hermitian partner `-k` of bin `(x, y)`.
    #[inline]
    pub fn mirror(&self, x: usize, y: usize) -> (usize, usize) {
        let n = self.resolution;
        ((n - x) % n, (n - y) % n)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Rows as contiguous slices, top to bottom.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.cells.chunks_exact(self.resolution.max(1))
    }

    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }

    /// Map every cell into a new grid of the same resolution.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            resolution: self.resolution,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    pub(crate) fn ensure_resolution(&self, expected: usize) -> Result<(), OceanError> {
        if self.resolution != expected {
            return Err(OceanError::GridMismatch {
                expected: expected * expected,
                got: self.cells.len(),
            });
        }
        Ok(())
    }
}

impl ComplexGrid {
    /// Largest deviation from Hermitian symmetry, `max |X[-k] - conj(X[k])|`.
    pub fn hermitian_error(&self) -> f32 {
        let n = self.resolution;
        let mut worst = 0.0f32;
        for y in 0..n {
            for x in 0..n {
                let (mx, my) = self.mirror(x, y);
                let diff = *self.get(mx, my) - self.get(x, y).conj();
                worst = worst.max(diff.norm());
            }
        }
        worst
    }

    /// Multiply every cell by a real factor.
    pub fn scale(&mut self, factor: f32) {
        for c in &mut self.cells {
            *c *= factor;
        }
    }
}

/// Spatial-domain output of the inverse transform.
#[derive(Debug, Clone)]
pub struct DisplacementField {
    /// Vertical displacement per texel.
    pub height: Grid<f32>,
    /// Horizontal (choppy) displacement `[dx, dz]`, when modeled.
    pub horizontal: Option<Grid<[f32; 2]>>,
    /// Largest imaginary magnitude discarded when collapsing to real heights.
    pub imaginary_residual: f32,
}

impl DisplacementField {
    /// Collapse a complex spatial grid to its real part.
    pub fn from_complex(grid: &ComplexGrid) -> Self {
        let imaginary_residual = grid
            .as_slice()
            .iter()
            .fold(0.0f32, |acc, c| acc.max(c.im.abs()));
        Self {
            height: grid.map(|c| c.re),
            horizontal: None,
            imaginary_residual,
        }
    }

    pub fn resolution(&self) -> usize {
        self.height.resolution()
    }

    /// Range of heights as `(min, max)`.
    pub fn height_range(&self) -> (f32, f32) {
        self.height
            .as_slice()
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }
}

/// Per-texel unit surface normals.
pub type NormalField = Grid<[f32; 3]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_access() {
        let grid = Grid::from_fn(4, |x, y| (x + 10 * y) as i32);
        assert_eq!(*grid.get_wrapped(-1, 0), 3);
        assert_eq!(*grid.get_wrapped(4, 5), 10);
        assert_eq!(*grid.get_wrapped(-5, -1), 33);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let result = Grid::from_vec(4, vec![0.0f32; 15]);
        assert!(matches!(
            result,
            Err(OceanError::GridMismatch {
                expected: 16,
                got: 15
            })
        ));
    }

    #[test]
    fn test_mirror_is_involution() {
        let grid = Grid::new(8, 0u8);
        for y in 0..8 {
            for x in 0..8 {
                let (mx, my) = grid.mirror(x, y);
                assert_eq!(grid.mirror(mx, my), (x, y));
            }
        }
        assert_eq!(grid.mirror(0, 0), (0, 0));
        assert_eq!(grid.mirror(4, 4), (4, 4));
    }

    #[test]
    fn test_hermitian_error() {
        let mut grid = ComplexGrid::new(4, Complex32::new(0.0, 0.0));
        grid.set(1, 0, Complex32::new(1.0, 2.0));
        grid.set(3, 0, Complex32::new(1.0, -2.0));
        assert!(grid.hermitian_error() < 1e-6);

        grid.set(3, 0, Complex32::new(1.0, 2.0));
        assert!(grid.hermitian_error() > 1.0);
    }

    #[test]
    fn test_displacement_from_complex() {
        let mut grid = ComplexGrid::new(2, Complex32::new(1.0, 0.0));
        grid.set(1, 1, Complex32::new(-2.0, 0.25));
        let field = DisplacementField::from_complex(&grid);
        assert_eq!(*field.height.get(1, 1), -2.0);
        assert!((field.imaginary_residual - 0.25).abs() < 1e-6);
        assert_eq!(field.height_range(), (-2.0, 1.0));
    }
}
