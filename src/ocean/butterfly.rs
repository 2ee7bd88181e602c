//! 2D FFT as a sequence of radix-2 butterfly passes.
//!
//! A transform of an `N×N` grid runs `log2(N)` passes along rows followed by
//! `log2(N)` passes along columns. Pass `i` merges subtransforms of size
//! `2^((i mod log2 N) + 1)`. The passes use the self-sorting (Stockham)
//! formulation, so no bit-reversal step is needed: for output index `i`
//! within a row or column and subtransform size `s`,
//!
//! ```text
//! e      = (i / s) * (s / 2) + i % (s / 2)
//! out[i] = in[e] + w^i * in[e + N/2],   w = exp(±2πi / s)
//! ```
//!
//! For `i` in the upper half of a block `w^i = -w^(i - s/2)`, which is the
//! `a + w·b` / `a - w·b` butterfly pair.
//!
//! Pass 0 reads the caller's spectrum, the last pass writes the output and
//! every pass in between ping-pongs between two scratch grids.

use std::f32::consts::TAU;

use rayon::prelude::*;
use rustfft::num_complex::Complex32;

use super::{validate_resolution, OceanError};
use crate::grid::{ComplexGrid, DisplacementField};

/// Sign convention of the transform kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformDirection {
    /// Kernel `exp(-2πi·kn/N)`.
    Forward,
    /// Kernel `exp(+2πi·kn/N)`, unnormalized.
    Inverse,
}

impl TransformDirection {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            TransformDirection::Forward => -1.0,
            TransformDirection::Inverse => 1.0,
        }
    }
}

/// Axis a pass runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Rows,
    Columns,
}

/// Where a pass reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassSource {
    Spectrum,
    Scratch(usize),
}

/// Where a pass writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassTarget {
    Scratch(usize),
    Output,
}

/// Parameters of a single butterfly pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtransformPass {
    pub index: u32,
    pub axis: Axis,
    pub subtransform_size: u32,
    pub direction: TransformDirection,
    pub source: PassSource,
    pub target: PassTarget,
}

/// The full pass sequence for an `N×N` transform.
///
/// `2·log2(N)` passes; empty when `N = 1`.
pub fn pass_plan(resolution: usize, direction: TransformDirection) -> Vec<SubtransformPass> {
    let stages = resolution.trailing_zeros();
    let total = stages * 2;

    (0..total)
        .map(|i| {
            let source = if i == 0 {
                PassSource::Spectrum
            } else {
                PassSource::Scratch(((i - 1) % 2) as usize)
            };
            let target = if i == total - 1 {
                PassTarget::Output
            } else {
                PassTarget::Scratch((i % 2) as usize)
            };
            SubtransformPass {
                index: i,
                axis: if i < stages { Axis::Rows } else { Axis::Columns },
                subtransform_size: 1 << ((i % stages) + 1),
                direction,
                source,
                target,
            }
        })
        .collect()
}

/// CPU butterfly engine owning its scratch buffers.
pub struct ButterflyEngine {
    resolution: usize,
    scratch: [ComplexGrid; 2],
}

impl ButterflyEngine {
    /// Create an engine for `resolution×resolution` grids.
    ///
    /// Fails unless `resolution` is a non-zero power of two.
    pub fn new(resolution: usize) -> Result<Self, OceanError> {
        validate_resolution(resolution)?;
        let zero = Complex32::new(0.0, 0.0);
        Ok(Self {
            resolution,
            scratch: [
                ComplexGrid::new(resolution, zero),
                ComplexGrid::new(resolution, zero),
            ],
        })
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Number of passes per transform, `2·log2(N)`.
    pub fn num_passes(&self) -> usize {
        2 * self.resolution.trailing_zeros() as usize
    }

    pub fn pass_plan(&self, direction: TransformDirection) -> Vec<SubtransformPass> {
        pass_plan(self.resolution, direction)
    }

    /// Run every pass of `direction` over `spectrum` (unnormalized).
    pub fn transform(
        &mut self,
        spectrum: &ComplexGrid,
        direction: TransformDirection,
    ) -> Result<ComplexGrid, OceanError> {
        spectrum.ensure_resolution(self.resolution)?;
        let mut output = ComplexGrid::new(self.resolution, Complex32::new(0.0, 0.0));
        let plan = self.pass_plan(direction);
        if plan.is_empty() {
            output.clone_from(spectrum);
            return Ok(output);
        }

        for pass in &plan {
            let [scratch_a, scratch_b] = &mut self.scratch;
            let (input, out): (&ComplexGrid, &mut ComplexGrid) = match (pass.source, pass.target) {
                (PassSource::Spectrum, PassTarget::Scratch(0)) => (spectrum, scratch_a),
                (PassSource::Spectrum, PassTarget::Scratch(_)) => (spectrum, scratch_b),
                (PassSource::Spectrum, PassTarget::Output) => (spectrum, &mut output),
                (PassSource::Scratch(0), PassTarget::Scratch(_)) => (&*scratch_a, scratch_b),
                (PassSource::Scratch(_), PassTarget::Scratch(_)) => (&*scratch_b, scratch_a),
                (PassSource::Scratch(0), PassTarget::Output) => (&*scratch_a, &mut output),
                (PassSource::Scratch(_), PassTarget::Output) => (&*scratch_b, &mut output),
            };
            log::trace!(
                "butterfly pass {} {:?} size {}",
                pass.index,
                pass.axis,
                pass.subtransform_size
            );
            butterfly_pass(input, out, pass);
        }
        Ok(output)
    }

    /// Unnormalized inverse transform.
    pub fn inverse(&mut self, spectrum: &ComplexGrid) -> Result<ComplexGrid, OceanError> {
        self.transform(spectrum, TransformDirection::Inverse)
    }

    /// Forward transform.
    pub fn forward(&mut self, grid: &ComplexGrid) -> Result<ComplexGrid, OceanError> {
        self.transform(grid, TransformDirection::Forward)
    }

    /// Inverse transform collapsed to real heights.
    ///
    /// The discarded imaginary part is reported as
    /// [`DisplacementField::imaginary_residual`]; it is near zero for a
    /// Hermitian spectrum.
    pub fn inverse_transform(
        &mut self,
        spectrum: &ComplexGrid,
    ) -> Result<DisplacementField, OceanError> {
        let spatial = self.inverse(spectrum)?;
        Ok(DisplacementField::from_complex(&spatial))
    }
}

/// Execute one butterfly pass from `input` into `output`.
///
/// Output rows are independent, so they are filled in parallel.
pub fn butterfly_pass(input: &ComplexGrid, output: &mut ComplexGrid, pass: &SubtransformPass) {
    let n = input.resolution();
    let half_n = n / 2;
    let size = pass.subtransform_size as usize;
    let half_size = size / 2;
    let sign = pass.direction.sign();
    let source = input.as_slice();

    let twiddle = |i: usize| Complex32::from_polar(1.0, sign * TAU * (i % size) as f32 / size as f32);
    let even_index = |i: usize| (i / size) * half_size + i % half_size;

    output
        .as_mut_slice()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(y, row)| match pass.axis {
            Axis::Rows => {
                let line = &source[y * n..(y + 1) * n];
                for (x, out) in row.iter_mut().enumerate() {
                    let e = even_index(x);
                    *out = line[e] + twiddle(x) * line[e + half_n];
                }
            }
            Axis::Columns => {
                let e = even_index(y);
                let w = twiddle(y);
                let even = &source[e * n..(e + 1) * n];
                let odd = &source[(e + half_n) * n..(e + half_n + 1) * n];
                for ((out, &a), &b) in row.iter_mut().zip(even).zip(odd) {
                    *out = a + w * b;
                }
            }
        });
}
