//! GPU compute shader modules for the ocean pipeline.
//!
//! Phase evolution, spectrum composition, the butterfly passes and normal
//! derivation each run as a wgpu compute kernel.

mod buffers;
mod params;
mod pipelines;

pub mod ocean;

pub use ocean::{GpuOceanError, GpuOceanPipeline};
pub use params::{NormalParams, PhaseParams, SpectrumParams, SubtransformParams};
