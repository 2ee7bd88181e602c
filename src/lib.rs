//! Ocean FFT Core
//!
//! Spectral ocean height-field simulation and tileable gradient noise.
//!
//! # Features
//!
//! - Phillips-spectrum initial conditions with seeded Gaussian weights
//! - Per-tick phase evolution with deep-water dispersion
//! - 2D inverse FFT as `2·log2(N)` self-sorting butterfly passes
//! - Choppy horizontal displacement and surface normals
//! - The same pipeline on the GPU via wgpu compute shaders
//! - Tileable Perlin-style noise and octave texture generation
//! - PNG / float texture export via `image`

pub mod backend;
pub mod export;
pub mod gpu;
pub mod grid;
pub mod noise;
pub mod ocean;

// Re-export commonly used types
pub use backend::{BackendError, DynamicOcean, OceanStep};
pub use export::{displacement_rgba32f, height_image, normal_image, ExportError};
pub use gpu::{GpuContext, GpuOceanError, GpuOceanPipeline};
pub use grid::{ComplexGrid, DisplacementField, FrequencyGrid, Grid, NormalField};
pub use noise::{fractal_height, octave_textures, NoiseError, NoiseGenerator, NoiseTextureConfig};
pub use ocean::{
    initialize_spectrum, ButterflyEngine, InitialSpectrum, OceanConfig, OceanConfigBuilder,
    OceanError, OceanFrame, OceanSimulation, PhaseState,
};
