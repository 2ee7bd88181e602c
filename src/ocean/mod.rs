//! FFT ocean height-field simulation.
//!
//! This module provides:
//! - Phillips-spectrum initial conditions with seeded Gaussian weights
//! - Per-tick phase evolution with ping-pong phase buffers
//! - A 2D inverse FFT built from `2·log2(N)` butterfly passes
//! - Surface normals from central differences
//! - [`OceanSimulation`], which owns every buffer and runs a full tick

pub mod butterfly;
pub mod config;
pub mod normals;
pub mod phase;
pub mod simulation;
pub mod spectrum;

pub use butterfly::{Axis, ButterflyEngine, PassSource, PassTarget, SubtransformPass, TransformDirection};
pub use config::{OceanConfig, OceanConfigBuilder};
pub use normals::derive_normals;
pub use phase::{compose_spectrum, EvolvedSpectrum, PhaseEvolver, PhaseState, PhaseStatus};
pub use simulation::{initialize_spectrum, OceanFrame, OceanSimulation};
pub use spectrum::{phillips, wave_vector, InitialSpectrum};

/// Errors raised while configuring or running the ocean pipeline.
#[derive(Debug, thiserror::Error)]
pub enum OceanError {
    #[error("Grid resolution must be a non-zero power of 2, got {0}")]
    InvalidResolution(usize),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Grid size mismatch: expected {expected} cells but got {got}")]
    GridMismatch { expected: usize, got: usize },
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reject resolutions the butterfly network cannot handle.
pub fn validate_resolution(resolution: usize) -> Result<usize, OceanError> {
    if resolution == 0 || !resolution.is_power_of_two() {
        return Err(OceanError::InvalidResolution(resolution));
    }
    Ok(resolution)
}
