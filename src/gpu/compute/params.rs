//! Uniform parameter structs for the ocean compute shaders.
//!
//! These structs must match the WGSL shader definitions exactly,
//! including alignment requirements. Each one is 16 bytes.

use crate::ocean::{Axis, OceanConfig, SubtransformPass};

/// Phase evolution parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PhaseParams {
    pub n: u32,
    pub size: f32,
    pub delta_time: f32,
    pub gravity: f32,
}

impl PhaseParams {
    pub fn new(config: &OceanConfig, delta_time: f32) -> Self {
        Self {
            n: config.resolution as u32,
            size: config.size,
            delta_time,
            gravity: config.gravity,
        }
    }
}

/// Spectrum composition parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpectrumParams {
    pub n: u32,
    pub size: f32,
    pub choppiness: f32,
    pub _padding: u32,
}

impl SpectrumParams {
    pub fn new(config: &OceanConfig) -> Self {
        Self {
            n: config.resolution as u32,
            size: config.size,
            choppiness: config.choppiness,
            _padding: 0,
        }
    }
}

/// Butterfly pass parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SubtransformParams {
    pub n: u32,
    pub subtransform_size: u32,
    /// 0 = rows, 1 = columns.
    pub axis: u32,
    /// Twiddle sign: +1 inverse, -1 forward.
    pub direction: f32,
}

impl SubtransformParams {
    pub fn new(resolution: usize, pass: &SubtransformPass) -> Self {
        Self {
            n: resolution as u32,
            subtransform_size: pass.subtransform_size,
            axis: match pass.axis {
                Axis::Rows => 0,
                Axis::Columns => 1,
            },
            direction: pass.direction.sign(),
        }
    }
}

/// Normal derivation parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NormalParams {
    pub n: u32,
    pub texel_size: f32,
    pub _pad0: u32,
    pub _pad1: u32,
}

impl NormalParams {
    pub fn new(config: &OceanConfig) -> Self {
        Self {
            n: config.resolution as u32,
            texel_size: config.texel_size(),
            _pad0: 0,
            _pad1: 0,
        }
    }
}
