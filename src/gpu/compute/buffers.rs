//! GPU buffer management for the ocean pipeline.

use wgpu::{Buffer, BufferUsages, Device};

/// Bytes per complex pair.
const COMPLEX_BYTES: u64 = 2 * std::mem::size_of::<f32>() as u64;
/// Bytes per packed texel (two complex pairs, or a normal plus padding).
const TEXEL_BYTES: u64 = 4 * std::mem::size_of::<f32>() as u64;

/// Every storage buffer the ocean kernels read or write.
pub struct OceanBuffers {
    /// Base amplitudes `h₀`, centered order, `vec2<f32>` per bin.
    pub base_spectrum: Buffer,
    /// Phase ping-pong pair, `f32` per bin.
    pub phases: [Buffer; 2],
    /// Evolved height + packed horizontal spectrum, `vec4<f32>` per bin.
    pub spectrum: Buffer,
    /// Butterfly scratch ping-pong pair.
    pub scratch: [Buffer; 2],
    /// Final pass output: `(h.re, h.im, dx, dz)` per texel.
    pub displacement: Buffer,
    /// Unit normals, `vec4<f32>` per texel.
    pub normals: Buffer,
    /// Readback space for displacement followed by normals.
    pub staging: Buffer,
}

impl OceanBuffers {
    /// Create all buffers for a `resolution×resolution` grid.
    pub fn new(device: &Device, resolution: usize) -> Self {
        let cells = (resolution * resolution) as u64;
        let texel_size = cells * TEXEL_BYTES;

        let base_spectrum = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ocean_base_spectrum"),
            size: cells * COMPLEX_BYTES,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let phase_size = cells * std::mem::size_of::<f32>() as u64;
        let phases = [
            Self::storage(device, "ocean_phases_a", phase_size),
            Self::storage(device, "ocean_phases_b", phase_size),
        ];

        let spectrum = Self::storage(device, "ocean_spectrum", texel_size);
        let scratch = [
            Self::storage(device, "ocean_scratch_a", texel_size),
            Self::storage(device, "ocean_scratch_b", texel_size),
        ];
        let displacement = Self::storage(device, "ocean_displacement", texel_size);
        let normals = Self::storage(device, "ocean_normals", texel_size);

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ocean_staging"),
            size: 2 * texel_size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            base_spectrum,
            phases,
            spectrum,
            scratch,
            displacement,
            normals,
            staging,
        }
    }

    fn storage(device: &Device, label: &str, size: u64) -> Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

/// Uniform parameter buffers, one per kernel.
pub struct OceanParamBuffers {
    pub phase: Buffer,
    pub spectrum: Buffer,
    pub subtransform: Buffer,
    pub normals: Buffer,
}

impl OceanParamBuffers {
    pub fn new(device: &Device) -> Self {
        Self {
            phase: Self::create_uniform_buffer(device, "phase_params", 16),
            spectrum: Self::create_uniform_buffer(device, "spectrum_params", 16),
            subtransform: Self::create_uniform_buffer(device, "subtransform_params", 16),
            normals: Self::create_uniform_buffer(device, "normal_params", 16),
        }
    }

    fn create_uniform_buffer(device: &Device, label: &str, size: u64) -> Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}
