//! Headless wgpu device for the ocean compute kernels.

use std::sync::Arc;
use wgpu::{Adapter, Device, Instance, Limits, Queue};

/// Bytes per `vec4<f32>` texel, the widest per-bin record the kernels store.
const TEXEL_BYTES: u64 = 16;

/// Errors raised while acquiring a compute device.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
}

/// Adapter, device and queue shared by every ocean pipeline built on it.
///
/// `device` and `queue` are reference counted so one context can feed
/// several [`GpuOceanPipeline`](super::GpuOceanPipeline)s.
pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Arc<Adapter>,
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
}

impl GpuContext {
    /// Acquire a compute-only device with no surface.
    pub async fn new() -> Result<Self, GpuError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::METAL | wgpu::Backends::VULKAN | wgpu::Backends::GL,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("ocean compute adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("ocean-fft"),
                required_features: wgpu::Features::empty(),
                required_limits: Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        Ok(Self {
            instance,
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// [`GpuContext::new`] driven to completion on the calling thread.
    pub fn new_blocking() -> Result<Self, GpuError> {
        pollster::block_on(Self::new())
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Largest grid edge this device can simulate.
    pub fn max_resolution(&self) -> usize {
        max_resolution(&self.device.limits())
    }
}

/// Largest power-of-two `N` whose `N×N` texel buffer fits a single storage
/// binding, and whose readback buffer (two texel buffers) fits `max_buffer_size`.
pub fn max_resolution(limits: &Limits) -> usize {
    let binding = limits.max_storage_buffer_binding_size as u64;
    let buffer = limits.max_buffer_size / 2;
    let cells = binding.min(buffer) / TEXEL_BYTES;
    if cells == 0 {
        return 0;
    }
    // Largest power-of-four cell count, i.e. N = 2^(log2(cells) / 2).
    1usize << (cells.ilog2() / 2)
}
