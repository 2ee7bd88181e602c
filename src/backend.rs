//! Runtime selection between the CPU and GPU ocean pipelines.
//!
//! Both pipelines produce the same [`OceanFrame`]; [`OceanStep`] lets callers
//! drive either one without caring where the work happens.

use std::sync::Arc;
use wgpu::{Device, Queue};

use crate::gpu::{GpuOceanError, GpuOceanPipeline};
use crate::ocean::{OceanConfig, OceanError, OceanFrame, OceanSimulation};

/// Error type for backend-agnostic ocean operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Ocean(#[from] OceanError),
    #[error("GPU error: {0}")]
    Gpu(String),
}

impl From<GpuOceanError> for BackendError {
    fn from(e: GpuOceanError) -> Self {
        match e {
            GpuOceanError::Ocean(inner) => BackendError::Ocean(inner),
            GpuOceanError::InvalidResolution(n) => {
                BackendError::Ocean(OceanError::InvalidResolution(n))
            }
            other => BackendError::Gpu(other.to_string()),
        }
    }
}

/// Anything that can advance the ocean by one tick.
pub trait OceanStep {
    fn config(&self) -> &OceanConfig;

    fn resolution(&self) -> usize {
        self.config().resolution
    }

    /// Advance by `delta_time` seconds and return the new frame.
    fn step_frame(&mut self, delta_time: f32) -> Result<OceanFrame, BackendError>;
}

impl OceanStep for OceanSimulation {
    fn config(&self) -> &OceanConfig {
        OceanSimulation::config(self)
    }

    fn step_frame(&mut self, delta_time: f32) -> Result<OceanFrame, BackendError> {
        Ok(self.step(delta_time)?.clone())
    }
}

impl OceanStep for GpuOceanPipeline {
    fn config(&self) -> &OceanConfig {
        GpuOceanPipeline::config(self)
    }

    fn step_frame(&mut self, delta_time: f32) -> Result<OceanFrame, BackendError> {
        Ok(self.step(delta_time)?)
    }
}

/// Either a CPU or a GPU ocean, chosen at runtime.
pub enum DynamicOcean {
    Cpu(Box<OceanSimulation>),
    Gpu(Box<GpuOceanPipeline>),
}

impl DynamicOcean {
    /// Create a CPU-backed ocean.
    pub fn cpu(config: OceanConfig) -> Result<Self, BackendError> {
        Ok(DynamicOcean::Cpu(Box::new(OceanSimulation::new(config)?)))
    }

    /// Create a GPU-backed ocean seeded exactly like the CPU one.
    pub fn gpu(
        device: Arc<Device>,
        queue: Arc<Queue>,
        config: OceanConfig,
    ) -> Result<Self, BackendError> {
        let cpu = OceanSimulation::new(config)?;
        let gpu = GpuOceanPipeline::new(
            device,
            queue,
            cpu.initial_spectrum(),
            cpu.phase_state(),
            cpu.config(),
        )?;
        Ok(DynamicOcean::Gpu(Box::new(gpu)))
    }

    /// Try the GPU, falling back to the CPU when no device is available or
    /// pipeline creation fails.
    pub fn gpu_with_fallback(
        device: Option<Arc<Device>>,
        queue: Option<Arc<Queue>>,
        config: OceanConfig,
    ) -> Result<Self, BackendError> {
        match (device, queue) {
            (Some(device), Some(queue)) => match Self::gpu(device, queue, config.clone()) {
                Ok(gpu) => Ok(gpu),
                Err(BackendError::Gpu(reason)) => {
                    log::warn!("GPU ocean unavailable ({}), using CPU", reason);
                    Self::cpu(config)
                }
                Err(e) => Err(e),
            },
            _ => Self::cpu(config),
        }
    }

    /// Check if this ocean is running on the GPU.
    pub fn is_gpu(&self) -> bool {
        matches!(self, DynamicOcean::Gpu(_))
    }
}

impl OceanStep for DynamicOcean {
    fn config(&self) -> &OceanConfig {
        match self {
            DynamicOcean::Cpu(o) => OceanStep::config(o.as_ref()),
            DynamicOcean::Gpu(o) => OceanStep::config(o.as_ref()),
        }
    }

    fn step_frame(&mut self, delta_time: f32) -> Result<OceanFrame, BackendError> {
        match self {
            DynamicOcean::Cpu(o) => o.step_frame(delta_time),
            DynamicOcean::Gpu(o) => o.step_frame(delta_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocean::OceanConfigBuilder;

    fn config() -> OceanConfig {
        OceanConfigBuilder::new()
            .resolution(16)
            .size(40.0)
            .wind(6.0, 2.0)
            .amplitude(1e-2)
            .build()
            .unwrap()
    }

    #[test]
    fn test_dynamic_ocean_cpu() {
        let mut ocean = DynamicOcean::cpu(config()).unwrap();
        assert!(!ocean.is_gpu());
        assert_eq!(ocean.resolution(), 16);

        let frame = ocean.step_frame(0.1).unwrap();
        assert_eq!(frame.displacement.resolution(), 16);
        assert!((frame.time - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_dynamic_ocean_fallback() {
        // Without GPU context, should fall back to CPU
        let ocean = DynamicOcean::gpu_with_fallback(None, None, config()).unwrap();
        assert!(!ocean.is_gpu());
    }

    #[test]
    fn test_invalid_config_is_not_swallowed_by_fallback() {
        let bad = OceanConfig {
            resolution: 12,
            ..config()
        };
        assert!(matches!(
            DynamicOcean::gpu_with_fallback(None, None, bad),
            Err(BackendError::Ocean(OceanError::InvalidResolution(12)))
        ));
    }

    #[test]
    fn test_gpu_error_mapping() {
        let e: BackendError = GpuOceanError::BufferMapFailed("lost".into()).into();
        assert!(matches!(e, BackendError::Gpu(_)));
        let e: BackendError = GpuOceanError::ExceedsDeviceLimits {
            resolution: 4096,
            max: 2048,
        }
        .into();
        assert!(matches!(e, BackendError::Gpu(_)));
        let e: BackendError = GpuOceanError::InvalidResolution(3).into();
        assert!(matches!(
            e,
            BackendError::Ocean(OceanError::InvalidResolution(3))
        ));
    }
}
