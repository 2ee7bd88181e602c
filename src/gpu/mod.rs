//! Headless GPU compute using wgpu.
//!
//! Runs the per-tick ocean pipeline on the GPU and reads the finished
//! displacement and normal textures back.

pub mod compute;
pub mod context;

pub use compute::{GpuOceanError, GpuOceanPipeline};
pub use context::{GpuContext, GpuError};
