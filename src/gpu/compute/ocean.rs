//! GPU-resident ocean pipeline using wgpu compute shaders.

use std::sync::Arc;
use wgpu::{Device, Queue};

use super::buffers::{OceanBuffers, OceanParamBuffers};
use super::params::{NormalParams, PhaseParams, SpectrumParams, SubtransformParams};
use super::pipelines::{OceanLayouts, OceanPipelines};
use crate::gpu::context::max_resolution;
use crate::grid::{DisplacementField, Grid};
use crate::ocean::butterfly::pass_plan;
use crate::ocean::{
    validate_resolution, InitialSpectrum, OceanConfig, OceanError, OceanFrame, PassSource,
    PassTarget, PhaseState, SubtransformPass, TransformDirection,
};

/// Errors that can occur during GPU ocean operations.
#[derive(Debug, thiserror::Error)]
pub enum GpuOceanError {
    #[error("Resolution must be a power of 2, got {0}")]
    InvalidResolution(usize),
    #[error("Grid resolution mismatch: expected {expected}, got {got}")]
    GridMismatch { expected: usize, got: usize },
    #[error("Resolution {resolution} exceeds the device limit of {max}")]
    ExceedsDeviceLimits { resolution: usize, max: usize },
    #[error("GPU buffer mapping failed: {0}")]
    BufferMapFailed(String),
    #[error(transparent)]
    Ocean(#[from] OceanError),
}

const WORKGROUP_SIZE: u32 = 8;

/// Per-tick ocean pipeline running entirely on the GPU.
///
/// Holds the base spectrum, phase ping-pong pair, spectrum, scratch and
/// output buffers. Only the finished frame is read back.
pub struct GpuOceanPipeline {
    device: Arc<Device>,
    queue: Arc<Queue>,
    config: OceanConfig,
    plan: Vec<SubtransformPass>,
    layouts: OceanLayouts,
    pipelines: OceanPipelines,
    buffers: OceanBuffers,
    params: OceanParamBuffers,
    current_phase: usize,
    elapsed: f64,
}

impl GpuOceanPipeline {
    /// Upload the base spectrum and phases and compile every kernel.
    pub fn new(
        device: Arc<Device>,
        queue: Arc<Queue>,
        initial: &InitialSpectrum,
        phases: &PhaseState,
        config: &OceanConfig,
    ) -> Result<Self, GpuOceanError> {
        let n = validate_resolution(config.resolution)
            .map_err(|_| GpuOceanError::InvalidResolution(config.resolution))?;
        config.validate()?;
        for got in [initial.resolution(), phases.resolution()] {
            if got != n {
                return Err(GpuOceanError::GridMismatch { expected: n, got });
            }
        }
        let max = max_resolution(&device.limits());
        if n > max {
            return Err(GpuOceanError::ExceedsDeviceLimits { resolution: n, max });
        }

        let layouts = OceanLayouts::new(&device);
        let pipelines = OceanPipelines::new(&device, &layouts);
        let buffers = OceanBuffers::new(&device, n);
        let params = OceanParamBuffers::new(&device);

        let base: Vec<[f32; 2]> = initial
            .grid()
            .as_slice()
            .iter()
            .map(|c| [c.re, c.im])
            .collect();
        queue.write_buffer(&buffers.base_spectrum, 0, bytemuck::cast_slice(&base));
        queue.write_buffer(
            &buffers.phases[0],
            0,
            bytemuck::cast_slice(phases.current().as_slice()),
        );
        queue.write_buffer(&params.spectrum, 0, bytemuck::bytes_of(&SpectrumParams::new(config)));
        queue.write_buffer(&params.normals, 0, bytemuck::bytes_of(&NormalParams::new(config)));

        log::info!(
            "gpu ocean pipeline: {}x{} grid, {} subtransform passes",
            n,
            n,
            2 * n.trailing_zeros()
        );

        Ok(Self {
            device,
            queue,
            config: config.clone(),
            plan: pass_plan(n, TransformDirection::Inverse),
            layouts,
            pipelines,
            buffers,
            params,
            current_phase: 0,
            elapsed: 0.0,
        })
    }

    pub fn config(&self) -> &OceanConfig {
        &self.config
    }

    pub fn resolution(&self) -> usize {
        self.config.resolution
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Run one tick and read the frame back.
    pub fn step(&mut self, delta_time: f32) -> Result<OceanFrame, GpuOceanError> {
        self.run_phase(delta_time);
        self.run_compose();
        self.run_subtransforms();
        self.run_normals();
        self.elapsed += delta_time as f64;
        self.read_frame()
    }

    // --- Private helpers ---

    fn run_phase(&mut self, delta_time: f32) {
        let params = PhaseParams::new(&self.config, delta_time);
        self.queue
            .write_buffer(&self.params.phase, 0, bytemuck::bytes_of(&params));

        let input = &self.buffers.phases[self.current_phase];
        let output = &self.buffers.phases[self.current_phase ^ 1];
        let bind_group = self.create_bind_group(
            "evolve_phase",
            &self.layouts.standard,
            &[input, output, &self.params.phase],
        );
        self.dispatch("evolve_phase", &self.pipelines.phase, &bind_group);
        self.current_phase ^= 1;
    }

    fn run_compose(&self) {
        let bind_group = self.create_bind_group(
            "compose_spectrum",
            &self.layouts.spectrum,
            &[
                &self.buffers.base_spectrum,
                &self.buffers.phases[self.current_phase],
                &self.buffers.spectrum,
                &self.params.spectrum,
            ],
        );
        self.dispatch("compose_spectrum", &self.pipelines.spectrum, &bind_group);
    }

    fn run_subtransforms(&self) {
        if self.plan.is_empty() {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("ocean_copy_encoder"),
                });
            encoder.copy_buffer_to_buffer(
                &self.buffers.spectrum,
                0,
                &self.buffers.displacement,
                0,
                self.texel_bytes(),
            );
            self.queue.submit(Some(encoder.finish()));
            return;
        }

        // Each pass needs its own submit so the uniform update takes effect.
        for pass in &self.plan {
            let params = SubtransformParams::new(self.config.resolution, pass);
            self.queue
                .write_buffer(&self.params.subtransform, 0, bytemuck::bytes_of(&params));

            let input = match pass.source {
                PassSource::Spectrum => &self.buffers.spectrum,
                PassSource::Scratch(i) => &self.buffers.scratch[i],
            };
            let output = match pass.target {
                PassTarget::Scratch(i) => &self.buffers.scratch[i],
                PassTarget::Output => &self.buffers.displacement,
            };

            let bind_group = self.create_bind_group(
                "subtransform",
                &self.layouts.standard,
                &[input, output, &self.params.subtransform],
            );
            self.dispatch("subtransform", &self.pipelines.subtransform, &bind_group);
        }
    }

    fn run_normals(&self) {
        let bind_group = self.create_bind_group(
            "derive_normals",
            &self.layouts.standard,
            &[
                &self.buffers.displacement,
                &self.buffers.normals,
                &self.params.normals,
            ],
        );
        self.dispatch("derive_normals", &self.pipelines.normals, &bind_group);
    }

    fn dispatch(&self, label: &str, pipeline: &wgpu::ComputePipeline, bind_group: &wgpu::BindGroup) {
        let workgroups = (self.config.resolution as u32).div_ceil(WORKGROUP_SIZE);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&format!("{}_encoder", label)),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&format!("{}_pass", label)),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups, workgroups, 1);
        }
        self.queue.submit(Some(encoder.finish()));
    }

    fn create_bind_group(
        &self,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        buffers: &[&wgpu::Buffer],
    ) -> wgpu::BindGroup {
        let entries: Vec<wgpu::BindGroupEntry> = buffers
            .iter()
            .enumerate()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        })
    }

    fn texel_bytes(&self) -> u64 {
        let n = self.config.resolution as u64;
        n * n * 4 * std::mem::size_of::<f32>() as u64
    }

    fn read_frame(&self) -> Result<OceanFrame, GpuOceanError> {
        let texel_bytes = self.texel_bytes();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ocean_readback_encoder"),
            });
        encoder.copy_buffer_to_buffer(
            &self.buffers.displacement,
            0,
            &self.buffers.staging,
            0,
            texel_bytes,
        );
        encoder.copy_buffer_to_buffer(
            &self.buffers.normals,
            0,
            &self.buffers.staging,
            texel_bytes,
            texel_bytes,
        );
        self.queue.submit(Some(encoder.finish()));

        let texels = self.read_staging(2 * texel_bytes)?;
        let (displacement, normals) = texels.split_at(texels.len() / 2);
        let n = self.config.resolution;

        let height = Grid::from_vec(n, displacement.iter().map(|t| t[0]).collect())?;
        let imaginary_residual = displacement
            .iter()
            .fold(0.0f32, |acc, t| acc.max(t[1].abs()));
        let horizontal = if self.config.choppiness != 0.0 {
            Some(Grid::from_vec(
                n,
                displacement.iter().map(|t| [t[2], t[3]]).collect(),
            )?)
        } else {
            None
        };
        let normals = Grid::from_vec(n, normals.iter().map(|t| [t[0], t[1], t[2]]).collect())?;

        Ok(OceanFrame {
            displacement: DisplacementField {
                height,
                horizontal,
                imaginary_residual,
            },
            normals,
            time: self.elapsed,
        })
    }

    fn read_staging(&self, size: u64) -> Result<Vec<[f32; 4]>, GpuOceanError> {
        let slice = self.buffers.staging.slice(..size);

        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GpuOceanError::BufferMapFailed(format!("{:?}", e)))?;

        rx.recv()
            .map_err(|e| GpuOceanError::BufferMapFailed(e.to_string()))?
            .map_err(|e| GpuOceanError::BufferMapFailed(format!("{:?}", e)))?;

        let data = slice.get_mapped_range();
        let result: Vec<[f32; 4]> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        self.buffers.staging.unmap();

        Ok(result)
    }
}
