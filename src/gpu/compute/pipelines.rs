//! Compute pipeline creation for the ocean kernels.

use wgpu::{BindGroupLayout, ComputePipeline, Device};

/// All compute pipelines of the per-tick pipeline.
pub struct OceanPipelines {
    pub phase: ComputePipeline,
    pub spectrum: ComputePipeline,
    pub subtransform: ComputePipeline,
    pub normals: ComputePipeline,
}

/// Bind group layouts shared by the pipelines.
pub struct OceanLayouts {
    /// Input storage, output storage, uniform params.
    pub standard: BindGroupLayout,
    /// Base spectrum, phases, output spectrum, uniform params.
    pub spectrum: BindGroupLayout,
}

impl OceanLayouts {
    pub fn new(device: &Device) -> Self {
        Self {
            standard: Self::create_layout(device, "ocean_standard", 1),
            spectrum: Self::create_layout(device, "ocean_spectrum", 2),
        }
    }

    /// `inputs` read-only storage bindings, then one writable storage binding,
    /// then the uniform.
    fn create_layout(device: &Device, name: &str, inputs: u32) -> BindGroupLayout {
        let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let mut entries: Vec<wgpu::BindGroupLayoutEntry> =
            (0..inputs).map(|binding| storage(binding, true)).collect();
        entries.push(storage(inputs, false));
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: inputs + 1,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{}_layout", name)),
            entries: &entries,
        })
    }
}

impl OceanPipelines {
    /// Compile every kernel.
    pub fn new(device: &Device, layouts: &OceanLayouts) -> Self {
        Self {
            phase: Self::create_pipeline(
                device,
                &layouts.standard,
                "evolve_phase",
                include_str!("../shaders/phase.wgsl"),
            ),
            spectrum: Self::create_pipeline(
                device,
                &layouts.spectrum,
                "compose_spectrum",
                include_str!("../shaders/spectrum.wgsl"),
            ),
            subtransform: Self::create_pipeline(
                device,
                &layouts.standard,
                "subtransform",
                include_str!("../shaders/subtransform.wgsl"),
            ),
            normals: Self::create_pipeline(
                device,
                &layouts.standard,
                "derive_normals",
                include_str!("../shaders/normals.wgsl"),
            ),
        }
    }

    fn create_pipeline(
        device: &Device,
        layout: &BindGroupLayout,
        name: &str,
        source: &str,
    ) -> ComputePipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{}_shader", name)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{}_pipeline_layout", name)),
            bind_group_layouts: &[layout],
            immediate_size: 0,
        });

        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&format!("{}_pipeline", name)),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(name),
            compilation_options: Default::default(),
            cache: None,
        })
    }
}
