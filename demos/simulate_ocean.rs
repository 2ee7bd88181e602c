//! Demo: simulate a few ocean ticks and export the result as images.
//!
//! Uses the GPU when an adapter is available, the CPU otherwise. An optional
//! JSON config path may be passed as the first argument.
//!
//! Run with:
//!     cargo run --example simulate_ocean -- [config.json]

use anyhow::Context;
use ocean_fft::backend::{DynamicOcean, OceanStep};
use ocean_fft::export::{displacement_rgba32f, save_height_png, save_normal_png};
use ocean_fft::gpu::GpuContext;
use ocean_fft::noise::{octave_textures, NoiseTextureConfig};
use ocean_fft::ocean::OceanConfig;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => OceanConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => OceanConfig::default(),
    };

    println!("Ocean FFT - Simulation Demo");
    println!("===========================\n");
    println!("  Grid: {}x{}", config.resolution, config.resolution);
    println!("  Patch size: {} m", config.size);
    println!("  Wind: {:?} ({:.1} m/s)", config.wind, config.wind_speed());
    println!("  Choppiness: {}\n", config.choppiness);

    let ctx = match GpuContext::new_blocking() {
        Ok(ctx) => {
            println!(
                "  GPU: {} (grids up to {}x{})\n",
                ctx.adapter_info().name,
                ctx.max_resolution(),
                ctx.max_resolution()
            );
            Some(ctx)
        }
        Err(e) => {
            println!("  GPU unavailable ({}), running on the CPU\n", e);
            None
        }
    };

    let mut ocean = DynamicOcean::gpu_with_fallback(
        ctx.as_ref().map(|c| c.device.clone()),
        ctx.as_ref().map(|c| c.queue.clone()),
        config,
    )?;

    let ticks = 60;
    let delta_time = 1.0 / 30.0;
    let start = std::time::Instant::now();
    let mut frame = ocean.step_frame(delta_time)?;
    for _ in 1..ticks {
        frame = ocean.step_frame(delta_time)?;
    }
    let elapsed = start.elapsed();
    println!(
        "Simulated {} ticks ({:.2}s of ocean) in {:.2?} on the {}",
        ticks,
        frame.time,
        elapsed,
        if ocean.is_gpu() { "GPU" } else { "CPU" }
    );

    let (lo, hi) = frame.displacement.height_range();
    println!("  Height range: {:.3} .. {:.3} m", lo, hi);
    println!("  Imaginary residual: {:.3e}\n", frame.displacement.imaginary_residual);

    let out = Path::new("ocean_output");
    std::fs::create_dir_all(out)?;
    save_height_png(&frame.displacement.height, out.join("height.png"))?;
    save_normal_png(&frame.normals, out.join("normals.png"))?;
    let displacement = displacement_rgba32f(&frame.displacement);
    println!(
        "  Displacement texture: {}x{} RGBA32F",
        displacement.width(),
        displacement.height()
    );

    for (octave, texture) in octave_textures(&NoiseTextureConfig::default())?
        .iter()
        .enumerate()
    {
        texture.save(out.join(format!("noise_{}.png", octave)))?;
    }

    println!("Wrote images to {}", out.display());
    Ok(())
}
