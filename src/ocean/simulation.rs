//! Complete per-tick ocean pipeline.
//!
//! [`OceanSimulation`] owns every buffer of the pipeline: base spectrum,
//! phase ping-pong pair, evolved spectra, transform scratch space and the
//! last produced frame. Everything is released together when it drops.

use rustfft::num_complex::Complex32;

use super::butterfly::ButterflyEngine;
use super::config::OceanConfig;
use super::normals;
use super::phase::{compose_spectrum, EvolvedSpectrum, PhaseEvolver, PhaseState};
use super::spectrum::InitialSpectrum;
use super::OceanError;
use crate::grid::{ComplexGrid, DisplacementField, Grid, NormalField};

/// Output of one simulation tick: the displacement/normal texture pair.
#[derive(Debug, Clone)]
pub struct OceanFrame {
    pub displacement: DisplacementField,
    pub normals: NormalField,
    /// Simulation time the frame corresponds to, in seconds.
    pub time: f64,
}

/// Synthesize a base spectrum without building a full simulation.
pub fn initialize_spectrum(
    resolution: usize,
    wind: (f32, f32),
    wave_scale: f32,
    seed: u64,
) -> Result<ComplexGrid, OceanError> {
    let config = OceanConfig {
        resolution,
        wind: [wind.0, wind.1],
        size: wave_scale,
        seed,
        ..OceanConfig::default()
    };
    Ok(InitialSpectrum::generate(&config)?.into_grid())
}

/// CPU ocean simulation.
pub struct OceanSimulation {
    config: OceanConfig,
    initial: InitialSpectrum,
    evolver: PhaseEvolver,
    engine: ButterflyEngine,
    evolved: EvolvedSpectrum,
    last_frame: Option<OceanFrame>,
}

impl OceanSimulation {
    /// Validate `config` and synthesize the initial spectrum.
    pub fn new(config: OceanConfig) -> Result<Self, OceanError> {
        config.validate()?;
        let initial = InitialSpectrum::generate(&config)?;
        let phases = PhaseState::random(config.resolution, config.seed)?;
        Self::with_parts(config, initial, phases)
    }

    /// Build from an existing spectrum and phase state.
    pub fn with_parts(
        config: OceanConfig,
        initial: InitialSpectrum,
        phases: PhaseState,
    ) -> Result<Self, OceanError> {
        config.validate()?;
        let n = config.resolution;
        initial.grid().ensure_resolution(n)?;
        phases.current().ensure_resolution(n)?;

        let engine = ButterflyEngine::new(n)?;
        let evolved = compose_spectrum(&initial, phases.current(), config.choppiness)?;
        let evolver = PhaseEvolver::new(phases, config.size, config.gravity);

        log::info!(
            "ocean simulation: {}x{} grid, {}m patch, {} butterfly passes",
            n,
            n,
            config.size,
            engine.num_passes()
        );

        Ok(Self {
            config,
            initial,
            evolver,
            engine,
            evolved,
            last_frame: None,
        })
    }

    pub fn config(&self) -> &OceanConfig {
        &self.config
    }

    pub fn initial_spectrum(&self) -> &InitialSpectrum {
        &self.initial
    }

    pub fn phase_state(&self) -> &PhaseState {
        self.evolver.state()
    }

    pub fn evolver(&self) -> &PhaseEvolver {
        &self.evolver
    }

    pub fn elapsed(&self) -> f64 {
        self.evolver.elapsed()
    }

    /// Most recent evolved spectra (transform bin order).
    pub fn evolved(&self) -> &EvolvedSpectrum {
        &self.evolved
    }

    /// The last completed frame, reused when a tick is skipped.
    pub fn last_frame(&self) -> Option<&OceanFrame> {
        self.last_frame.as_ref()
    }

    /// Advance phases by `delta_time` and rebuild the evolved spectrum.
    pub fn evolve_phase(&mut self, delta_time: f32) -> Result<&ComplexGrid, OceanError> {
        let phases = self.evolver.tick(delta_time);
        self.evolved = compose_spectrum(&self.initial, phases, self.config.choppiness)?;
        Ok(&self.evolved.height)
    }

    /// Inverse-transform a spectrum into heights.
    pub fn inverse_transform(
        &mut self,
        spectrum: &ComplexGrid,
    ) -> Result<DisplacementField, OceanError> {
        self.engine.inverse_transform(spectrum)
    }

    /// Normals of `field` at this patch's texel size.
    pub fn derive_normals(&self, field: &DisplacementField) -> NormalField {
        normals::derive_normals(field, self.config.texel_size())
    }

    /// Run one full tick: evolve, transform, derive normals.
    pub fn step(&mut self, delta_time: f32) -> Result<&OceanFrame, OceanError> {
        self.evolve_phase(delta_time)?;

        let mut displacement = self.engine.inverse_transform(&self.evolved.height)?;
        if let Some(horizontal) = &self.evolved.horizontal {
            let packed = self.engine.inverse(horizontal)?;
            displacement.horizontal = Some(unpack_horizontal(&packed));
        }
        let normals = self.derive_normals(&displacement);

        let (lo, hi) = displacement.height_range();
        if displacement.imaginary_residual > 1e-3 * lo.abs().max(hi.abs()) {
            log::warn!(
                "height field imaginary residual {:.3e} at t = {:.3}s",
                displacement.imaginary_residual,
                self.elapsed()
            );
        }

        let time = self.elapsed();
        Ok(&*self.last_frame.insert(OceanFrame {
            displacement,
            normals,
            time,
        }))
    }
}

/// Split a packed `dx + i·dz` spatial grid into `[dx, dz]` pairs.
fn unpack_horizontal(packed: &ComplexGrid) -> Grid<[f32; 2]> {
    packed.map(|c: &Complex32| [c.re, c.im])
}
