//! Ocean simulation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{validate_resolution, OceanError};

/// Parameters of the simulated ocean patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanConfig {
    /// Grid edge length `N`. Must be a power of two.
    pub resolution: usize,
    /// Wind velocity in m/s; direction and speed drive the spectrum.
    pub wind: [f32; 2],
    /// Physical edge length of the patch in meters.
    pub size: f32,
    /// Phillips spectrum scale constant.
    pub amplitude: f32,
    /// Small-wave cutoff as a fraction of the largest wind wave.
    pub damping: f32,
    /// Gravitational acceleration in m/s².
    pub gravity: f32,
    /// Horizontal displacement scale. Zero disables choppy waves.
    pub choppiness: f32,
    /// Seed for spectrum weights and initial phases.
    pub seed: u64,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            resolution: 512,
            wind: [10.0, 10.0],
            size: 250.0,
            amplitude: 2e-4,
            damping: 0.001,
            gravity: 9.81,
            choppiness: 1.0,
            seed: 12345,
        }
    }
}

impl OceanConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, OceanError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OceanError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, OceanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every parameter before any buffer is allocated.
    pub fn validate(&self) -> Result<(), OceanError> {
        validate_resolution(self.resolution)?;

        if !self.wind.iter().all(|w| w.is_finite()) {
            return Err(OceanError::InvalidParameter(format!(
                "wind must be finite, got {:?}",
                self.wind
            )));
        }
        Self::check_positive("size", self.size)?;
        Self::check_positive("gravity", self.gravity)?;
        Self::check_non_negative("amplitude", self.amplitude)?;
        Self::check_non_negative("damping", self.damping)?;
        if !self.choppiness.is_finite() {
            return Err(OceanError::InvalidParameter(format!(
                "choppiness must be finite, got {}",
                self.choppiness
            )));
        }
        Ok(())
    }

    /// Wind speed in m/s.
    pub fn wind_speed(&self) -> f32 {
        (self.wind[0] * self.wind[0] + self.wind[1] * self.wind[1]).sqrt()
    }

    /// World-space size of one texel.
    pub fn texel_size(&self) -> f32 {
        self.size / self.resolution as f32
    }

    fn check_positive(name: &str, value: f32) -> Result<(), OceanError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(OceanError::InvalidParameter(format!(
                "{} must be finite and > 0, got {}",
                name, value
            )));
        }
        Ok(())
    }

    fn check_non_negative(name: &str, value: f32) -> Result<(), OceanError> {
        if !value.is_finite() || value < 0.0 {
            return Err(OceanError::InvalidParameter(format!(
                "{} must be finite and >= 0, got {}",
                name, value
            )));
        }
        Ok(())
    }
}

/// Builder for [`OceanConfig`].
#[derive(Debug, Clone, Default)]
pub struct OceanConfigBuilder {
    config: OceanConfig,
}

impl OceanConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution(mut self, resolution: usize) -> Self {
        self.config.resolution = resolution;
        self
    }
    pub fn wind(mut self, x: f32, y: f32) -> Self {
        self.config.wind = [x, y];
        self
    }
    pub fn size(mut self, size: f32) -> Self {
        self.config.size = size;
        self
    }
    pub fn amplitude(mut self, amplitude: f32) -> Self {
        self.config.amplitude = amplitude;
        self
    }
    pub fn damping(mut self, damping: f32) -> Self {
        self.config.damping = damping;
        self
    }
    pub fn gravity(mut self, gravity: f32) -> Self {
        self.config.gravity = gravity;
        self
    }
    pub fn choppiness(mut self, choppiness: f32) -> Self {
        self.config.choppiness = choppiness;
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn build(self) -> Result<OceanConfig, OceanError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
