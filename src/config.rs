use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::schema::SamplingMode;
use crate::schema::SimulationParams;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub true_slope: f64,
    pub true_intercept: f64,
    pub noise_level: f64,
    /// Points added per tick.
    pub batch_size: usize,
    /// Milliseconds between ticks when running in real time.
    pub speed_ms: u64,
    pub min_sample_size: usize,
    pub max_sample_size: usize,
    pub sampling_mode: SamplingMode,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            true_slope: 2.0,
            true_intercept: 1.0,
            noise_level: 2.0,
            batch_size: 10,
            speed_ms: 100,
            min_sample_size: 10,
            max_sample_size: 5000,
            sampling_mode: SamplingMode::Cumulative,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    pub fn load() -> Result<SimulationConfig, ConfigLoadError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<SimulationConfig, ConfigLoadError> {
        let s = fs_err::read_to_string(path.as_ref())?;
        Self::parse(&s)
    }

    pub fn parse(s: &str) -> Result<SimulationConfig, ConfigLoadError> {
        Ok(toml::from_str(s)?)
    }

    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            true_slope: self.true_slope,
            true_intercept: self.true_intercept,
            noise_level: self.noise_level,
            seed: self.seed,
            sampling_mode: self.sampling_mode,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        use ConfigError::*;
        if !self.true_slope.is_finite() || !self.true_intercept.is_finite() {
            return Err(NonFiniteModel);
        }
        if !self.noise_level.is_finite() || self.noise_level < 0.0 {
            return Err(InvalidNoiseLevel(self.noise_level));
        }
        if self.batch_size == 0 {
            return Err(ZeroBatchSize);
        }
        if self.min_sample_size == 0 {
            return Err(ZeroMinSampleSize);
        }
        if self.min_sample_size > self.max_sample_size {
            return Err(SampleSizeRange {
                min: self.min_sample_size,
                max: self.max_sample_size,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("{0}")]
    IOError(#[from] std::io::Error),
    #[error("{0}")]
    IllegalConfigEntry(#[from] toml::de::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("true slope and intercept must be finite")]
    NonFiniteModel,
    #[error("noise level must be a finite non-negative number, got {0}")]
    InvalidNoiseLevel(f64),
    #[error("batch size must be positive")]
    ZeroBatchSize,
    #[error("minimum sample size must be positive")]
    ZeroMinSampleSize,
    #[error("minimum sample size {min} exceeds maximum sample size {max}")]
    SampleSizeRange { min: usize, max: usize },
}
