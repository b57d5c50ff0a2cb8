use thiserror::Error;

use crate::config::ConfigError;
use crate::config::ConfigLoadError;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Error while loading config: {0}")]
    ConfigLoadError(#[from] ConfigLoadError),
    #[error("Invalid simulation config: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Error while talking to the simulation runner: {0}")]
    RunnerError(#[from] RunnerError),
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Could not spawn the simulation thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("The simulation thread has stopped")]
    Stopped,
    #[error("The simulation thread panicked")]
    Panicked,
}
