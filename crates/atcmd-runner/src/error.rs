//! Error types for the runner.

use std::path::PathBuf;

use atcmd_core::EngineError;
use thiserror::Error;

/// Errors that can occur while setting up or running the engine host.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// I/O failure on a socket or the console.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`RunnerConfig`](crate::RunnerConfig).
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// The engine rejected its configuration or a channel allocation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
