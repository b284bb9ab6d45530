//! Error types for tuner-core.

use thiserror::Error;

/// Error type for tuner operations.
///
/// Everything except [`TunerError::InvalidConfig`] is local to a single frame
/// or lifecycle call; a running session survives them.
#[derive(Error, Debug)]
pub enum TunerError {
    #[error("Invalid frequency: {0}. Must be finite and greater than zero")]
    InvalidFrequency(f32),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Tuner is not running")]
    NotRunning,

    #[error("Tuner is already running")]
    AlreadyRunning,

    #[error("Failed to spawn tuner worker thread")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("Tuner worker thread panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, TunerError>;
