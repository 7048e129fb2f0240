//! Error types for the sweep core library.
//!
//! Everything that can abort a sweep is a `CoreError`. Failures of individual
//! transcoder runs are not errors at this level: they are recorded as
//! [`InvocationOutcome`](crate::reporting::InvocationOutcome) values and the
//! sweep carries on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the sweep controller
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Manifest error in {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Required executable '{0}' was not found")]
    DependencyNotFound(String),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed while waiting for '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Scratch space unusable at {path}: {message}")]
    Scratch { path: PathBuf, message: String },

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Sweep interrupted: {0}")]
    Interrupted(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for sweep operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error for the named program.
pub fn command_start_error(program: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandStart(program.into(), error)
}

/// Builds a `CommandWait` error for the named program.
pub fn command_wait_error(program: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandWait(program.into(), error)
}

/// Builds a `Scratch` error for the given path.
pub fn scratch_error(path: impl Into<PathBuf>, message: impl Into<String>) -> CoreError {
    CoreError::Scratch {
        path: path.into(),
        message: message.into(),
    }
}
