// src/errors.rs

//! Crate-wide error types and helpers.

use thiserror::Error;

use crate::task::TaskId;

/// Errors surfaced by the embedding API (runner, config, pool).
#[derive(Error, Debug)]
pub enum TicktaskError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Scheduler not found: {0}")]
    SchedulerNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure cause carried through a task's failed event.
///
/// Everything a step closure can go wrong with ends up here: either a
/// user-reported failure, or the distinguished timeout cause raised by the
/// timeout combinator.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("task step failed: {0}")]
    StepFailed(String),

    #[error("timed out after {limit:.3}s")]
    Timeout { limit: f32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskError {
    /// Shorthand for a step failure with a plain message.
    pub fn step(msg: impl Into<String>) -> Self {
        TaskError::StepFailed(msg.into())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TicktaskError>;
