// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::RunnerConfig;
use crate::errors::{Result, TicktaskError};

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RunnerConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RunnerConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file and run basic validation.
///
/// This is the recommended entry point: it reads the TOML, applies defaults
/// (handled by `serde` + `Default` impls) and checks every scheduler cap.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<RunnerConfig> {
    let config = load_from_path(path)?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &RunnerConfig) -> Result<()> {
    for (name, section) in &config.scheduler {
        if section.max_per_tick == 0 {
            return Err(TicktaskError::ConfigError(format!(
                "[scheduler.{name}].max_per_tick must be >= 1 (got 0)"
            )));
        }
    }
    Ok(())
}
