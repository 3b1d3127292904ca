//! Subcommand implementations.

pub mod demo;
pub mod discover;
pub mod list;
pub mod register;
pub mod select;

use toolkit_engine::{ConfigError, ConfigStore, EngineConfig};

/// Configuration and store for the current environment.
pub fn context() -> Result<(EngineConfig, ConfigStore), ConfigError> {
    let config = EngineConfig::from_env()?;
    let store = ConfigStore::from_config(&config);
    Ok((config, store))
}
