//! Configuration management for the console
//!
//! This module handles loading, validation, and management of the console configuration.

mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{ConsoleError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the console
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConsoleError::config(format!("Failed to read config file: {e}")))?;

        let console: ConsoleConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConsoleError::config(format!("Failed to parse config: {e}")))?;

        let config = Self { console };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            console: ConsoleConfig::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn server(&self) -> &ServerConfig {
        &self.console.server
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.console.logging
    }

    pub fn databases(&self) -> &[DatabaseInstance] {
        &self.console.databases
    }

    pub fn registries(&self) -> &[RegistryInstance] {
        &self.console.registries
    }

    pub fn object_store(&self) -> &ObjectStoreConfig {
        &self.console.object_store
    }

    pub fn cluster(&self) -> &ClusterConfig {
        &self.console.cluster
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");
        self.console.ensure_valid("Console")?;
        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.console)
            .map_err(|e| ConsoleError::config(format!("Failed to serialize config to YAML: {e}")))
    }
}
