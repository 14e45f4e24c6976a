//! Root console configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the console needs to build its collectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Interval between collection cycles, shared by all collectors
    #[serde(default = "default_collect_interval", with = "duration")]
    pub collect_interval: Duration,
    #[serde(default)]
    pub databases: Vec<DatabaseInstance>,
    #[serde(default)]
    pub registries: Vec<RegistryInstance>,
    #[serde(default)]
    pub object_store: ObjectStoreConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            collect_interval: default_collect_interval(),
            databases: Vec::new(),
            registries: Vec::new(),
            object_store: ObjectStoreConfig::default(),
            cluster: ClusterConfig::default(),
        }
    }
}
