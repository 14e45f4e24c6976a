//! Configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use std::collections::HashSet;
use tracing::{debug, warn};

impl Validate for ConsoleConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating console configuration");

        self.server.validate()?;

        if self.collect_interval.is_zero() {
            return Err("Collect interval must be greater than 0".to_string());
        }

        let mut names = HashSet::new();
        for database in &self.databases {
            if !names.insert(&database.name) {
                return Err(format!("Duplicate database instance name: {}", database.name));
            }
            database.validate()?;
        }

        let mut names = HashSet::new();
        for registry in &self.registries {
            if !names.insert(&registry.name) {
                return Err(format!("Duplicate registry instance name: {}", registry.name));
            }
            registry.validate()?;
        }

        self.object_store.validate()?;
        self.cluster.validate()?;

        debug!("Console configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for DatabaseInstance {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Database instance name cannot be empty".to_string());
        }
        if self.host.trim().is_empty() {
            return Err(format!("Database instance {} has no host", self.name));
        }
        if self.port == 0 {
            return Err(format!("Database instance {} has port 0", self.name));
        }
        Ok(())
    }
}

impl Validate for RegistryInstance {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Registry instance name cannot be empty".to_string());
        }
        url::Url::parse(&self.api_url())
            .map_err(|e| format!("Registry {} has an invalid URL: {}", self.name, e))?;

        if self.insecure {
            warn!(registry = %self.name, "TLS verification disabled for registry");
        }
        Ok(())
    }
}

impl Validate for ObjectStoreConfig {
    fn validate(&self) -> Result<(), String> {
        let Some(endpoint) = self.endpoint_url() else {
            return Ok(());
        };

        url::Url::parse(&endpoint)
            .map_err(|e| format!("Invalid object store endpoint {endpoint}: {e}"))?;

        if self.access_key.is_empty() || self.secret_key.is_empty() {
            warn!("Object store endpoint configured without credentials");
        }
        Ok(())
    }
}

impl Validate for ClusterConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(server) = &self.api_server {
            url::Url::parse(server).map_err(|e| format!("Invalid cluster API server URL: {e}"))?;
        }
        if self.dns_name.trim().is_empty() {
            return Err("Cluster DNS name cannot be empty".to_string());
        }
        self.provisioning.validate()
    }
}

impl Validate for ProvisioningConfig {
    fn validate(&self) -> Result<(), String> {
        if self.namespace.trim().is_empty() {
            return Err("Provisioning namespace cannot be empty".to_string());
        }
        if self.poll_interval.is_zero() {
            return Err("Provisioning poll interval must be greater than 0".to_string());
        }
        if self.bind_timeout < self.poll_interval {
            return Err("Provisioning bind timeout must be at least one poll interval".to_string());
        }
        if self.cleanup_timeout.is_zero() {
            return Err("Provisioning cleanup timeout must be greater than 0".to_string());
        }
        if self.session_timeout < self.settle_delay {
            return Err("Provisioning session timeout is shorter than the settle delay".to_string());
        }
        Ok(())
    }
}
