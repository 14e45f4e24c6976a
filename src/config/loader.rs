//! Configuration loading from environment variables
//!
//! Variable names follow the deployment manifests the console ships with:
//! indexed instances (`DB_1_*`, `DB_2_*`, `REGISTRY_1_*`, ...) are read
//! upward from 1 and stop at the first index missing its required keys.

use super::models::*;
use crate::utils::error::{ConsoleError, Result};
use std::str::FromStr;
use tracing::debug;

impl ConsoleConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Loading configuration from environment variables");
        let env = Lookup(lookup);
        let mut config = Self::default();

        if let Some(host) = env.get("METRICS_HOST") {
            config.server.host = host;
        }
        if let Some(port) = env.parse::<u16>("METRICS_PORT")? {
            config.server.port = port;
        }
        if let Some(interval) = env.get("COLLECT_INTERVAL") {
            config.collect_interval = duration::parse(&interval)
                .map_err(|e| ConsoleError::config(format!("Invalid COLLECT_INTERVAL: {e}")))?;
        }

        if let Some(level) = env.get("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = env.get("LOG_FORMAT") {
            config.logging.format = LogFormat::from_str(&format).map_err(ConsoleError::config)?;
        }

        config.databases = load_databases(&env)?;
        config.registries = load_registries(&env)?;

        config.object_store.endpoint = env.get("MINIO_ENDPOINT");
        if let Some(key) = env.get("MINIO_ACCESS_KEY") {
            config.object_store.access_key = key;
        }
        if let Some(secret) = env.get("MINIO_SECRET_KEY") {
            config.object_store.secret_key = secret;
        }
        config.object_store.use_ssl = env.flag("MINIO_USE_SSL");
        if let Some(region) = env.get("MINIO_REGION") {
            config.object_store.region = region;
        }

        if let Some(enabled) = env.parse::<bool>("CLUSTER_ENABLED")? {
            config.cluster.enabled = enabled;
        }
        config.cluster.in_cluster = env.flag("IN_CLUSTER");
        config.cluster.api_server = env.get("CLUSTER_API_SERVER");
        config.cluster.token = env.get("CLUSTER_TOKEN");
        config.cluster.ca_cert_path = env.get("CLUSTER_CA_CERT").map(Into::into);
        config.cluster.insecure_skip_tls_verify = env.flag("CLUSTER_INSECURE");
        if let Some(namespace) = env.get("CLUSTER_NAMESPACE") {
            config.cluster.provisioning.namespace = namespace;
        }
        if let Some(name) = env.get("CLUSTER_DNS_NAME") {
            config.cluster.dns_name = name;
        }

        debug!(
            databases = config.databases.len(),
            registries = config.registries.len(),
            "Configuration loaded from environment variables"
        );
        Ok(config)
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-empty value of `key`
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|e| ConsoleError::config(format!("Invalid {key}: {e}")))
            })
            .transpose()
    }

    /// `true` only for the literal value `true`
    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.trim() == "true")
    }
}

fn load_databases<F>(env: &Lookup<F>) -> Result<Vec<DatabaseInstance>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut databases = Vec::new();

    for index in 1.. {
        let prefix = format!("DB_{index}");
        let (Some(name), Some(host)) = (
            env.get(&format!("{prefix}_NAME")),
            env.get(&format!("{prefix}_HOST")),
        ) else {
            break;
        };

        let mut instance = DatabaseInstance::new(name, host);
        if let Some(port) = env.parse::<u16>(&format!("{prefix}_PORT"))? {
            instance.port = port;
        }
        if let Some(user) = env.get(&format!("{prefix}_USER")) {
            instance.user = user;
        }
        if let Some(password) = env.get(&format!("{prefix}_PASSWORD")) {
            instance.password = password;
        }
        if let Some(database) = env.get(&format!("{prefix}_DATABASE")) {
            instance.database = database;
        }
        databases.push(instance);
    }

    Ok(databases)
}

fn load_registries<F>(env: &Lookup<F>) -> Result<Vec<RegistryInstance>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut registries = Vec::new();

    for index in 1.. {
        let prefix = format!("REGISTRY_{index}");
        let (Some(name), Some(url)) = (
            env.get(&format!("{prefix}_NAME")),
            env.get(&format!("{prefix}_URL")),
        ) else {
            break;
        };

        let mut instance = RegistryInstance::new(name, url);
        instance.user = env.get(&format!("{prefix}_USER"));
        instance.password = env.get(&format!("{prefix}_PASSWORD"));
        instance.insecure = env.flag(&format!("{prefix}_INSECURE"));
        registries.push(instance);
    }

    Ok(registries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = ConsoleConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.collect_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_indexed_databases_stop_at_gap() {
        let config = ConsoleConfig::from_lookup(lookup(&[
            ("DB_1_NAME", "primary"),
            ("DB_1_HOST", "10.0.0.1"),
            ("DB_1_PASSWORD", "secret"),
            ("DB_2_NAME", "replica"),
            ("DB_2_HOST", "10.0.0.2"),
            ("DB_2_PORT", "3307"),
            ("DB_2_DATABASE", "region"),
            ("DB_4_NAME", "orphan"),
            ("DB_4_HOST", "10.0.0.4"),
        ]))
        .unwrap();

        assert_eq!(config.databases.len(), 2);
        assert_eq!(config.databases[0].port, 3306);
        assert_eq!(config.databases[0].user, "root");
        assert_eq!(config.databases[0].password, "secret");
        assert_eq!(config.databases[1].port, 3307);
        assert_eq!(config.databases[1].database, "region");
    }

    #[test]
    fn test_database_without_host_ends_list() {
        let config =
            ConsoleConfig::from_lookup(lookup(&[("DB_1_NAME", "primary")])).unwrap();
        assert!(config.databases.is_empty());
    }

    #[test]
    fn test_registries_and_minio() {
        let config = ConsoleConfig::from_lookup(lookup(&[
            ("REGISTRY_1_NAME", "hub"),
            ("REGISTRY_1_URL", "goodrain.me"),
            ("REGISTRY_1_INSECURE", "true"),
            ("MINIO_ENDPOINT", "minio:9000"),
            ("MINIO_ACCESS_KEY", "ak"),
            ("MINIO_SECRET_KEY", "sk"),
            ("MINIO_USE_SSL", "false"),
            ("COLLECT_INTERVAL", "1m"),
            ("IN_CLUSTER", "true"),
        ]))
        .unwrap();

        assert_eq!(config.registries.len(), 1);
        assert!(config.registries[0].insecure);
        assert_eq!(config.registries[0].credentials(), None);
        assert_eq!(
            config.object_store.endpoint_url().as_deref(),
            Some("http://minio:9000")
        );
        assert_eq!(config.collect_interval, Duration::from_secs(60));
        assert!(config.cluster.in_cluster);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = ConsoleConfig::from_lookup(lookup(&[("METRICS_PORT", "ninety")])).unwrap_err();
        assert!(matches!(err, ConsoleError::Config(msg) if msg.contains("METRICS_PORT")));
    }

    #[test]
    fn test_invalid_interval_is_config_error() {
        let err =
            ConsoleConfig::from_lookup(lookup(&[("COLLECT_INTERVAL", "soon")])).unwrap_err();
        assert!(matches!(err, ConsoleError::Config(_)));
    }

    #[test]
    fn test_compound_interval() {
        let config =
            ConsoleConfig::from_lookup(lookup(&[("COLLECT_INTERVAL", "1m30s")])).unwrap();
        assert_eq!(config.collect_interval, Duration::from_secs(90));
    }
}
