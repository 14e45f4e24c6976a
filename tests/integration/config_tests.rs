//! Configuration loading from files and environment lookups

#[cfg(test)]
mod tests {
    use health_console::Config;
    use health_console::config::{ConsoleConfig, LogFormat};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use tokio_test::{assert_err, assert_ok};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn write_yaml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_shipped_example_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/console.yaml.example");
        let config = assert_ok!(Config::from_file(&path).await);

        assert_eq!(config.databases().len(), 1);
        assert_eq!(config.registries().len(), 1);
        assert!(config.object_store().is_configured());
        assert!(config.cluster().in_cluster);
        assert_eq!(config.console.collect_interval, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_minimal_file_uses_defaults() {
        let file = write_yaml("databases:\n  - name: region\n    host: rbd-db\n");
        let config = assert_ok!(Config::from_file(file.path()).await);

        assert_eq!(config.server().port, 9090);
        assert_eq!(config.logging().format, LogFormat::Text);
        assert_eq!(config.databases()[0].port, 3306);
        assert!(config.cluster().enabled);
        assert!(!config.object_store().is_configured());
    }

    #[tokio::test]
    async fn test_duplicate_instance_names_are_rejected() {
        let file = write_yaml(
            "databases:\n  - name: region\n    host: a\n  - name: region\n    host: b\n",
        );
        assert_err!(Config::from_file(file.path()).await);
    }

    #[tokio::test]
    async fn test_bind_timeout_shorter_than_poll_is_rejected() {
        let file = write_yaml(
            "cluster:\n  provisioning:\n    poll_interval: 5s\n    bind_timeout: 1s\n",
        );
        assert_err!(Config::from_file(file.path()).await);
    }

    #[tokio::test]
    async fn test_yaml_output_loads_back() {
        let config = Config {
            console: assert_ok!(ConsoleConfig::from_lookup(lookup(&[
                ("METRICS_PORT", "9191"),
                ("LOG_FORMAT", "json"),
                ("DB_1_NAME", "region"),
                ("DB_1_HOST", "rbd-db"),
                ("REGISTRY_1_NAME", "hub"),
                ("REGISTRY_1_URL", "goodrain.me"),
                ("CLUSTER_ENABLED", "false"),
            ]))),
        };

        let file = write_yaml(&assert_ok!(config.to_yaml()));
        let loaded = assert_ok!(Config::from_file(file.path()).await);
        assert_eq!(loaded.console, config.console);
    }

    #[test]
    fn test_environment_errors() {
        assert_err!(ConsoleConfig::from_lookup(lookup(&[("COLLECT_INTERVAL", "soon")])));
        assert_err!(ConsoleConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])));
        assert_err!(ConsoleConfig::from_lookup(lookup(&[("CLUSTER_ENABLED", "maybe")])));
    }
}
