//! Database collector driven end to end through the Prometheus sink

#[cfg(test)]
mod tests {
    use crate::common::{FakeConnector, metrics};
    use health_console::collectors::database_collector_with;
    use health_console::config::{ConsoleConfig, DatabaseInstance};
    use health_console::probes::database::{DatabaseFailure, DatabaseStage};
    use std::sync::Arc;

    fn config() -> ConsoleConfig {
        ConsoleConfig {
            databases: vec![
                DatabaseInstance::new("region-db", "10.0.0.1"),
                DatabaseInstance::new("console-db", "10.0.0.2"),
            ],
            ..Default::default()
        }
    }

    fn wrong_password() -> FakeConnector {
        FakeConnector::default().failing(
            "10.0.0.2",
            DatabaseFailure::new(
                DatabaseStage::Connect,
                "Access denied for user 'root'@'10.0.0.9' (using password: YES)",
            ),
        )
    }

    // ==================== End-to-end ====================

    #[tokio::test]
    async fn test_reachable_and_rejected_instances() {
        let (sink, metrics) = metrics();
        let connector = Arc::new(wrong_password());
        let collector = database_collector_with(&config(), metrics, connector.clone())
            .expect("two databases configured");

        collector.run_cycle().await;

        assert_eq!(
            sink.value(
                "mysql_up",
                &[
                    ("instance", "region-db"),
                    ("host", "10.0.0.1"),
                    ("port", "3306"),
                    ("error_reason", "healthy"),
                ]
            ),
            Some(1.0)
        );
        assert_eq!(
            sink.value(
                "mysql_up",
                &[
                    ("instance", "console-db"),
                    ("host", "10.0.0.2"),
                    ("port", "3306"),
                    ("error_reason", "auth_failed"),
                ]
            ),
            Some(0.0)
        );
        assert_eq!(
            sink.value(
                "health_check_errors_total",
                &[("collector", "database"), ("error_type", "connection_failed")]
            ),
            Some(1.0)
        );
        assert_eq!(
            sink.value("health_check_duration_seconds", &[("collector", "database")]),
            Some(2.0)
        );

        let mut calls = connector.calls();
        calls.sort();
        assert_eq!(calls, vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[tokio::test]
    async fn test_recovery_replaces_failure_series() {
        let (sink, metrics) = metrics();
        let config = ConsoleConfig {
            databases: vec![DatabaseInstance::new("console-db", "10.0.0.2")],
            ..Default::default()
        };

        let failing = database_collector_with(&config, metrics.clone(), Arc::new(wrong_password()))
            .expect("one database configured");
        failing.run_cycle().await;
        assert_eq!(sink.series("mysql_up").len(), 1);

        let recovered =
            database_collector_with(&config, metrics, Arc::new(FakeConnector::default()))
                .expect("one database configured");
        recovered.run_cycle().await;

        let series = sink.series("mysql_up");
        assert_eq!(series.len(), 1);
        assert!(
            series[0]
                .iter()
                .any(|(name, value)| name == "error_reason" && value == "healthy")
        );
    }

    #[tokio::test]
    async fn test_ping_failure_is_counted_separately() {
        let (sink, metrics) = metrics();
        let connector = FakeConnector::default().failing(
            "10.0.0.1",
            DatabaseFailure::new(
                DatabaseStage::Ping,
                "Lost connection to MySQL server during query",
            ),
        );
        let collector = database_collector_with(&config(), metrics, Arc::new(connector))
            .expect("two databases configured");

        collector.run_cycle().await;

        assert_eq!(
            sink.value(
                "health_check_errors_total",
                &[("collector", "database"), ("error_type", "ping_failed")]
            ),
            Some(1.0)
        );
        assert_eq!(
            sink.value(
                "mysql_up",
                &[
                    ("instance", "region-db"),
                    ("host", "10.0.0.1"),
                    ("port", "3306"),
                    ("error_reason", "connection_error"),
                ]
            ),
            Some(0.0)
        );
    }
}
