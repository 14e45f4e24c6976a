//! Cluster collector over the real client and a mock API server

#[cfg(test)]
mod tests {
    use crate::common::{FixedResolver, metrics};
    use health_console::collectors::cluster_collector_with;
    use health_console::config::ConsoleConfig;
    use health_console::probes::cluster::KubeClient;
    use health_console::{Collector, ProbeMetrics};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CLAIM_PATH: &str =
        r"^/api/v1/namespaces/rbd-system/persistentvolumeclaims/health-check-test-[a-z-]+-\d+$";

    fn collector(uri: &str, metrics: Arc<ProbeMetrics>) -> Collector {
        let mut config = ConsoleConfig::default();
        config.cluster.provisioning.settle_delay = Duration::from_millis(10);

        let client = Arc::new(KubeClient::new(uri, None, None, false).unwrap());
        cluster_collector_with(
            &config,
            metrics,
            client.clone(),
            client,
            Arc::new(FixedResolver(Ok(1))),
        )
    }

    fn storage_classes(names: &[&str]) -> Value {
        let items: Vec<Value> = names
            .iter()
            .map(|name| {
                json!({
                    "metadata": { "name": name },
                    "provisioner": "rancher.io/local-path",
                    "volumeBindingMode": "WaitForFirstConsumer"
                })
            })
            .collect();
        json!({ "items": items })
    }

    async fn healthy_cluster() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/version"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "gitVersion": "v1.29.3" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/kube-system/pods"))
            .and(query_param("labelSelector", "k8s-app=kube-dns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "metadata": { "name": "coredns-a" },
                    "status": {
                        "phase": "Running",
                        "conditions": [{ "type": "Ready", "status": "True" }]
                    }
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/kube-system/pods"))
            .and(query_param("labelSelector", "component=etcd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/livez"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/namespaces/rbd-system/persistentvolumeclaims"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(CLAIM_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": { "phase": "Pending" } })),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path_regex(CLAIM_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        server
    }

    async fn deletes(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.method.as_str() == "DELETE")
            .count()
    }

    #[tokio::test]
    async fn test_healthy_cluster() {
        let server = healthy_cluster().await;
        Mock::given(method("GET"))
            .and(path("/apis/storage.k8s.io/v1/storageclasses"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(storage_classes(&["local-path"])),
            )
            .mount(&server)
            .await;

        let (sink, metrics) = metrics();
        collector(&server.uri(), metrics).run_cycle().await;

        for gauge in ["kubernetes_apiserver_up", "coredns_up", "etcd_up"] {
            assert_eq!(
                sink.value(gauge, &[("error_reason", "healthy")]),
                Some(1.0),
                "{gauge}"
            );
        }
        assert_eq!(
            sink.value(
                "cluster_storage_up",
                &[("storage_class", "local-path"), ("error_reason", "healthy")]
            ),
            Some(1.0)
        );
        assert_eq!(deletes(&server).await, 1);
    }

    #[tokio::test]
    async fn test_vanished_storage_class_is_pruned() {
        let server = healthy_cluster().await;
        Mock::given(method("GET"))
            .and(path("/apis/storage.k8s.io/v1/storageclasses"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(storage_classes(&["local-path", "nfs"])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/apis/storage.k8s.io/v1/storageclasses"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(storage_classes(&["local-path"])),
            )
            .mount(&server)
            .await;

        let (sink, metrics) = metrics();
        let collector = collector(&server.uri(), metrics);

        collector.run_cycle().await;
        assert_eq!(sink.series("cluster_storage_up").len(), 2);

        collector.run_cycle().await;
        let series = sink.series("cluster_storage_up");
        assert_eq!(series.len(), 1);
        assert!(
            series[0]
                .iter()
                .any(|(name, value)| name == "storage_class" && value == "local-path")
        );
        assert_eq!(deletes(&server).await, 3);
    }

    #[tokio::test]
    async fn test_unreachable_api_server() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let (sink, metrics) = metrics();
        collector(&uri, metrics).run_cycle().await;

        assert_eq!(
            sink.value("kubernetes_apiserver_up", &[("error_reason", "connection_refused")]),
            Some(0.0)
        );
        assert_eq!(
            sink.value(
                "cluster_storage_up",
                &[("storage_class", "default"), ("error_reason", "connection_refused")]
            ),
            Some(0.0)
        );
        for (collector, error_type) in [
            ("kubernetes_apiserver", "unreachable"),
            ("coredns", "list_failed"),
            ("etcd", "list_failed"),
            ("storage_class", "list_failed"),
        ] {
            assert_eq!(
                sink.value(
                    "health_check_errors_total",
                    &[("collector", collector), ("error_type", error_type)]
                ),
                Some(1.0),
                "{collector}/{error_type}"
            );
        }
    }
}
