//! Cluster API client against a mock API server

#[cfg(test)]
mod tests {
    use health_console::probes::cluster::{
        BindingMode, ClaimPhase, ClaimRequest, ClusterApi, KubeClient, ProvisioningApi,
    };
    use health_console::ErrorCategory;
    use serde_json::json;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> KubeClient {
        KubeClient::new(&server.uri(), Some("s3cr3t".to_string()), None, false).unwrap()
    }

    #[tokio::test]
    async fn test_server_version_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version"))
            .and(header("authorization", "Bearer s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "major": "1",
                "minor": "29",
                "gitVersion": "v1.29.3",
                "platform": "linux/amd64"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let version = client(&server).server_version().await.unwrap();
        assert_eq!(version.git_version, "v1.29.3");
        assert_eq!(version.minor, "29");
    }

    #[tokio::test]
    async fn test_proxied_server_keeps_path_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/k8s/clusters/c-1/version"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "gitVersion": "v1.28.9" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let proxied = format!("{}/k8s/clusters/c-1", server.uri());
        let client = KubeClient::new(&proxied, None, None, false).unwrap();

        let version = client.server_version().await.unwrap();
        assert_eq!(version.git_version, "v1.28.9");
    }

    #[tokio::test]
    async fn test_internal_error_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "kind": "Status",
                "status": "Failure",
                "reason": "InternalError",
                "message": "Internal error occurred: etcdserver: leader changed",
                "code": 500
            })))
            .mount(&server)
            .await;

        let err = client(&server).server_version().await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert_eq!(err.category(), ErrorCategory::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn test_list_pods_by_selector() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/kube-system/pods"))
            .and(query_param("labelSelector", "k8s-app=kube-dns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "PodList",
                "items": [
                    {
                        "metadata": { "name": "coredns-a" },
                        "status": {
                            "phase": "Running",
                            "conditions": [{ "type": "Ready", "status": "True" }]
                        }
                    },
                    {
                        "metadata": { "name": "coredns-b" },
                        "status": { "phase": "Pending" }
                    }
                ]
            })))
            .mount(&server)
            .await;

        let pods = client(&server)
            .list_pods("kube-system", "k8s-app=kube-dns")
            .await
            .unwrap();
        assert_eq!(pods.len(), 2);
        assert!(pods[0].is_serving());
        assert!(!pods[1].is_running());
    }

    #[tokio::test]
    async fn test_status_errors_carry_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/storage.k8s.io/v1/storageclasses"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "kind": "Status",
                "status": "Failure",
                "reason": "Forbidden",
                "message": "storageclasses.storage.k8s.io is forbidden",
                "code": 403
            })))
            .mount(&server)
            .await;

        let err = client(&server).list_storage_classes().await.unwrap_err();
        assert_eq!(err.status, Some(403));
        assert_eq!(err.message, "Forbidden: storageclasses.storage.k8s.io is forbidden");
    }

    #[tokio::test]
    async fn test_storage_class_binding_modes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/storage.k8s.io/v1/storageclasses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "metadata": { "name": "rbd" }, "provisioner": "rbd.csi.ceph.com" },
                    {
                        "metadata": { "name": "local-path" },
                        "provisioner": "rancher.io/local-path",
                        "volumeBindingMode": "WaitForFirstConsumer"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let classes = client(&server).list_storage_classes().await.unwrap();
        assert_eq!(classes[0].binding_mode, BindingMode::Immediate);
        assert_eq!(classes[1].name, "local-path");
        assert_eq!(classes[1].binding_mode, BindingMode::DeferredUntilConsumed);
    }

    #[tokio::test]
    async fn test_claim_lifecycle() {
        let server = MockServer::start().await;
        let claims = "/api/v1/namespaces/rbd-system/persistentvolumeclaims";

        Mock::given(method("POST"))
            .and(path(claims))
            .and(body_partial_json(json!({
                "metadata": { "name": "health-check-test-rbd-1" },
                "spec": { "storageClassName": "rbd" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{claims}/health-check-test-rbd-1")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": { "phase": "Bound" } })),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{claims}/health-check-test-rbd-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let request = ClaimRequest {
            name: "health-check-test-rbd-1".to_string(),
            namespace: "rbd-system".to_string(),
            storage_class: "rbd".to_string(),
            size: "1Mi".to_string(),
            labels: BTreeMap::new(),
        };

        client.create_claim(&request).await.unwrap();
        assert_eq!(
            client
                .claim_phase("rbd-system", "health-check-test-rbd-1")
                .await
                .unwrap(),
            ClaimPhase::Bound
        );
        client
            .delete_claim("rbd-system", "health-check-test-rbd-1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_claim_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "kind": "Status",
                "reason": "NotFound",
                "message": "persistentvolumeclaims \"gone\" not found",
                "code": 404
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .delete_claim("rbd-system", "gone")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_livez_failure_body_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/livez"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string("[-]etcd failed: reason withheld\n"),
            )
            .mount(&server)
            .await;

        let err = client(&server).livez().await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert!(err.message.contains("etcd failed"));
    }
}
