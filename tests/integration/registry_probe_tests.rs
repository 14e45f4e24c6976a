//! Registry probe against a mock `/v2/` endpoint

#[cfg(test)]
mod tests {
    use health_console::config::RegistryInstance;
    use health_console::probes::registry::RegistryProbe;
    use health_console::probes::{CancelSignal, run_probe};
    use health_console::{ErrorCategory, Probe};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn registry_answering(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_ok_is_healthy() {
        let server = registry_answering(200).await;
        let probe = RegistryProbe::new(RegistryInstance::new("hub", server.uri()));

        let result = run_probe(&probe, CancelSignal::never()).await;
        assert!(result.healthy);
        assert_eq!(result.error_type, None);
    }

    #[tokio::test]
    async fn test_unauthorized_is_healthy() {
        let server = registry_answering(401).await;
        let probe = RegistryProbe::new(RegistryInstance::new("hub", server.uri()));

        let result = run_probe(&probe, CancelSignal::never()).await;
        assert!(result.healthy);
    }

    #[tokio::test]
    async fn test_unavailable_is_classified_by_status() {
        let server = registry_answering(503).await;
        let probe = RegistryProbe::new(RegistryInstance::new("hub", server.uri()));

        let result = run_probe(&probe, CancelSignal::never()).await;
        assert_eq!(result.category, ErrorCategory::UpstreamUnavailable);
        assert_eq!(result.error_type.as_deref(), Some("status_503"));
    }

    #[tokio::test]
    async fn test_forbidden() {
        let server = registry_answering(403).await;
        let probe = RegistryProbe::new(RegistryInstance::new("hub", server.uri()));

        let result = run_probe(&probe, CancelSignal::never()).await;
        assert_eq!(result.category, ErrorCategory::Forbidden);
        assert_eq!(result.error_type.as_deref(), Some("status_403"));
    }

    #[tokio::test]
    async fn test_credentials_sent_as_basic_auth() {
        let server = MockServer::start().await;
        // admin:secret
        Mock::given(method("GET"))
            .and(path("/v2/"))
            .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut instance = RegistryInstance::new("hub", server.uri());
        instance.user = Some("admin".to_string());
        instance.password = Some("secret".to_string());

        let result = run_probe(&RegistryProbe::new(instance), CancelSignal::never()).await;
        assert!(result.healthy);
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let probe = RegistryProbe::new(RegistryInstance::new("hub", uri));
        let result = run_probe(&probe, CancelSignal::never()).await;

        assert!(!result.healthy);
        assert_eq!(result.error_type.as_deref(), Some("unreachable"));
        assert_eq!(result.category, ErrorCategory::ConnectionRefused);
    }

    #[test]
    fn test_entity_uses_normalised_url() {
        let probe = RegistryProbe::new(RegistryInstance::new("hub", "goodrain.me"));
        let entity = probe.entity();
        assert_eq!(entity.get("instance"), Some("hub"));
        assert_eq!(entity.get("url"), Some("https://goodrain.me/v2/"));
    }
}
