//! Minimal cluster API client over reqwest
//!
//! Only the handful of read and claim endpoints the probes need. Credentials
//! come from the pod's service account when running in-cluster, otherwise
//! from the explicit server/token/CA settings.

use super::types::*;
use super::{ClusterApi, ProvisioningApi};
use crate::config::ClusterConfig;
use crate::utils::error::{ConsoleError, Result, error_chain};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct KubeClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl KubeClient {
    /// Build a client from configuration; failure disables the cluster collector
    pub fn from_config(config: &ClusterConfig) -> Result<Self> {
        if config.in_cluster {
            return Self::in_cluster(config.insecure_skip_tls_verify);
        }

        let server = config.api_server.as_deref().ok_or_else(|| {
            ConsoleError::cluster("not running in-cluster and no API server configured")
        })?;
        let ca = config
            .ca_cert_path
            .as_deref()
            .map(std::fs::read)
            .transpose()
            .map_err(|e| ConsoleError::cluster(format!("failed to read CA certificate: {e}")))?;

        Self::new(
            server,
            config.token.clone(),
            ca.as_deref(),
            config.insecure_skip_tls_verify,
        )
    }

    fn in_cluster(insecure: bool) -> Result<Self> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST")
            .map_err(|_| ConsoleError::cluster("KUBERNETES_SERVICE_HOST is not set"))?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

        let dir = Path::new(SERVICE_ACCOUNT_DIR);
        let token = std::fs::read_to_string(dir.join("token"))
            .map_err(|e| {
                ConsoleError::cluster(format!("failed to read service account token: {e}"))
            })?;
        let ca = std::fs::read(dir.join("ca.crt"))
            .map_err(|e| ConsoleError::cluster(format!("failed to read service account CA: {e}")))?;

        let host = if host.contains(':') {
            format!("[{host}]")
        } else {
            host
        };

        Self::new(
            &format!("https://{host}:{port}"),
            Some(token.trim().to_string()),
            Some(ca.as_slice()),
            insecure,
        )
    }

    pub fn new(
        server: &str,
        token: Option<String>,
        ca_pem: Option<&[u8]>,
        insecure: bool,
    ) -> Result<Self> {
        let base = Url::parse(server)
            .map_err(|e| ConsoleError::cluster(format!("invalid API server URL {server}: {e}")))?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .danger_accept_invalid_certs(insecure);

        if let Some(pem) = ca_pem {
            let cert = reqwest::Certificate::from_pem(pem)?;
            builder = builder.add_root_certificate(cert);
        }

        Ok(Self {
            http: builder.build()?,
            base,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn request(&self, method: Method, path: &str) -> std::result::Result<RequestBuilder, ApiError> {
        let url = endpoint(&self.base, path)?;

        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> std::result::Result<Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(error_chain(&e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<StatusWire>(&body) {
            Ok(wire) if !wire.message.is_empty() => format!("{}: {}", wire.reason, wire.message),
            _ => format!("{status}: {}", body.trim()),
        };
        Err(ApiError::status(status.as_u16(), message))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)?.query(query)).await?;
        response
            .json()
            .await
            .map_err(|e| {
                ApiError::transport(format!("invalid response from {path}: {}", error_chain(&e)))
            })
    }
}

/// `path` appended below any prefix of `base`, e.g. a proxied cluster URL
fn endpoint(base: &Url, path: &str) -> std::result::Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::transport(format!("API server URL {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

fn claim_path(namespace: &str, name: &str) -> String {
    format!("/api/v1/namespaces/{namespace}/persistentvolumeclaims/{name}")
}

#[async_trait]
impl ClusterApi for KubeClient {
    async fn server_version(&self) -> std::result::Result<VersionInfo, ApiError> {
        self.get_json("/version", &[]).await
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> std::result::Result<Vec<PodSummary>, ApiError> {
        let path = format!("/api/v1/namespaces/{namespace}/pods");
        let list: List<PodWire> = self
            .get_json(&path, &[("labelSelector", label_selector)])
            .await?;
        Ok(list.items.into_iter().map(PodSummary::from).collect())
    }

    async fn livez(&self) -> std::result::Result<(), ApiError> {
        self.send(self.request(Method::GET, "/livez")?).await?;
        Ok(())
    }

    async fn list_storage_classes(&self) -> std::result::Result<Vec<StorageClassInfo>, ApiError> {
        let list: List<StorageClassWire> = self
            .get_json("/apis/storage.k8s.io/v1/storageclasses", &[])
            .await?;
        Ok(list.items.into_iter().map(StorageClassInfo::from).collect())
    }
}

#[async_trait]
impl ProvisioningApi for KubeClient {
    async fn create_claim(&self, request: &ClaimRequest) -> std::result::Result<(), ApiError> {
        let path = format!(
            "/api/v1/namespaces/{}/persistentvolumeclaims",
            request.namespace
        );
        let builder = self
            .request(Method::POST, &path)?
            .json(&request.to_manifest());
        self.send(builder).await?;
        debug!(claim = %request.name, namespace = %request.namespace, "claim submitted");
        Ok(())
    }

    async fn claim_phase(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<ClaimPhase, ApiError> {
        let claim: ClaimWire = self.get_json(&claim_path(namespace, name), &[]).await?;
        Ok(ClaimPhase::from_api(
            claim.status.as_ref().and_then(|s| s.phase.as_deref()),
        ))
    }

    async fn delete_claim(&self, namespace: &str, name: &str) -> std::result::Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &claim_path(namespace, name))?)
            .await?;
        Ok(())
    }
}
