//! Image registry reachability via `GET /v2/`

use super::{EntityKey, Probe, ProbeContext, ProbeOutcome};
use crate::classify::{ErrorCategory, HttpStatusClassifier, REGISTRY};
use crate::config::RegistryInstance;
use crate::monitoring::catalog::ProbeKind;
use crate::utils::error::error_chain;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

pub const REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

/// Probe for one configured registry
///
/// 200 and 401 both prove the v2 API is serving; anything else is
/// classified by status code.
pub struct RegistryProbe {
    instance: RegistryInstance,
    url: String,
}

impl RegistryProbe {
    pub fn new(instance: RegistryInstance) -> Self {
        let url = instance.api_url();
        Self { instance, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(REGISTRY_TIMEOUT)
            .danger_accept_invalid_certs(self.instance.insecure)
            .build()
    }

    fn request(&self, client: &reqwest::Client) -> reqwest::Result<reqwest::Request> {
        let mut builder = client.get(&self.url);
        if let Some((user, password)) = self.instance.credentials() {
            builder = builder.basic_auth(user, Some(password));
        }
        builder.build()
    }
}

#[async_trait]
impl Probe for RegistryProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::REGISTRY
    }

    fn entity(&self) -> EntityKey {
        EntityKey::singleton()
            .with("instance", &self.instance.name)
            .with("url", &self.url)
    }

    fn timeout(&self) -> Duration {
        REGISTRY_TIMEOUT
    }

    async fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                return ProbeOutcome::unhealthy(
                    REGISTRY.classify_error(&e),
                    "request_failed",
                    e.to_string(),
                );
            }
        };
        let request = match self.request(&client) {
            Ok(request) => request,
            Err(e) => {
                return ProbeOutcome::unhealthy(
                    ErrorCategory::Unknown,
                    "request_failed",
                    e.to_string(),
                );
            }
        };

        let response = match ctx.call(client.execute(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return ProbeOutcome::unhealthy(
                    REGISTRY.classify_error(&e),
                    "unreachable",
                    error_chain(&e),
                );
            }
            Err(interrupted) => return ProbeOutcome::interrupted(interrupted, "unreachable"),
        };

        match response.status() {
            StatusCode::OK | StatusCode::UNAUTHORIZED => ProbeOutcome::Healthy,
            status => ProbeOutcome::unhealthy(
                HttpStatusClassifier.status(status.as_u16()),
                format!("status_{}", status.as_u16()),
                format!("unexpected status {status}"),
            ),
        }
    }
}
