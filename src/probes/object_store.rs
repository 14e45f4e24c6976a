//! S3-compatible object store reachability via ListBuckets

use super::{EntityKey, Probe, ProbeContext, ProbeOutcome};
use crate::classify::{Classifier, OBJECT_STORE};
use crate::config::ObjectStoreConfig;
use crate::monitoring::catalog::ProbeKind;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

pub const OBJECT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectStoreError {
    /// The client could not be configured
    #[error("client creation failed: {0}")]
    Client(String),
    /// The ListBuckets call failed
    #[error("{0}")]
    Request(String),
}

impl ObjectStoreError {
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Client(_) => "client_creation_failed",
            Self::Request(_) => "unreachable",
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Number of buckets visible to the configured credentials
    async fn list_buckets(&self) -> Result<usize, ObjectStoreError>;
}

/// [`ObjectStoreClient`] over `aws-sdk-s3` with static credentials
pub struct S3Client {
    client: aws_sdk_s3::Client,
}

impl S3Client {
    pub fn new(config: &ObjectStoreConfig) -> Result<Self, ObjectStoreError> {
        let endpoint = config
            .endpoint_url()
            .ok_or_else(|| ObjectStoreError::Client("no endpoint configured".to_string()))?;
        url::Url::parse(&endpoint)
            .map_err(|e| ObjectStoreError::Client(format!("invalid endpoint {endpoint}: {e}")))?;

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "health-console",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl ObjectStoreClient for S3Client {
    async fn list_buckets(&self) -> Result<usize, ObjectStoreError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| ObjectStoreError::Request(DisplayErrorContext(&e).to_string()))?;

        Ok(output.buckets().len())
    }
}

/// Probe for the single configured object store
pub struct ObjectStoreProbe {
    client: Result<Arc<dyn ObjectStoreClient>, ObjectStoreError>,
}

impl ObjectStoreProbe {
    pub fn new(config: &ObjectStoreConfig) -> Self {
        let client = S3Client::new(config).map(|c| Arc::new(c) as Arc<dyn ObjectStoreClient>);
        Self { client }
    }

    pub fn with_client(client: Arc<dyn ObjectStoreClient>) -> Self {
        Self { client: Ok(client) }
    }
}

#[async_trait]
impl Probe for ObjectStoreProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::OBJECT_STORE
    }

    fn entity(&self) -> EntityKey {
        EntityKey::singleton()
    }

    fn timeout(&self) -> Duration {
        OBJECT_STORE_TIMEOUT
    }

    async fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let client = match &self.client {
            Ok(client) => client,
            Err(e) => {
                return ProbeOutcome::unhealthy(
                    OBJECT_STORE.classify(Some(e.to_string().as_str())),
                    e.error_type(),
                    e.to_string(),
                );
            }
        };

        match ctx.call(client.list_buckets()).await {
            Ok(Ok(count)) => {
                debug!(buckets = count, "object store listed buckets");
                ProbeOutcome::Healthy
            }
            Ok(Err(e)) => ProbeOutcome::unhealthy(
                OBJECT_STORE.classify(Some(e.to_string().as_str())),
                e.error_type(),
                e.to_string(),
            ),
            Err(interrupted) => ProbeOutcome::interrupted(interrupted, "unreachable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorCategory;
    use crate::probes::{CancelSignal, run_probe};

    #[test]
    fn test_client_requires_endpoint() {
        let err = S3Client::new(&ObjectStoreConfig::default()).err().unwrap();
        assert_eq!(err.error_type(), "client_creation_failed");
    }

    #[tokio::test]
    async fn test_invalid_endpoint_reports_client_failure() {
        let config = ObjectStoreConfig {
            endpoint: Some("http://[::1".to_string()),
            ..Default::default()
        };
        let probe = ObjectStoreProbe::new(&config);
        let result = run_probe(&probe, CancelSignal::never()).await;

        assert!(!result.healthy);
        assert_eq!(result.error_type.as_deref(), Some("client_creation_failed"));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let mut client = MockObjectStoreClient::new();
        client.expect_list_buckets().returning(|| {
            Err(ObjectStoreError::Request(
                "service error: unhandled error (InvalidAccessKeyId)".to_string(),
            ))
        });

        let probe = ObjectStoreProbe::with_client(Arc::new(client));
        let result = run_probe(&probe, CancelSignal::never()).await;

        assert_eq!(result.category, ErrorCategory::AuthFailed);
        assert_eq!(result.error_type.as_deref(), Some("unreachable"));
    }

    #[tokio::test]
    async fn test_empty_store_is_healthy() {
        let mut client = MockObjectStoreClient::new();
        client.expect_list_buckets().times(1).returning(|| Ok(0));

        let probe = ObjectStoreProbe::with_client(Arc::new(client));
        let result = run_probe(&probe, CancelSignal::never()).await;

        assert!(result.healthy);
        assert!(probe.entity().is_singleton());
    }
}
