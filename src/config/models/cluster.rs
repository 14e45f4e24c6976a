//! Cluster API and storage provisioning configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Cluster probes (API server, DNS, etcd, storage classes)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Use the pod's service account and `KUBERNETES_SERVICE_*` variables
    #[serde(default)]
    pub in_cluster: bool,
    /// Explicit API server URL, used when not running in-cluster
    #[serde(default)]
    pub api_server: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
    /// Service name resolved by the DNS probe
    #[serde(default = "default_dns_name")]
    pub dns_name: String,
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            in_cluster: false,
            api_server: None,
            token: None,
            ca_cert_path: None,
            insecure_skip_tls_verify: false,
            dns_name: default_dns_name(),
            provisioning: ProvisioningConfig::default(),
        }
    }
}

impl std::fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("enabled", &self.enabled)
            .field("in_cluster", &self.in_cluster)
            .field("api_server", &self.api_server)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("ca_cert_path", &self.ca_cert_path)
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .field("dns_name", &self.dns_name)
            .field("provisioning", &self.provisioning)
            .finish()
    }
}

/// Storage-class functional test settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Namespace the test claims are created in
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_request_size")]
    pub request_size: String,
    #[serde(default = "default_poll_interval", with = "duration")]
    pub poll_interval: Duration,
    #[serde(default = "default_bind_timeout", with = "duration")]
    pub bind_timeout: Duration,
    /// Wait before the single status read of a deferred-binding class
    #[serde(default = "default_settle_delay", with = "duration")]
    pub settle_delay: Duration,
    #[serde(default = "default_cleanup_timeout", with = "duration")]
    pub cleanup_timeout: Duration,
    /// Budget for one storage class, cleanup excluded
    #[serde(default = "default_session_timeout", with = "duration")]
    pub session_timeout: Duration,
    #[serde(default = "default_list_timeout", with = "duration")]
    pub list_timeout: Duration,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            request_size: default_request_size(),
            poll_interval: default_poll_interval(),
            bind_timeout: default_bind_timeout(),
            settle_delay: default_settle_delay(),
            cleanup_timeout: default_cleanup_timeout(),
            session_timeout: default_session_timeout(),
            list_timeout: default_list_timeout(),
        }
    }
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_bind_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_cleanup_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_session_timeout() -> Duration {
    Duration::from_secs(45)
}

fn default_list_timeout() -> Duration {
    Duration::from_secs(60)
}
