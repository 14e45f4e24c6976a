//! S3-compatible object store configuration

use super::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    /// `host:port` or full URL; the probe is skipped when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key: String::new(),
            secret_key: String::new(),
            use_ssl: false,
            region: default_region(),
        }
    }
}

impl ObjectStoreConfig {
    pub fn is_configured(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    /// Endpoint URL with a scheme derived from `use_ssl` when missing
    pub fn endpoint_url(&self) -> Option<String> {
        let endpoint = self.endpoint.as_deref()?.trim();
        if endpoint.is_empty() {
            return None;
        }
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Some(endpoint.to_string());
        }
        let scheme = if self.use_ssl { "https" } else { "http" };
        Some(format!("{scheme}://{endpoint}"))
    }
}

impl std::fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("use_ssl", &self.use_ssl)
            .field("region", &self.region)
            .finish()
    }
}
