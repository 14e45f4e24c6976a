//! Container image registry configuration

use serde::{Deserialize, Serialize};

/// One image registry to probe
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryInstance {
    /// Value of the `instance` label
    pub name: String,
    /// Registry address, with or without scheme and `/v2/` suffix
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Use plain HTTP and skip certificate verification
    #[serde(default)]
    pub insecure: bool,
}

impl RegistryInstance {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            user: None,
            password: None,
            insecure: false,
        }
    }

    /// The `/v2/` endpoint actually requested
    pub fn api_url(&self) -> String {
        let mut url = self.url.trim().to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            let scheme = if self.insecure { "http" } else { "https" };
            url = format!("{scheme}://{url}");
        }

        if !url.ends_with("/v2/") {
            url = format!("{}/v2/", url.trim_end_matches('/').trim_end_matches("/v2"));
        }

        url
    }

    /// Basic auth credentials, when both parts are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user, password))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for RegistryInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryInstance")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("insecure", &self.insecure)
            .finish()
    }
}
