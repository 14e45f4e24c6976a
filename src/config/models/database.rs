//! Database instance configuration

use super::*;
use serde::{Deserialize, Serialize};

/// One MySQL instance to probe
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInstance {
    /// Value of the `instance` label
    pub name: String,
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_db_name")]
    pub database: String,
}

impl DatabaseInstance {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            database: default_db_name(),
        }
    }
}

impl std::fmt::Debug for DatabaseInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseInstance")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}
