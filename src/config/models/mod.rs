//! Configuration data models
//!
//! This module defines all configuration structures used by the console.

#![allow(missing_docs)]

pub mod cluster;
pub mod console;
pub mod database;
pub mod duration;
pub mod logging;
pub mod object_store;
pub mod registry;
pub mod server;

// Re-export all configuration types
pub use cluster::*;
pub use console::*;
pub use database::*;
pub use logging::*;
pub use object_store::*;
pub use registry::*;
pub use server::*;

use std::time::Duration;

/// Default listen address
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default metrics port
pub fn default_port() -> u16 {
    9090
}

/// Default interval between collection cycles
pub fn default_collect_interval() -> Duration {
    Duration::from_secs(30)
}

pub fn default_db_port() -> u16 {
    3306
}

pub fn default_db_user() -> String {
    "root".to_string()
}

pub fn default_db_name() -> String {
    "mysql".to_string()
}

pub fn default_namespace() -> String {
    "rbd-system".to_string()
}

pub fn default_request_size() -> String {
    "1Mi".to_string()
}

pub fn default_dns_name() -> String {
    "kubernetes.default.svc.cluster.local".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_true() -> bool {
    true
}
