//! # health-console
//!
//! Liveness probing for the dependencies of a container platform: MySQL
//! instances, the cluster API server, cluster DNS, etcd, storage classes,
//! image registries and an S3-compatible object store. Each dependency is
//! reported as a Prometheus gauge labelled with the classified reason of its
//! last failure.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use health_console::{Config, ProbeMetrics, PrometheusSink, collectors};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let sink = Arc::new(PrometheusSink::new()?);
//!     let metrics = Arc::new(ProbeMetrics::new(sink.clone()));
//!
//!     if let Some(collector) = collectors::database_collector(&config.console, metrics) {
//!         collector.run_cycle().await;
//!     }
//!     println!("{}", sink.render()?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod classify;
pub mod collectors;
pub mod config;
pub mod monitoring;
pub mod probes;
pub mod server;
pub mod utils;

pub use classify::{Classifier, ErrorCategory};
pub use collectors::Collector;
pub use config::Config;
pub use monitoring::{EntityKey, MetricSink, ProbeMetrics, PrometheusSink};
pub use probes::{Probe, ProbeOutcome, ProbeResult, run_probe};
pub use server::BuildInfo;
pub use utils::error::{ConsoleError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
