//! Common test utilities for health-console

pub mod fakes;

pub use fakes::{FakeConnector, FixedResolver};

use health_console::{ProbeMetrics, PrometheusSink};
use std::sync::Arc;

/// A fresh sink and the recorder writing into it
pub fn metrics() -> (Arc<PrometheusSink>, Arc<ProbeMetrics>) {
    let sink = Arc::new(PrometheusSink::new().expect("metric families register"));
    let metrics = Arc::new(ProbeMetrics::new(sink.clone()));
    (sink, metrics)
}
