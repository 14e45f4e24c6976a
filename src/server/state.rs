//! Application state shared across HTTP handlers

use crate::monitoring::PrometheusSink;
use std::sync::Arc;
use std::time::Instant;

/// State handed to every handler
///
/// Handlers only read the sink; collectors write to it concurrently.
#[derive(Clone)]
pub struct AppState {
    /// Sink rendered by `/metrics`
    pub sink: Arc<PrometheusSink>,
    /// Names of the running collectors, listed on the index page
    pub collectors: Arc<Vec<&'static str>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(sink: Arc<PrometheusSink>, collectors: Vec<&'static str>) -> Self {
        Self {
            sink,
            collectors: Arc::new(collectors),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
