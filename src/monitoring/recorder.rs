//! Emission of probe results into the metric sink

use super::catalog::{DURATION_SECONDS, ERRORS_TOTAL, ProbeKind};
use super::labels::{EntityKey, LabelRegistry};
use super::sink::MetricSink;
use crate::probes::ProbeResult;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

/// Shared entry point from collectors to the sink
///
/// Holds one [`LabelRegistry`] per `*_up` gauge plus the shared error
/// counter and duration histogram.
pub struct ProbeMetrics {
    sink: Arc<dyn MetricSink>,
    registries: HashMap<&'static str, LabelRegistry>,
}

impl ProbeMetrics {
    pub fn new(sink: Arc<dyn MetricSink>) -> Self {
        let registries = ProbeKind::ALL
            .iter()
            .map(|kind| (kind.gauge, LabelRegistry::new(kind.gauge, Arc::clone(&sink))))
            .collect();

        Self { sink, registries }
    }

    pub fn sink(&self) -> &Arc<dyn MetricSink> {
        &self.sink
    }

    pub fn registry(&self, kind: ProbeKind) -> Option<&LabelRegistry> {
        self.registries.get(kind.gauge)
    }

    /// Publish one result: gauge, error counter (failures only), duration
    pub fn record(&self, result: &ProbeResult) {
        let kind = result.kind;

        match self.registry(kind) {
            Some(registry) => {
                registry.report(&result.entity, result.category, result.gauge_value())
            }
            None => warn!(gauge = kind.gauge, "no label registry for gauge"),
        }

        if let Some(error_type) = result.error_type.as_deref() {
            let labels = [("collector", kind.collector), ("error_type", error_type)];
            if let Err(e) = self.sink.increment_counter(ERRORS_TOTAL, &labels) {
                warn!(collector = kind.collector, error = %e, "failed to increment error counter");
            }
        }

        let labels = [("collector", kind.collector)];
        if let Err(e) = self
            .sink
            .observe_histogram(DURATION_SECONDS, &labels, result.latency.as_secs_f64())
        {
            warn!(collector = kind.collector, error = %e, "failed to observe duration");
        }
    }

    /// Evict series of `kind` whose entity is not in `live`
    pub fn retain(&self, kind: ProbeKind, live: &HashSet<EntityKey>) {
        if let Some(registry) = self.registry(kind) {
            registry.retain(|entity| live.contains(entity));
        }
    }
}
