//! Per-entity label lifecycle for `*_up` gauges
//!
//! A gauge series is identified by the entity labels plus `error_reason`.
//! When an entity's category changes, the series carrying the old category
//! must disappear before the new one is written, otherwise a scrape sees
//! the entity both up and down at once.

use super::catalog::ERROR_REASON;
use super::sink::MetricSink;
use crate::classify::ErrorCategory;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Identity of one monitored instance within a probe family
///
/// Singleton probes (API server, DNS, etcd, object store) use the empty key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    labels: Vec<(&'static str, String)>,
}

impl EntityKey {
    pub fn singleton() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.labels.push((name, value.into()));
        self
    }

    pub fn labels(&self) -> &[(&'static str, String)] {
        &self.labels
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_singleton(&self) -> bool {
        self.labels.is_empty()
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return f.write_str("singleton");
        }
        for (i, (name, value)) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Tracks the last `error_reason` emitted per entity of one gauge
pub struct LabelRegistry {
    gauge: &'static str,
    sink: Arc<dyn MetricSink>,
    state: Mutex<HashMap<EntityKey, ErrorCategory>>,
}

impl LabelRegistry {
    pub fn new(gauge: &'static str, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            gauge,
            sink,
            state: Mutex::new(HashMap::new()),
        }
    }

    pub fn gauge(&self) -> &'static str {
        self.gauge
    }

    /// Publish `value` for `entity` under `category`
    ///
    /// The lock is held across the sink calls so a concurrent reporter for
    /// the same entity cannot interleave its remove/set with ours.
    pub fn report(&self, entity: &EntityKey, category: ErrorCategory, value: f64) {
        let mut state = self.state.lock();

        if let Some(previous) = state.get(entity).copied() {
            if previous != category {
                self.remove(entity, previous);
            }
        }

        let labels = series_labels(entity, category);
        if let Err(e) = self.sink.set_gauge(self.gauge, &borrowed(&labels), value) {
            warn!(gauge = self.gauge, entity = %entity, error = %e, "failed to set gauge");
        }

        state.insert(entity.clone(), category);
    }

    /// Last category reported for `entity`
    pub fn current(&self, entity: &EntityKey) -> Option<ErrorCategory> {
        self.state.lock().get(entity).copied()
    }

    pub fn entities(&self) -> Vec<EntityKey> {
        self.state.lock().keys().cloned().collect()
    }

    /// Drop the series of every entity for which `keep` returns false
    pub fn retain(&self, mut keep: impl FnMut(&EntityKey) -> bool) {
        let mut state = self.state.lock();
        let stale: Vec<(EntityKey, ErrorCategory)> = state
            .iter()
            .filter(|(entity, _)| !keep(entity))
            .map(|(entity, category)| (entity.clone(), *category))
            .collect();

        for (entity, category) in stale {
            debug!(gauge = self.gauge, entity = %entity, "evicting stale series");
            self.remove(&entity, category);
            state.remove(&entity);
        }
    }

    fn remove(&self, entity: &EntityKey, category: ErrorCategory) {
        let labels = series_labels(entity, category);
        if let Err(e) = self.sink.remove_series(self.gauge, &borrowed(&labels)) {
            warn!(gauge = self.gauge, entity = %entity, error = %e, "failed to remove series");
        }
    }
}

fn series_labels(entity: &EntityKey, category: ErrorCategory) -> Vec<(&'static str, String)> {
    let mut labels = entity.labels().to_vec();
    labels.push((ERROR_REASON, category.as_str().to_string()));
    labels
}

fn borrowed<'a>(labels: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    labels.iter().map(|(k, v)| (*k, v.as_str())).collect()
}
