//! Metric sink abstraction and its Prometheus implementation

use super::catalog::{FAMILIES, FamilyKind, MetricFamily};
use crate::utils::error::{ConsoleError, Result};
use prometheus::proto::Metric;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::collections::HashMap;
use thiserror::Error;

/// Borrowed `(name, value)` label pairs identifying one series
pub type Labels<'a> = [(&'a str, &'a str)];

/// Owned label pairs, as returned by inspection helpers
pub type LabelSet = Vec<(String, String)>;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("unknown metric family: {0}")]
    UnknownFamily(String),

    #[error(transparent)]
    Prometheus(#[from] prometheus::Error),
}

pub type SinkResult = std::result::Result<(), SinkError>;

/// Destination for probe metrics
///
/// Implementations must be safe to call from many probe tasks at once.
pub trait MetricSink: Send + Sync {
    fn set_gauge(&self, name: &str, labels: &Labels<'_>, value: f64) -> SinkResult;

    /// Delete one series; removing a series that does not exist is not an error
    fn remove_series(&self, name: &str, labels: &Labels<'_>) -> SinkResult;

    fn increment_counter(&self, name: &str, labels: &Labels<'_>) -> SinkResult;

    fn observe_histogram(&self, name: &str, labels: &Labels<'_>, value: f64) -> SinkResult;
}

fn as_map<'a>(labels: &'a Labels<'a>) -> HashMap<&'a str, &'a str> {
    labels.iter().copied().collect()
}

/// [`MetricSink`] backed by a private `prometheus::Registry`
pub struct PrometheusSink {
    registry: Registry,
    gauges: HashMap<&'static str, GaugeVec>,
    counters: HashMap<&'static str, CounterVec>,
    histograms: HashMap<&'static str, HistogramVec>,
}

impl PrometheusSink {
    /// Create a sink with every family from the catalog registered
    pub fn new() -> Result<Self> {
        Self::with_families(FAMILIES)
    }

    pub fn with_families(families: &[MetricFamily]) -> Result<Self> {
        let registry = Registry::new();
        let mut gauges = HashMap::new();
        let mut counters = HashMap::new();
        let mut histograms = HashMap::new();

        for family in families {
            match family.kind {
                FamilyKind::Gauge => {
                    let vec = GaugeVec::new(Opts::new(family.name, family.help), family.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    gauges.insert(family.name, vec);
                }
                FamilyKind::Counter => {
                    let vec = CounterVec::new(Opts::new(family.name, family.help), family.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    counters.insert(family.name, vec);
                }
                FamilyKind::Histogram => {
                    let vec = HistogramVec::new(
                        HistogramOpts::new(family.name, family.help),
                        family.labels,
                    )?;
                    registry.register(Box::new(vec.clone()))?;
                    histograms.insert(family.name, vec);
                }
            }
        }

        Ok(Self {
            registry,
            gauges,
            counters,
            histograms,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every family in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| ConsoleError::server(format!("metrics are not valid UTF-8: {e}")))
    }

    /// Label sets of every live series of `name`
    pub fn series(&self, name: &str) -> Vec<LabelSet> {
        self.samples(name)
            .into_iter()
            .map(|(labels, _)| labels)
            .collect()
    }

    /// Current value of the series of `name` with exactly `labels`
    ///
    /// Histograms report their sample count.
    pub fn value(&self, name: &str, labels: &Labels<'_>) -> Option<f64> {
        let mut wanted: LabelSet = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        wanted.sort();

        self.samples(name)
            .into_iter()
            .find(|(found, _)| *found == wanted)
            .map(|(_, value)| value)
    }

    /// Every series of one family with its labels sorted by name
    fn samples(&self, name: &str) -> Vec<(LabelSet, f64)> {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.name() == name)
            .flat_map(|family| family.get_metric())
            .map(|metric| {
                let mut labels: LabelSet = metric
                    .get_label()
                    .iter()
                    .map(|pair| (pair.name().to_string(), pair.value().to_string()))
                    .collect();
                labels.sort();
                (labels, self.sample_value(name, metric))
            })
            .collect()
    }

    fn sample_value(&self, name: &str, metric: &Metric) -> f64 {
        if self.gauges.contains_key(name) {
            metric.get_gauge().value()
        } else if self.counters.contains_key(name) {
            metric.get_counter().value()
        } else {
            metric.get_histogram().get_sample_count() as f64
        }
    }
}

impl MetricSink for PrometheusSink {
    fn set_gauge(&self, name: &str, labels: &Labels<'_>, value: f64) -> SinkResult {
        let vec = self
            .gauges
            .get(name)
            .ok_or_else(|| SinkError::UnknownFamily(name.to_string()))?;
        vec.get_metric_with(&as_map(labels))?.set(value);
        Ok(())
    }

    fn remove_series(&self, name: &str, labels: &Labels<'_>) -> SinkResult {
        let vec = self
            .gauges
            .get(name)
            .ok_or_else(|| SinkError::UnknownFamily(name.to_string()))?;
        match vec.remove(&as_map(labels)) {
            Ok(()) => Ok(()),
            // absent series
            Err(prometheus::Error::Msg(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn increment_counter(&self, name: &str, labels: &Labels<'_>) -> SinkResult {
        let vec = self
            .counters
            .get(name)
            .ok_or_else(|| SinkError::UnknownFamily(name.to_string()))?;
        vec.get_metric_with(&as_map(labels))?.inc();
        Ok(())
    }

    fn observe_histogram(&self, name: &str, labels: &Labels<'_>, value: f64) -> SinkResult {
        let vec = self
            .histograms
            .get(name)
            .ok_or_else(|| SinkError::UnknownFamily(name.to_string()))?;
        vec.get_metric_with(&as_map(labels))?.observe(value);
        Ok(())
    }
}
