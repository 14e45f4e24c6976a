//! Metrics: catalog, sink, label lifecycle and result emission

pub mod catalog;
pub mod labels;
pub mod recorder;
pub mod sink;

pub use catalog::ProbeKind;
pub use labels::{EntityKey, LabelRegistry};
pub use recorder::ProbeMetrics;
pub use sink::{LabelSet, Labels, MetricSink, PrometheusSink, SinkError, SinkResult};
