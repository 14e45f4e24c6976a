//! Probes: one bounded check of one dependency
//!
//! A [`Probe`] never returns an error. Every failure is folded into a
//! [`ProbeOutcome`] carrying the classified category and the counter label
//! for `health_check_errors_total`; [`run_probe`] turns that into the
//! immutable [`ProbeResult`] the recorder consumes.

pub mod cluster;
mod context;
pub mod database;
pub mod object_store;
pub mod registry;

pub use crate::monitoring::labels::EntityKey;
pub use context::{CancelSignal, Interrupted, ProbeContext};

use crate::classify::ErrorCategory;
use crate::monitoring::catalog::ProbeKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Verdict of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy {
        category: ErrorCategory,
        /// Label for `health_check_errors_total{error_type}`
        error_type: Cow<'static, str>,
        detail: String,
    },
}

impl ProbeOutcome {
    pub fn unhealthy(
        category: ErrorCategory,
        error_type: impl Into<Cow<'static, str>>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Unhealthy {
            category,
            error_type: error_type.into(),
            detail: detail.into(),
        }
    }

    pub fn interrupted(interrupted: Interrupted, error_type: &'static str) -> Self {
        Self::unhealthy(interrupted.category(), error_type, interrupted.to_string())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Healthy => ErrorCategory::Healthy,
            Self::Unhealthy { category, .. } => *category,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// One dependency check
#[async_trait]
pub trait Probe: Send + Sync {
    fn kind(&self) -> ProbeKind;

    fn entity(&self) -> EntityKey;

    /// Deadline for the whole check
    fn timeout(&self) -> Duration;

    async fn check(&self, ctx: &ProbeContext) -> ProbeOutcome;
}

/// Immutable result of one probe invocation
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub entity: EntityKey,
    pub kind: ProbeKind,
    pub healthy: bool,
    pub category: ErrorCategory,
    pub error_type: Option<Cow<'static, str>>,
    pub detail: Option<String>,
    pub latency: Duration,
    pub observed_at: DateTime<Utc>,
}

impl ProbeResult {
    pub fn gauge_value(&self) -> f64 {
        if self.healthy { 1.0 } else { 0.0 }
    }
}

/// Run `probe` under its own deadline and the collector's teardown signal
pub async fn run_probe(probe: &dyn Probe, cancel: CancelSignal) -> ProbeResult {
    let kind = probe.kind();
    let entity = probe.entity();
    let ctx = ProbeContext::new(probe.timeout(), cancel);

    let started = Instant::now();
    let outcome = probe.check(&ctx).await;
    let latency = started.elapsed();

    let category = outcome.category();
    let (error_type, detail) = match outcome {
        ProbeOutcome::Healthy => {
            debug!(
                collector = kind.collector,
                entity = %entity,
                latency_ms = latency.as_millis() as u64,
                "health check passed"
            );
            (None, None)
        }
        ProbeOutcome::Unhealthy {
            error_type, detail, ..
        } => {
            warn!(
                collector = kind.collector,
                entity = %entity,
                category = %category,
                error_type = %error_type,
                error = %detail,
                "health check failed"
            );
            (Some(error_type), Some(detail))
        }
    };

    ProbeResult {
        entity,
        kind,
        healthy: category.is_healthy(),
        category,
        error_type,
        detail,
        latency,
        observed_at: Utc::now(),
    }
}

/// A probe whose verdict was decided during discovery
pub struct FixedOutcome {
    kind: ProbeKind,
    entity: EntityKey,
    outcome: ProbeOutcome,
}

impl FixedOutcome {
    pub fn new(kind: ProbeKind, entity: EntityKey, outcome: ProbeOutcome) -> Self {
        Self {
            kind,
            entity,
            outcome,
        }
    }
}

#[async_trait]
impl Probe for FixedOutcome {
    fn kind(&self) -> ProbeKind {
        self.kind
    }

    fn entity(&self) -> EntityKey {
        self.entity.clone()
    }

    fn timeout(&self) -> Duration {
        Duration::ZERO
    }

    async fn check(&self, _ctx: &ProbeContext) -> ProbeOutcome {
        self.outcome.clone()
    }
}
