//! Collectors: scheduled fan-out of probes into the metric sink
//!
//! A [`Collector`] owns one or more [`ProbeSource`]s. Every cycle it asks each
//! source for its probes, runs all of them concurrently and records the
//! results through the shared [`ProbeMetrics`]. Cycles never overlap.

mod builders;

pub use builders::{
    cluster_collector, cluster_collector_with, database_collector, database_collector_with,
    object_store_collector, registry_collector,
};

use crate::monitoring::catalog::ProbeKind;
use crate::monitoring::{EntityKey, ProbeMetrics};
use crate::probes::{CancelSignal, Probe, run_probe};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Probes to run in one cycle
pub struct Discovery {
    pub probes: Vec<Arc<dyn Probe>>,
    /// Kind whose series not covered by `probes` should be evicted
    pub prune: Option<ProbeKind>,
}

impl Discovery {
    pub fn fixed(probes: Vec<Arc<dyn Probe>>) -> Self {
        Self { probes, prune: None }
    }

    /// `probes` is the complete entity set of `kind`
    pub fn authoritative(kind: ProbeKind, probes: Vec<Arc<dyn Probe>>) -> Self {
        Self {
            probes,
            prune: Some(kind),
        }
    }
}

#[async_trait]
pub trait ProbeSource: Send + Sync {
    async fn discover(&self, cancel: &CancelSignal) -> Discovery;
}

/// Probe set fixed at construction time
pub struct StaticProbes {
    probes: Vec<Arc<dyn Probe>>,
}

impl StaticProbes {
    pub fn new(probes: Vec<Arc<dyn Probe>>) -> Self {
        Self { probes }
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

#[async_trait]
impl ProbeSource for StaticProbes {
    async fn discover(&self, _cancel: &CancelSignal) -> Discovery {
        Discovery::fixed(self.probes.clone())
    }
}

struct CollectorInner {
    name: &'static str,
    sources: Vec<Arc<dyn ProbeSource>>,
    metrics: Arc<ProbeMetrics>,
    interval: Duration,
}

impl CollectorInner {
    async fn run_cycle(&self, cancel: &CancelSignal) {
        let started = Instant::now();
        let mut tasks = JoinSet::new();
        let mut prune: Vec<(ProbeKind, HashSet<EntityKey>)> = Vec::new();

        for source in &self.sources {
            let discovery = source.discover(cancel).await;
            if let Some(kind) = discovery.prune {
                prune.push((kind, discovery.probes.iter().map(|p| p.entity()).collect()));
            }
            for probe in discovery.probes {
                let cancel = cancel.clone();
                tasks.spawn(async move { run_probe(probe.as_ref(), cancel).await });
            }
        }

        let mut recorded = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) if cancel.is_cancelled() => {
                    debug!(
                        collector = self.name,
                        entity = %result.entity,
                        "discarding result completed after stop"
                    );
                }
                Ok(result) => {
                    self.metrics.record(&result);
                    recorded += 1;
                }
                Err(e) => error!(collector = self.name, error = %e, "probe task failed"),
            }
        }

        if cancel.is_cancelled() {
            return;
        }
        for (kind, live) in &prune {
            self.metrics.retain(*kind, live);
        }

        debug!(
            collector = self.name,
            probes = recorded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection cycle finished"
        );
    }

    async fn run_loop(self: Arc<Self>, cancel: CancelSignal) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.run_cycle(&cancel).await;
        }

        debug!(collector = self.name, "collection loop exited");
    }
}

/// Periodic collector for one backend family
pub struct Collector {
    inner: Arc<CollectorInner>,
    stop_tx: watch::Sender<bool>,
    cancel: CancelSignal,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Collector {
    pub fn new(
        name: &'static str,
        sources: Vec<Arc<dyn ProbeSource>>,
        metrics: Arc<ProbeMetrics>,
        interval: Duration,
    ) -> Self {
        let (stop_tx, cancel) = CancelSignal::pair();
        Self {
            inner: Arc::new(CollectorInner {
                name,
                sources,
                metrics,
                interval,
            }),
            stop_tx,
            cancel,
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn metrics(&self) -> &Arc<ProbeMetrics> {
        &self.inner.metrics
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Run one cycle now, then every interval until [`Collector::stop`]
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.is_some() || self.cancel.is_cancelled() {
            debug!(collector = self.inner.name, "collector already started");
            return;
        }

        info!(
            collector = self.inner.name,
            interval_secs = self.inner.interval.as_secs_f64(),
            "starting collector"
        );
        *handle = Some(tokio::spawn(
            self.inner.clone().run_loop(self.cancel.clone()),
        ));
    }

    /// One cycle on the caller's task; all probes finish before it returns
    pub async fn run_cycle(&self) {
        self.inner.run_cycle(&self.cancel).await;
    }

    /// Stop scheduling cycles and wait for the in-flight one to drain
    pub async fn stop(&self) {
        self.stop_tx.send_replace(true);
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(collector = self.inner.name, error = %e, "collector task failed");
            }
            info!(collector = self.inner.name, "collector stopped");
        }
    }
}
