//! Cluster DNS functional test

use super::{CLUSTER_TIMEOUT, ClusterApi, SYSTEM_NAMESPACE};
use crate::classify::{Classifier, DNS, ErrorCategory};
use crate::monitoring::catalog::ProbeKind;
use crate::probes::{EntityKey, Probe, ProbeContext, ProbeOutcome};
use crate::utils::error::error_chain;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

const DNS_SELECTOR: &str = "k8s-app=kube-dns";

/// Name resolution used by the DNS probe
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Number of addresses `name` resolves to
    async fn resolve(&self, name: &str) -> Result<usize, String>;
}

/// Resolver backed by the host's stub resolver
#[derive(Debug, Default, Clone)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, name: &str) -> Result<usize, String> {
        tokio::net::lookup_host((name, 0))
            .await
            .map(|addrs| addrs.count())
            .map_err(|e| error_chain(&e))
    }
}

/// DNS pods are serving and a service name resolves
pub struct DnsProbe {
    api: Arc<dyn ClusterApi>,
    resolver: Arc<dyn Resolver>,
    name: String,
}

impl DnsProbe {
    pub fn new(
        api: Arc<dyn ClusterApi>,
        resolver: Arc<dyn Resolver>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api,
            resolver,
            name: name.into(),
        }
    }
}

#[async_trait]
impl Probe for DnsProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::DNS
    }

    fn entity(&self) -> EntityKey {
        EntityKey::singleton()
    }

    fn timeout(&self) -> Duration {
        CLUSTER_TIMEOUT
    }

    async fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let pods = match ctx.call(self.api.list_pods(SYSTEM_NAMESPACE, DNS_SELECTOR)).await {
            Ok(Ok(pods)) => pods,
            Ok(Err(e)) => {
                return ProbeOutcome::unhealthy(
                    e.category(),
                    "list_failed",
                    e.message,
                );
            }
            Err(interrupted) => return ProbeOutcome::interrupted(interrupted, "list_failed"),
        };

        if pods.is_empty() {
            return ProbeOutcome::unhealthy(
                ErrorCategory::NoInstances,
                "no_pods",
                "no DNS pods found",
            );
        }
        if !pods.iter().any(|pod| pod.is_serving()) {
            return ProbeOutcome::unhealthy(
                ErrorCategory::NotReady,
                "no_ready_pods",
                format!("none of {} DNS pods is ready", pods.len()),
            );
        }

        match ctx.call(self.resolver.resolve(&self.name)).await {
            Ok(Ok(0)) => ProbeOutcome::unhealthy(
                ErrorCategory::DnsResolutionFailed,
                "resolution_failed",
                format!("{} resolved to no addresses", self.name),
            ),
            Ok(Ok(count)) => {
                debug!(name = %self.name, addresses = count, "cluster DNS resolved");
                ProbeOutcome::Healthy
            }
            Ok(Err(e)) => {
                ProbeOutcome::unhealthy(DNS.classify(Some(e.as_str())), "resolution_failed", e)
            }
            Err(interrupted) => ProbeOutcome::interrupted(interrupted, "resolution_failed"),
        }
    }
}
