use super::{CLUSTER_TIMEOUT, ClusterApi, SYSTEM_NAMESPACE};
use crate::classify::ErrorCategory;
use crate::monitoring::catalog::ProbeKind;
use crate::probes::{EntityKey, Probe, ProbeContext, ProbeOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const ETCD_SELECTOR: &str = "component=etcd";

/// etcd is running as static pods, or the API server reports itself live
///
/// Clusters with an external etcd have no etcd pods; `/livez` covers the
/// API server's own etcd check there.
pub struct EtcdProbe {
    api: Arc<dyn ClusterApi>,
}

impl EtcdProbe {
    pub fn new(api: Arc<dyn ClusterApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Probe for EtcdProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::ETCD
    }

    fn entity(&self) -> EntityKey {
        EntityKey::singleton()
    }

    fn timeout(&self) -> Duration {
        CLUSTER_TIMEOUT
    }

    async fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let pods = match ctx.call(self.api.list_pods(SYSTEM_NAMESPACE, ETCD_SELECTOR)).await {
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
            debug!("no etcd pods, falling back to /livez");
            return match ctx.call(self.api.livez()).await {
                Ok(Ok(())) => ProbeOutcome::Healthy,
                Ok(Err(e)) => ProbeOutcome::unhealthy(
                    e.category(),
                    "health_check_failed",
                    e.message,
                ),
                Err(interrupted) => ProbeOutcome::interrupted(interrupted, "health_check_failed"),
            };
        }

        if pods.iter().any(|pod| pod.is_running()) {
            ProbeOutcome::Healthy
        } else {
            ProbeOutcome::unhealthy(
                ErrorCategory::NoInstances,
                "no_running_pods",
                format!("none of {} etcd pods is running", pods.len()),
            )
        }
    }
}
