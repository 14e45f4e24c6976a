use super::{CLUSTER_TIMEOUT, ClusterApi};
use crate::monitoring::catalog::ProbeKind;
use crate::probes::{EntityKey, Probe, ProbeContext, ProbeOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// API server reachability via the version endpoint
pub struct ApiServerProbe {
    api: Arc<dyn ClusterApi>,
}

impl ApiServerProbe {
    pub fn new(api: Arc<dyn ClusterApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Probe for ApiServerProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::APISERVER
    }

    fn entity(&self) -> EntityKey {
        EntityKey::singleton()
    }

    fn timeout(&self) -> Duration {
        CLUSTER_TIMEOUT
    }

    async fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        match ctx.call(self.api.server_version()).await {
            Ok(Ok(version)) => {
                debug!(version = %version.git_version, "API server reachable");
                ProbeOutcome::Healthy
            }
            Ok(Err(e)) => ProbeOutcome::unhealthy(
                e.category(),
                "unreachable",
                e.message,
            ),
            Err(interrupted) => ProbeOutcome::interrupted(interrupted, "unreachable"),
        }
    }
}
