use super::provisioning::STORAGE_CLASS_LABEL;
use super::{ClusterApi, ProvisioningApi, ProvisioningProbe};
use crate::classify::ErrorCategory;
use crate::collectors::{Discovery, ProbeSource};
use crate::config::ProvisioningConfig;
use crate::monitoring::catalog::ProbeKind;
use crate::probes::{CancelSignal, EntityKey, FixedOutcome, Probe, ProbeContext, ProbeOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Entity reported when there is no storage class to test
pub const DEFAULT_STORAGE_CLASS: &str = "default";

/// Lists storage classes every cycle and yields one provisioning probe each
pub struct StorageClassSource {
    api: Arc<dyn ClusterApi>,
    provisioning: Arc<dyn ProvisioningApi>,
    settings: ProvisioningConfig,
}

impl StorageClassSource {
    pub fn new(
        api: Arc<dyn ClusterApi>,
        provisioning: Arc<dyn ProvisioningApi>,
        settings: ProvisioningConfig,
    ) -> Self {
        Self {
            api,
            provisioning,
            settings,
        }
    }

    fn placeholder(outcome: ProbeOutcome) -> Arc<dyn Probe> {
        Arc::new(FixedOutcome::new(
            ProbeKind::STORAGE,
            EntityKey::singleton().with(STORAGE_CLASS_LABEL, DEFAULT_STORAGE_CLASS),
            outcome,
        ))
    }
}

#[async_trait]
impl ProbeSource for StorageClassSource {
    async fn discover(&self, cancel: &CancelSignal) -> Discovery {
        let ctx = ProbeContext::new(self.settings.list_timeout, cancel.clone());
        let classes = match ctx.call(self.api.list_storage_classes()).await {
            Ok(Ok(classes)) => classes,
            Ok(Err(e)) => {
                let outcome = ProbeOutcome::unhealthy(
                    e.category(),
                    "list_failed",
                    e.message,
                );
                // Existing per-class series are kept until a listing succeeds
                return Discovery::fixed(vec![Self::placeholder(outcome)]);
            }
            Err(interrupted) => {
                return Discovery::fixed(vec![Self::placeholder(ProbeOutcome::interrupted(
                    interrupted,
                    "list_failed",
                ))]);
            }
        };

        if classes.is_empty() {
            let outcome = ProbeOutcome::unhealthy(
                ErrorCategory::NoInstances,
                "no_storage_classes",
                "no storage classes found",
            );
            return Discovery::authoritative(ProbeKind::STORAGE, vec![Self::placeholder(outcome)]);
        }

        debug!(count = classes.len(), "discovered storage classes");
        let probes = classes
            .into_iter()
            .map(|class| {
                Arc::new(ProvisioningProbe::new(
                    self.provisioning.clone(),
                    class,
                    self.settings.clone(),
                )) as Arc<dyn Probe>
            })
            .collect();
        Discovery::authoritative(ProbeKind::STORAGE, probes)
    }
}
