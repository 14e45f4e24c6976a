//! Storage-class functional test
//!
//! One session per storage class and cycle: submit a small claim, wait for it
//! according to the class's binding mode, then delete it. A submitted claim is
//! always deleted exactly once, whatever the verdict.

use super::{BindingMode, ClaimPhase, ClaimRequest, ProvisioningApi, StorageClassInfo};
use crate::classify::ErrorCategory;
use crate::config::ProvisioningConfig;
use crate::monitoring::catalog::ProbeKind;
use crate::probes::{EntityKey, Interrupted, Probe, ProbeContext, ProbeOutcome};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

pub const STORAGE_CLASS_LABEL: &str = "storage_class";

/// Lifecycle of one provisioning session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Created,
    Pending,
    Bound,
    Lost,
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ProvisioningSession {
    pub request_name: String,
    pub binding_mode: BindingMode,
    pub phase: SessionPhase,
    pub deadline: Instant,
    submitted: bool,
}

impl ProvisioningSession {
    fn new(class: &StorageClassInfo, deadline: Instant) -> Self {
        Self {
            request_name: format!("health-check-test-{}-{}", class.name, Utc::now().timestamp()),
            binding_mode: class.binding_mode,
            phase: SessionPhase::Created,
            deadline,
            submitted: false,
        }
    }

    /// Whether a claim may exist and therefore needs deleting
    pub fn submitted(&self) -> bool {
        self.submitted
    }

    fn interrupted(&mut self, interrupted: Interrupted) -> ProbeOutcome {
        match interrupted {
            Interrupted::Timeout => {
                self.phase = SessionPhase::TimedOut;
                ProbeOutcome::interrupted(interrupted, "pvc_bind_timeout")
            }
            Interrupted::Cancelled => {
                self.phase = SessionPhase::Cancelled;
                ProbeOutcome::interrupted(interrupted, "context_cancelled")
            }
        }
    }

    fn lost(&mut self) -> ProbeOutcome {
        self.phase = SessionPhase::Lost;
        ProbeOutcome::unhealthy(
            ErrorCategory::CapacityExceeded,
            "pvc_lost",
            format!("claim {} was lost", self.request_name),
        )
    }
}

pub struct ProvisioningProbe {
    api: Arc<dyn ProvisioningApi>,
    class: StorageClassInfo,
    settings: ProvisioningConfig,
}

impl ProvisioningProbe {
    pub fn new(
        api: Arc<dyn ProvisioningApi>,
        class: StorageClassInfo,
        settings: ProvisioningConfig,
    ) -> Self {
        Self { api, class, settings }
    }

    pub fn storage_class(&self) -> &StorageClassInfo {
        &self.class
    }

    /// Run a full session, cleanup included
    pub async fn run_session(&self, ctx: &ProbeContext) -> (ProvisioningSession, ProbeOutcome) {
        let mut session = ProvisioningSession::new(&self.class, ctx.deadline());
        let outcome = self.drive(&mut session, ctx).await;
        if session.submitted {
            self.cleanup(&session).await;
        }
        (session, outcome)
    }

    fn claim_request(&self, name: &str) -> ClaimRequest {
        ClaimRequest {
            name: name.to_string(),
            namespace: self.settings.namespace.clone(),
            storage_class: self.class.name.clone(),
            size: self.settings.request_size.clone(),
            labels: BTreeMap::from([
                ("app".to_string(), "health-console".to_string()),
                ("purpose".to_string(), "storage-test".to_string()),
            ]),
        }
    }

    async fn drive(&self, session: &mut ProvisioningSession, ctx: &ProbeContext) -> ProbeOutcome {
        let request = self.claim_request(&session.request_name);
        match ctx.call(self.api.create_claim(&request)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                session.phase = SessionPhase::Lost;
                return ProbeOutcome::unhealthy(
                    e.category(),
                    "pvc_create_failed",
                    e.message,
                );
            }
            Err(interrupted) => {
                // The request may have reached the server before we gave up
                session.submitted = true;
                return match interrupted {
                    Interrupted::Timeout => {
                        session.phase = SessionPhase::TimedOut;
                        ProbeOutcome::interrupted(interrupted, "pvc_create_failed")
                    }
                    Interrupted::Cancelled => session.interrupted(interrupted),
                };
            }
        }

        session.submitted = true;
        session.phase = SessionPhase::Pending;
        debug!(
            storage_class = %self.class.name,
            claim = %session.request_name,
            mode = ?session.binding_mode,
            "test claim submitted"
        );

        match session.binding_mode {
            BindingMode::Immediate => self.await_binding(session, ctx).await,
            BindingMode::DeferredUntilConsumed => self.await_settle(session, ctx).await,
        }
    }

    /// Deferred binding: a single read after the settle delay
    async fn await_settle(
        &self,
        session: &mut ProvisioningSession,
        ctx: &ProbeContext,
    ) -> ProbeOutcome {
        if let Err(interrupted) = ctx.sleep(self.settings.settle_delay).await {
            return session.interrupted(interrupted);
        }

        let phase = ctx
            .call(self.api.claim_phase(&self.settings.namespace, &session.request_name))
            .await;
        match phase {
            Ok(Ok(ClaimPhase::Pending | ClaimPhase::Bound)) => {
                session.phase = SessionPhase::Bound;
                ProbeOutcome::Healthy
            }
            Ok(Ok(ClaimPhase::Lost)) => session.lost(),
            Ok(Ok(ClaimPhase::Other(phase))) => ProbeOutcome::unhealthy(
                ErrorCategory::NotReady,
                "unexpected_state",
                format!("claim {} in phase {phase}", session.request_name),
            ),
            Ok(Err(e)) => ProbeOutcome::unhealthy(
                e.category(),
                "pvc_get_failed",
                e.message,
            ),
            Err(interrupted) => session.interrupted(interrupted),
        }
    }

    /// Immediate binding: poll until bound, lost or the bind deadline
    async fn await_binding(
        &self,
        session: &mut ProvisioningSession,
        ctx: &ProbeContext,
    ) -> ProbeOutcome {
        let poll = self.settings.poll_interval;
        let poll_ctx = ctx.narrowed(self.settings.bind_timeout);
        session.deadline = poll_ctx.deadline();

        let mut ticker = tokio::time::interval_at(Instant::now() + poll, poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let expiry = tokio::time::sleep_until(poll_ctx.deadline());
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                biased;
                _ = ctx.cancel_signal().cancelled() => {
                    return session.interrupted(Interrupted::Cancelled);
                }
                _ = &mut expiry => {
                    session.phase = SessionPhase::TimedOut;
                    return ProbeOutcome::unhealthy(
                        ErrorCategory::Timeout,
                        "pvc_bind_timeout",
                        format!(
                            "claim {} not bound within {}s",
                            session.request_name,
                            self.settings.bind_timeout.as_secs()
                        ),
                    );
                }
                _ = ticker.tick() => {
                    let phase = poll_ctx
                        .call(self.api.claim_phase(&self.settings.namespace, &session.request_name))
                        .await;
                    match phase {
                        Ok(Ok(ClaimPhase::Bound)) => {
                            session.phase = SessionPhase::Bound;
                            return ProbeOutcome::Healthy;
                        }
                        Ok(Ok(ClaimPhase::Lost)) => return session.lost(),
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => warn!(
                            claim = %session.request_name,
                            error = %e,
                            "failed to read test claim, retrying"
                        ),
                        Err(Interrupted::Cancelled) => {
                            return session.interrupted(Interrupted::Cancelled);
                        }
                        // The expiry branch reports it on the next turn
                        Err(Interrupted::Timeout) => {}
                    }
                }
            }
        }
    }

    async fn cleanup(&self, session: &ProvisioningSession) {
        let delete = self
            .api
            .delete_claim(&self.settings.namespace, &session.request_name);
        match tokio::time::timeout(self.settings.cleanup_timeout, delete).await {
            Ok(Ok(())) => debug!(claim = %session.request_name, "test claim deleted"),
            Ok(Err(e)) if e.is_not_found() => {
                debug!(claim = %session.request_name, "test claim already gone")
            }
            Ok(Err(e)) => warn!(
                claim = %session.request_name,
                error = %e,
                "failed to delete test claim"
            ),
            Err(_) => warn!(
                claim = %session.request_name,
                timeout_secs = self.settings.cleanup_timeout.as_secs(),
                "timed out deleting test claim"
            ),
        }
    }
}

#[async_trait]
impl Probe for ProvisioningProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::STORAGE
    }

    fn entity(&self) -> EntityKey {
        EntityKey::singleton().with(STORAGE_CLASS_LABEL, self.class.name.clone())
    }

    fn timeout(&self) -> Duration {
        self.settings.session_timeout
    }

    async fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        self.run_session(ctx).await.1
    }
}
