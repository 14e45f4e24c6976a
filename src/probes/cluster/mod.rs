//! Cluster probes: API server, DNS, etcd and storage classes
//!
//! All of them talk to the cluster through [`ClusterApi`] and
//! [`ProvisioningApi`], implemented over HTTP by [`KubeClient`].

mod apiserver;
mod client;
mod dns;
mod etcd;
pub mod provisioning;
mod storage;
pub mod types;

pub use apiserver::ApiServerProbe;
pub use client::KubeClient;
pub use dns::{DnsProbe, Resolver, SystemResolver};
pub use etcd::EtcdProbe;
pub use provisioning::{ProvisioningProbe, ProvisioningSession, SessionPhase};
pub use storage::StorageClassSource;
pub use types::{
    ApiError, BindingMode, ClaimPhase, ClaimRequest, PodSummary, StorageClassInfo, VersionInfo,
};

use async_trait::async_trait;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Deadline for the API server, DNS and etcd checks
pub const CLUSTER_TIMEOUT: Duration = Duration::from_secs(10);

pub const SYSTEM_NAMESPACE: &str = "kube-system";

/// Read-only cluster API surface used by the reachability probes
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn server_version(&self) -> Result<VersionInfo, ApiError>;

    async fn list_pods(&self, namespace: &str, label_selector: &str)
    -> Result<Vec<PodSummary>, ApiError>;

    /// API server liveness endpoint
    async fn livez(&self) -> Result<(), ApiError>;

    async fn list_storage_classes(&self) -> Result<Vec<StorageClassInfo>, ApiError>;
}

/// Claim lifecycle used by the storage-class functional test
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    async fn create_claim(&self, request: &ClaimRequest) -> Result<(), ApiError>;

    async fn claim_phase(&self, namespace: &str, name: &str) -> Result<ClaimPhase, ApiError>;

    async fn delete_claim(&self, namespace: &str, name: &str) -> Result<(), ApiError>;
}
