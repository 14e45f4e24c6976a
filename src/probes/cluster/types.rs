//! Cluster API views used by the probes

use crate::classify::{ErrorCategory, HttpStatusClassifier, PLATFORM_API};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure of one cluster API call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, absent for transport failures
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Message rules first, then the HTTP status when no rule matches
    pub fn category(&self) -> ErrorCategory {
        PLATFORM_API
            .matched(&self.message)
            .or_else(|| self.status.map(|code| HttpStatusClassifier.status(code)))
            .unwrap_or(PLATFORM_API.fallback)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub minor: String,
    #[serde(default)]
    pub git_version: String,
}

/// The parts of a pod the probes look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSummary {
    pub name: String,
    pub phase: String,
    pub ready: bool,
}

impl PodSummary {
    pub fn is_running(&self) -> bool {
        self.phase == "Running"
    }

    pub fn is_serving(&self) -> bool {
        self.is_running() && self.ready
    }
}

/// Volume binding policy declared by a storage class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BindingMode {
    #[default]
    Immediate,
    /// `WaitForFirstConsumer`: claims stay Pending until a pod uses them
    DeferredUntilConsumed,
}

impl BindingMode {
    pub fn from_api(mode: Option<&str>) -> Self {
        match mode {
            Some("WaitForFirstConsumer") => Self::DeferredUntilConsumed,
            _ => Self::Immediate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageClassInfo {
    pub name: String,
    pub provisioner: String,
    pub binding_mode: BindingMode,
}

/// Phase reported for a persistent volume claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimPhase {
    Pending,
    Bound,
    Lost,
    Other(String),
}

impl ClaimPhase {
    pub fn from_api(phase: Option<&str>) -> Self {
        match phase {
            Some("Bound") => Self::Bound,
            Some("Lost") => Self::Lost,
            Some("Pending") | None => Self::Pending,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

/// A claim to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub name: String,
    pub namespace: String,
    pub storage_class: String,
    pub size: String,
    pub labels: BTreeMap<String, String>,
}

// Wire formats

#[derive(Debug, Deserialize)]
pub(crate) struct List<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Metadata {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PodWire {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub status: Option<PodStatusWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PodStatusWire {
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionWire {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

impl From<PodWire> for PodSummary {
    fn from(pod: PodWire) -> Self {
        let (phase, ready) = match pod.status {
            Some(status) => {
                let ready = status
                    .conditions
                    .iter()
                    .any(|c| c.kind == "Ready" && c.status == "True");
                (status.phase.unwrap_or_default(), ready)
            }
            None => (String::new(), false),
        };

        Self {
            name: pod.metadata.name,
            phase,
            ready,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StorageClassWire {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub provisioner: String,
    #[serde(default)]
    pub volume_binding_mode: Option<String>,
}

impl From<StorageClassWire> for StorageClassInfo {
    fn from(class: StorageClassWire) -> Self {
        Self {
            name: class.metadata.name,
            provisioner: class.provisioner,
            binding_mode: BindingMode::from_api(class.volume_binding_mode.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaimWire {
    #[serde(default)]
    pub status: Option<ClaimStatusWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaimStatusWire {
    #[serde(default)]
    pub phase: Option<String>,
}

/// `Status` object returned with API errors
#[derive(Debug, Deserialize)]
pub(crate) struct StatusWire {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

impl ClaimRequest {
    pub(crate) fn to_manifest(&self) -> serde_json::Value {
        serde_json::json!({
            "apiVersion": "v1",
            "kind": "PersistentVolumeClaim",
            "metadata": {
                "name": self.name,
                "namespace": self.namespace,
                "labels": self.labels,
            },
            "spec": {
                "accessModes": ["ReadWriteOnce"],
                "storageClassName": self.storage_class,
                "resources": {
                    "requests": { "storage": self.size }
                }
            }
        })
    }
}
