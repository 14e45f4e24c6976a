//! The stable error taxonomy exported as the `error_reason` label

use serde::Serialize;
use std::fmt;

/// Classification of a probe outcome
///
/// The string form of each variant is part of the exported metric contract
/// and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Healthy,
    AuthFailed,
    Forbidden,
    Timeout,
    ConnectionRefused,
    NetworkUnreachable,
    ConnectionReset,
    ConnectionClosed,
    ConnectionError,
    DnsResolutionFailed,
    TlsError,
    CertificateUntrusted,
    CertificateExpired,
    NotFound,
    CapacityExceeded,
    UpstreamUnavailable,
    UnexpectedResponse,
    NoInstances,
    NotReady,
    Cancelled,
    Unknown,
}

impl ErrorCategory {
    /// Every category, in declaration order
    pub const ALL: [ErrorCategory; 21] = [
        Self::Healthy,
        Self::AuthFailed,
        Self::Forbidden,
        Self::Timeout,
        Self::ConnectionRefused,
        Self::NetworkUnreachable,
        Self::ConnectionReset,
        Self::ConnectionClosed,
        Self::ConnectionError,
        Self::DnsResolutionFailed,
        Self::TlsError,
        Self::CertificateUntrusted,
        Self::CertificateExpired,
        Self::NotFound,
        Self::CapacityExceeded,
        Self::UpstreamUnavailable,
        Self::UnexpectedResponse,
        Self::NoInstances,
        Self::NotReady,
        Self::Cancelled,
        Self::Unknown,
    ];

    /// Label value written into `error_reason`
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::AuthFailed => "auth_failed",
            Self::Forbidden => "forbidden",
            Self::Timeout => "timeout",
            Self::ConnectionRefused => "connection_refused",
            Self::NetworkUnreachable => "network_unreachable",
            Self::ConnectionReset => "connection_reset",
            Self::ConnectionClosed => "connection_closed",
            Self::ConnectionError => "connection_error",
            Self::DnsResolutionFailed => "dns_resolution_failed",
            Self::TlsError => "tls_error",
            Self::CertificateUntrusted => "certificate_untrusted",
            Self::CertificateExpired => "certificate_expired",
            Self::NotFound => "not_found",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::UnexpectedResponse => "unexpected_response",
            Self::NoInstances => "no_instances",
            Self::NotReady => "not_ready",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
