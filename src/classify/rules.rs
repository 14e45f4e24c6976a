//! Ordered substring rule tables, one per backend family

use super::{Classifier, ErrorCategory};
use crate::utils::error::error_chain;
use std::error::Error as StdError;

/// One `(patterns, category)` row; any pattern matching selects the row
#[derive(Debug)]
pub struct Rule {
    pub patterns: &'static [&'static str],
    pub category: ErrorCategory,
}

/// Priority-ordered rules evaluated top to bottom, first match wins
#[derive(Debug)]
pub struct RuleTable {
    pub name: &'static str,
    pub rules: &'static [Rule],
    pub fallback: ErrorCategory,
}

impl RuleTable {
    /// Classify an error by its flattened source chain
    pub fn classify_error(&self, error: &(dyn StdError + 'static)) -> ErrorCategory {
        self.classify(Some(error_chain(error).as_str()))
    }

    /// Category of the first matching rule, `None` when only the fallback applies
    pub fn matched(&self, text: &str) -> Option<ErrorCategory> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.patterns.iter().any(|p| lowered.contains(p)))
            .map(|rule| rule.category)
    }

    fn matching(&self, text: &str) -> ErrorCategory {
        self.matched(text).unwrap_or(self.fallback)
    }
}

impl Classifier<str> for RuleTable {
    fn classify(&self, raw: Option<&str>) -> ErrorCategory {
        match raw {
            None => ErrorCategory::Healthy,
            Some(text) => self.matching(text),
        }
    }
}

const fn rule(patterns: &'static [&'static str], category: ErrorCategory) -> Rule {
    Rule { patterns, category }
}

const TIMEOUT: &[&str] = &["timeout", "timed out", "deadline exceeded"];
const REFUSED: &[&str] = &["connection refused"];
const UNREACHABLE: &[&str] = &["no route to host", "network is unreachable"];
const RESET: &[&str] = &["connection reset"];
const RESOLVE: &[&str] = &[
    "no such host",
    "could not resolve",
    "failed to lookup address",
    "name or service not known",
    "dns error",
];

pub static DATABASE: RuleTable = RuleTable {
    name: "database",
    rules: &[
        rule(&["access denied", "authentication"], ErrorCategory::AuthFailed),
        rule(TIMEOUT, ErrorCategory::Timeout),
        rule(REFUSED, ErrorCategory::ConnectionRefused),
        rule(UNREACHABLE, ErrorCategory::NetworkUnreachable),
        rule(RESET, ErrorCategory::ConnectionReset),
        rule(RESOLVE, ErrorCategory::DnsResolutionFailed),
        rule(&["too many connections"], ErrorCategory::CapacityExceeded),
        rule(&["unknown database"], ErrorCategory::NotFound),
        rule(&["tls", "ssl", "certificate"], ErrorCategory::TlsError),
        rule(&["connection"], ErrorCategory::ConnectionError),
    ],
    fallback: ErrorCategory::Unknown,
};

pub static PLATFORM_API: RuleTable = RuleTable {
    name: "platform_api",
    rules: &[
        rule(&["unauthorized", "authentication"], ErrorCategory::AuthFailed),
        rule(&["forbidden", "authorization"], ErrorCategory::Forbidden),
        rule(TIMEOUT, ErrorCategory::Timeout),
        rule(REFUSED, ErrorCategory::ConnectionRefused),
        rule(UNREACHABLE, ErrorCategory::NetworkUnreachable),
        rule(RESET, ErrorCategory::ConnectionReset),
        rule(RESOLVE, ErrorCategory::DnsResolutionFailed),
        rule(&["tls", "x509", "certificate"], ErrorCategory::TlsError),
        rule(&["not found"], ErrorCategory::NotFound),
        rule(
            &[
                "server could not find",
                "currently unable",
                "service unavailable",
            ],
            ErrorCategory::UpstreamUnavailable,
        ),
        rule(&["connection"], ErrorCategory::ConnectionError),
    ],
    fallback: ErrorCategory::Unknown,
};

pub static OBJECT_STORE: RuleTable = RuleTable {
    name: "object_store",
    rules: &[
        rule(
            &[
                "access denied",
                "accessdenied",
                "invalidaccesskeyid",
                "invalid access key",
                "signaturedoesnotmatch",
                "signature",
            ],
            ErrorCategory::AuthFailed,
        ),
        rule(TIMEOUT, ErrorCategory::Timeout),
        rule(REFUSED, ErrorCategory::ConnectionRefused),
        rule(UNREACHABLE, ErrorCategory::NetworkUnreachable),
        rule(RESET, ErrorCategory::ConnectionReset),
        rule(RESOLVE, ErrorCategory::DnsResolutionFailed),
        rule(&["tls", "x509", "certificate"], ErrorCategory::TlsError),
        rule(&["bucket"], ErrorCategory::NotFound),
        rule(&["connection", "dispatch failure"], ErrorCategory::ConnectionError),
    ],
    fallback: ErrorCategory::Unknown,
};

pub static REGISTRY: RuleTable = RuleTable {
    name: "registry",
    rules: &[
        rule(
            &[
                "unknown authority",
                "unknownissuer",
                "unknown issuer",
                "self-signed",
                "self signed",
            ],
            ErrorCategory::CertificateUntrusted,
        ),
        rule(
            &["certificate has expired", "certificate: expired"],
            ErrorCategory::CertificateExpired,
        ),
        rule(&["tls", "x509", "certificate"], ErrorCategory::TlsError),
        rule(TIMEOUT, ErrorCategory::Timeout),
        rule(REFUSED, ErrorCategory::ConnectionRefused),
        rule(UNREACHABLE, ErrorCategory::NetworkUnreachable),
        rule(RESET, ErrorCategory::ConnectionReset),
        rule(RESOLVE, ErrorCategory::DnsResolutionFailed),
        rule(&["ssl"], ErrorCategory::TlsError),
        rule(
            &["eof", "unexpected end", "connection closed"],
            ErrorCategory::ConnectionClosed,
        ),
        rule(&["connection"], ErrorCategory::ConnectionError),
    ],
    fallback: ErrorCategory::Unknown,
};

pub static DNS: RuleTable = RuleTable {
    name: "dns",
    rules: &[
        rule(
            &[
                "no such host",
                "nxdomain",
                "name or service not known",
                "failed to lookup address",
                "no address",
            ],
            ErrorCategory::DnsResolutionFailed,
        ),
        rule(
            &["server misbehaving", "servfail", "temporary failure"],
            ErrorCategory::UpstreamUnavailable,
        ),
        rule(TIMEOUT, ErrorCategory::Timeout),
    ],
    fallback: ErrorCategory::DnsResolutionFailed,
};
