//! HTTP status code classification

use super::{Classifier, ErrorCategory};

/// Maps an HTTP status code onto the error taxonomy
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpStatusClassifier;

impl HttpStatusClassifier {
    pub fn status(&self, code: u16) -> ErrorCategory {
        self.classify(Some(&code))
    }
}

impl Classifier<u16> for HttpStatusClassifier {
    fn classify(&self, raw: Option<&u16>) -> ErrorCategory {
        let Some(&code) = raw else {
            return ErrorCategory::Healthy;
        };

        match code {
            200..=299 => ErrorCategory::Healthy,
            401 => ErrorCategory::AuthFailed,
            403 => ErrorCategory::Forbidden,
            404 => ErrorCategory::NotFound,
            408 => ErrorCategory::Timeout,
            429 => ErrorCategory::CapacityExceeded,
            100..=199 | 300..=399 | 400..=499 => ErrorCategory::UnexpectedResponse,
            500..=599 => ErrorCategory::UpstreamUnavailable,
            _ => ErrorCategory::Unknown,
        }
    }
}
