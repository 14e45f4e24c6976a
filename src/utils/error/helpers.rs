//! Helper functions for creating specific error types

use super::types::ConsoleError;
use std::error::Error as StdError;

/// Helper functions for creating specific errors
impl ConsoleError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn cluster<S: Into<String>>(message: S) -> Self {
        Self::Cluster(message.into())
    }

    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Server(message.into())
    }
}

/// Flatten an error and all of its sources into one line
///
/// Client libraries wrap the interesting part (`connection refused`,
/// `UnknownIssuer`, ...) several sources deep, and the classifiers match on
/// substrings, so the whole chain is joined with `": "`. Consecutive
/// duplicates are skipped since some wrappers repeat their inner message.
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = vec![error.to_string()];
    let mut source = error.source();

    while let Some(inner) = source {
        let text = inner.to_string();
        if parts.last().is_none_or(|last| !last.contains(&text)) {
            parts.push(text);
        }
        source = inner.source();
    }

    parts.join(": ")
}
