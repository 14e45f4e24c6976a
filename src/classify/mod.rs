//! Error classification
//!
//! Every probe failure is reduced to an [`ErrorCategory`] before it reaches
//! the metric sink. Each backend family has its own ordered rule table; HTTP
//! responses go through [`HttpStatusClassifier`]. All of them implement
//! [`Classifier`], where an absent error always means healthy.

mod category;
mod http;
mod rules;

pub use category::ErrorCategory;
pub use http::HttpStatusClassifier;
pub use rules::{DATABASE, DNS, OBJECT_STORE, PLATFORM_API, REGISTRY, Rule, RuleTable};

/// Total, deterministic mapping from a raw failure to a category
pub trait Classifier<E: ?Sized> {
    fn classify(&self, raw: Option<&E>) -> ErrorCategory;
}
