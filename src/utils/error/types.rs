//! Error types for the health console

use thiserror::Error;

/// Result type alias for the health console
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Main error type for the health console
///
/// Probe failures never surface as `ConsoleError`: they are folded into an
/// [`ErrorCategory`](crate::classify::ErrorCategory) and a metric value. This
/// type covers setup paths only (configuration, client construction, the
/// HTTP server).
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metric registration errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Cluster API client setup errors
    #[error("Cluster client error: {0}")]
    Cluster(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),
}
