//! Error handling utilities
//!
//! This module defines the setup-path error type and the helper that
//! flattens client errors for classification.

mod helpers;
#[cfg(test)]
mod tests;
mod types;

// Re-export commonly used types and functions
pub use helpers::error_chain;
pub use types::{ConsoleError, Result};
