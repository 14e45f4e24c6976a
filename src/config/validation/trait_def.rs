//! Validation trait definition
//!
//! This module defines the core Validate trait used by all configuration structures.

use crate::utils::error::{ConsoleError, Result};

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> std::result::Result<(), String>;

    /// Validate and wrap any failure as a [`ConsoleError::Config`]
    fn ensure_valid(&self, section: &str) -> Result<()> {
        self.validate()
            .map_err(|e| ConsoleError::config(format!("{section} config error: {e}")))
    }
}
