//! Shared utilities: errors and logging

pub mod error;
pub mod logging;
