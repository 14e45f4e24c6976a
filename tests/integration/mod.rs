//! Integration tests for health-console
//!
//! Collectors and probes run through the public API against fakes and
//! `wiremock` servers; nothing here needs a real database or cluster.

pub mod cluster_client_tests;
pub mod cluster_collector_tests;
pub mod config_tests;
pub mod database_collector_tests;
pub mod registry_probe_tests;
