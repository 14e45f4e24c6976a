//! In-process stand-ins for external backends

use async_trait::async_trait;
use health_console::config::DatabaseInstance;
use health_console::probes::cluster::Resolver;
use health_console::probes::database::{DatabaseConnector, DatabaseFailure};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Database backend keyed by host; unknown hosts are reachable
#[derive(Default)]
pub struct FakeConnector {
    failures: HashMap<String, DatabaseFailure>,
    calls: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn failing(mut self, host: &str, failure: DatabaseFailure) -> Self {
        self.failures.insert(host.to_string(), failure);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DatabaseConnector for FakeConnector {
    async fn connect_and_ping(&self, instance: &DatabaseInstance) -> Result<(), DatabaseFailure> {
        self.calls.lock().push(instance.host.clone());
        match self.failures.get(&instance.host) {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

/// Resolver answering every name with the same result
pub struct FixedResolver(pub Result<usize, String>);

#[async_trait]
impl Resolver for FixedResolver {
    async fn resolve(&self, _name: &str) -> Result<usize, String> {
        self.0.clone()
    }
}
