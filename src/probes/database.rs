//! MySQL reachability: connect, then ping

use super::{EntityKey, Probe, ProbeContext, ProbeOutcome};
use crate::classify::{Classifier, DATABASE};
use crate::config::DatabaseInstance;
use crate::monitoring::catalog::ProbeKind;
use crate::utils::error::error_chain;
use async_trait::async_trait;
use sea_orm::sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sea_orm::sqlx::{ConnectOptions, Connection};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

pub const DATABASE_TIMEOUT: Duration = Duration::from_secs(5);

/// Which step of the check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStage {
    Connect,
    Ping,
}

impl DatabaseStage {
    pub fn error_type(self) -> &'static str {
        match self {
            Self::Connect => "connection_failed",
            Self::Ping => "ping_failed",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DatabaseFailure {
    pub stage: DatabaseStage,
    pub message: String,
}

impl DatabaseFailure {
    pub fn new(stage: DatabaseStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Opens a fresh session to an instance and pings it
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    async fn connect_and_ping(&self, instance: &DatabaseInstance) -> Result<(), DatabaseFailure>;
}

/// [`DatabaseConnector`] over one unpooled sqlx connection
///
/// No pool: a pool retries refused connects until its acquire timeout, which
/// would turn every refusal into a timeout.
#[derive(Debug, Default, Clone)]
pub struct SeaOrmConnector;

impl SeaOrmConnector {
    fn options(instance: &DatabaseInstance) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&instance.host)
            .port(instance.port)
            .username(&instance.user)
            .database(&instance.database);
        if !instance.password.is_empty() {
            options = options.password(&instance.password);
        }
        options.log_statements(log::LevelFilter::Debug)
    }
}

#[async_trait]
impl DatabaseConnector for SeaOrmConnector {
    async fn connect_and_ping(&self, instance: &DatabaseInstance) -> Result<(), DatabaseFailure> {
        let mut conn = MySqlConnection::connect_with(&Self::options(instance))
            .await
            .map_err(|e| DatabaseFailure::new(DatabaseStage::Connect, error_chain(&e)))?;

        let ping = conn
            .ping()
            .await
            .map_err(|e| DatabaseFailure::new(DatabaseStage::Ping, error_chain(&e)));

        if let Err(e) = conn.close().await {
            debug!(instance = %instance.name, error = %e, "failed to close probe connection");
        }

        ping
    }
}

/// Probe for one configured MySQL instance
pub struct DatabaseProbe {
    instance: DatabaseInstance,
    connector: Arc<dyn DatabaseConnector>,
}

impl DatabaseProbe {
    pub fn new(instance: DatabaseInstance, connector: Arc<dyn DatabaseConnector>) -> Self {
        Self {
            instance,
            connector,
        }
    }
}

#[async_trait]
impl Probe for DatabaseProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::DATABASE
    }

    fn entity(&self) -> EntityKey {
        EntityKey::singleton()
            .with("instance", &self.instance.name)
            .with("host", &self.instance.host)
            .with("port", self.instance.port.to_string())
    }

    fn timeout(&self) -> Duration {
        DATABASE_TIMEOUT
    }

    async fn check(&self, ctx: &ProbeContext) -> ProbeOutcome {
        match ctx.call(self.connector.connect_and_ping(&self.instance)).await {
            Ok(Ok(())) => ProbeOutcome::Healthy,
            Ok(Err(failure)) => ProbeOutcome::unhealthy(
                DATABASE.classify(Some(failure.message.as_str())),
                failure.stage.error_type(),
                failure.message,
            ),
            Err(interrupted) => {
                ProbeOutcome::interrupted(interrupted, DatabaseStage::Connect.error_type())
            }
        }
    }
}
