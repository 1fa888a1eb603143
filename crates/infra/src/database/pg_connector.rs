//! Connection factory handed to the connection supervisor

use std::sync::Arc;

use async_trait::async_trait;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Config as PgConfig, NoTls};
use tollgate_core::ports::{GameConnector, GameStore};
use tollgate_domain::{DatabaseConfig, Result, TollgateError};
use tracing::{debug, warn};

use super::pg_store::{map_pg_error, PgGameStore};
use crate::errors::InfraError;

pub struct PgConnector {
    config: PgConfig,
    require_tls: bool,
}

impl PgConnector {
    /// Parse a connection URL or key-value string
    pub fn new(url: &str, require_tls: bool) -> Result<Self> {
        let config = url
            .parse::<PgConfig>()
            .map_err(|e| TollgateError::Config(format!("invalid database url: {e}")))?;
        Ok(Self { config, require_tls })
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let mut connector = Self::new(&config.url, config.require_tls)?;
        connector.config.connect_timeout(config.connection_timeout());
        Ok(connector)
    }

    /// Open a connection and return the concrete store (migrations need it)
    pub async fn connect_store(&self) -> Result<PgGameStore> {
        if self.require_tls {
            let tls = MakeTlsConnector::new(
                TlsConnector::new().map_err(|e| TollgateError::from(InfraError::from(e)))?,
            );
            let (client, connection) = self.config.connect(tls).await.map_err(map_pg_error)?;
            let task = tokio::spawn(async move {
                if let Err(e) = connection.await {
                    warn!(error = %e, "database connection terminated");
                }
            });
            Ok(PgGameStore::new(client, task))
        } else {
            let (client, connection) = self.config.connect(NoTls).await.map_err(map_pg_error)?;
            let task = tokio::spawn(async move {
                if let Err(e) = connection.await {
                    warn!(error = %e, "database connection terminated");
                }
            });
            Ok(PgGameStore::new(client, task))
        }
    }
}

#[async_trait]
impl GameConnector for PgConnector {
    async fn connect(&self) -> Result<Arc<dyn GameStore>> {
        debug!(tls = self.require_tls, "opening database connection");
        let store = self.connect_store().await?;
        Ok(Arc::new(store))
    }
}
