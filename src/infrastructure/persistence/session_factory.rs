use std::str::FromStr;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use tracing::{info, instrument, warn};

use super::{DatabaseSettings, DbSession};
use crate::application::ports::{RepositoryError, SessionProvider, with_scoped_session};

/// Hands out [`DbSession`]s backed by one shared, lazily-connected pool.
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Debug, Clone)]
pub struct SessionFactory {
    pool: PgPool,
}

impl SessionFactory {
    /// Builds the pool without opening any connection. Connections are
    /// established on first acquisition.
    pub fn new(settings: &DatabaseSettings) -> Result<Self, RepositoryError> {
        let mut options = PgConnectOptions::from_str(&settings.url)
            .map_err(|e| RepositoryError::InvalidUrl(e.to_string()))?;

        if !settings.log_statements {
            options = options.disable_statement_logging();
        }

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy_with(options);

        info!(
            max_connections = settings.max_connections,
            acquire_timeout_ms = settings.acquire_timeout.as_millis() as u64,
            "PostgreSQL session factory created"
        );

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[instrument(skip(self))]
    pub async fn session(&self) -> Result<DbSession, RepositoryError> {
        let connection = self.pool.acquire().await.map_err(|e| {
            warn!(error = %e, "Failed to acquire database session");
            RepositoryError::ConnectionFailed(e.to_string())
        })?;

        Ok(DbSession::new(connection))
    }

    /// Runs `work` with a fresh session and closes the session afterwards,
    /// whether `work` succeeded or not.
    pub async fn with_session<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut DbSession) -> BoxFuture<'s, Result<T, E>>,
        E: From<RepositoryError>,
    {
        with_scoped_session(self, work).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}

#[async_trait]
impl SessionProvider for SessionFactory {
    type Session = DbSession;

    async fn acquire(&self) -> Result<DbSession, RepositoryError> {
        self.session().await
    }
}
