//! Database connection pooling with deadpool-postgres.
//!
//! Provides:
//! - Lazy pool construction from the process configuration
//! - Read-only sessions
//! - Startup connectivity check
//! - Pool status reporting
//! - Configurable timeout on pool exhaustion

use crate::config::ServiceConfig;
use crate::error::{TablescopeError, TablescopeResult};
use crate::models::PoolStatus;

use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

/// Server option applied to every session so profiling can never write.
const READ_ONLY_OPTION: &str = "-c default_transaction_read_only=on";

/// A managed pool of read-only database sessions.
///
/// Cloning is cheap; clones share the same underlying pool.
#[derive(Clone)]
pub struct ConnectionPool {
    pool: Pool,
}

impl ConnectionPool {
    /// Build a pool from the service configuration.
    ///
    /// No connection is made until the first session is requested.
    pub fn new(config: &ServiceConfig) -> TablescopeResult<Self> {
        let mut pg_config = config.database.clone();
        let options = match pg_config.get_options() {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{existing} {READ_ONLY_OPTION}")
            }
            _ => READ_ONLY_OPTION.to_string(),
        };
        pg_config.options(&options);
        if pg_config.get_application_name().is_none() {
            pg_config.application_name("tablescope");
        }
        pg_config.connect_timeout(config.connect_timeout);

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig { recycling_method: RecyclingMethod::Fast },
        );

        let pool = Pool::builder(manager)
            .max_size(config.pool_max_size)
            .wait_timeout(Some(config.pool_wait_timeout))
            .create_timeout(Some(config.connect_timeout))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| TablescopeError::config(format!("Failed to create pool: {e}")))?;

        Ok(Self { pool })
    }

    /// Establish one session and run `SELECT 1`.
    pub async fn verify(&self) -> TablescopeResult<()> {
        let conn = self.get().await?;
        conn.query("SELECT 1", &[]).await?;
        tracing::info!(max_size = self.status().max_size, "Database connectivity verified");
        Ok(())
    }

    /// Acquire a session from the pool.
    ///
    /// Waits up to the configured timeout if the pool is exhausted.
    pub async fn get(&self) -> TablescopeResult<PooledConnection> {
        let client = self.pool.get().await.map_err(|e| match e {
            PoolError::Timeout(_) => {
                let waiting = self.status().waiting;
                TablescopeError::pool_timeout(
                    format!("Timed out waiting for a database session: {e}"),
                    waiting,
                )
            }
            other => TablescopeError::from(other),
        })?;

        Ok(PooledConnection { client })
    }

    /// Get current pool status.
    pub fn status(&self) -> PoolStatus {
        let status = self.pool.status();
        PoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available as isize,
            waiting: status.waiting,
        }
    }

    /// Close the pool, dropping all connections.
    pub fn close(&self) {
        self.pool.close();
        tracing::info!("Connection pool closed");
    }
}

/// A session acquired from the pool.
///
/// Automatically returns to the pool when dropped, on every exit path.
pub struct PooledConnection {
    client: deadpool_postgres::Client,
}

impl PooledConnection {
    /// Execute a query that returns rows.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> TablescopeResult<Vec<tokio_postgres::Row>> {
        self.client.query(sql, params).await.map_err(TablescopeError::from)
    }

    /// Execute a query that returns exactly one row.
    pub async fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> TablescopeResult<tokio_postgres::Row> {
        self.client.query_one(sql, params).await.map_err(TablescopeError::from)
    }

    /// Prepare a statement, exposing its result columns without running it.
    pub async fn prepare(&self, sql: &str) -> TablescopeResult<tokio_postgres::Statement> {
        self.client.prepare(sql).await.map_err(TablescopeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServiceConfig {
        ServiceConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://profiler@127.0.0.1:1/warehouse".to_string()),
            "TABLESCOPE_POOL_SIZE" => Some("3".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_pool_is_built_lazily() {
        let pool = ConnectionPool::new(&config()).unwrap();
        let status = pool.status();
        assert_eq!(status.max_size, 3);
        assert_eq!(status.size, 0);
        assert_eq!(status.waiting, 0);
    }

    #[tokio::test]
    async fn test_closed_pool_refuses_sessions() {
        let pool = ConnectionPool::new(&config()).unwrap();
        pool.close();
        let err = pool.get().await.err().unwrap();
        assert!(matches!(err, TablescopeError::Connection { .. }));
    }
}
