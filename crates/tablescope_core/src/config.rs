//! Process configuration resolved once at startup.
//!
//! All settings come from environment variables. `DATABASE_URL` is required;
//! everything else has a default.

use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{TablescopeError, TablescopeResult};

/// Environment variable holding the PostgreSQL connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

const HOST_VAR: &str = "TABLESCOPE_HOST";
const PORT_VAR: &str = "TABLESCOPE_PORT";
const POOL_SIZE_VAR: &str = "TABLESCOPE_POOL_SIZE";
const POOL_TIMEOUT_VAR: &str = "TABLESCOPE_POOL_TIMEOUT_SECS";
const CONNECT_TIMEOUT_VAR: &str = "TABLESCOPE_CONNECT_TIMEOUT_SECS";
const MAX_PREVIEW_ROWS_VAR: &str = "TABLESCOPE_MAX_PREVIEW_ROWS";
const LOG_DIR_VAR: &str = "TABLESCOPE_LOG_DIR";

/// Default number of pooled database sessions.
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Default preview clamp.
pub const DEFAULT_MAX_PREVIEW_ROWS: i64 = 1000;

/// Runtime configuration for the service.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Parsed connection settings.
    pub database: tokio_postgres::Config,
    /// Listen address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Maximum number of pooled sessions.
    pub pool_max_size: usize,
    /// How long a request waits for a free session.
    pub pool_wait_timeout: Duration,
    /// Connect timeout for new sessions.
    pub connect_timeout: Duration,
    /// Upper bound applied to preview row limits.
    pub max_preview_rows: i64,
    /// Directory for rotating log files, if file logging is wanted.
    pub log_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> TablescopeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> TablescopeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dsn = lookup(DATABASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                TablescopeError::config(format!("{DATABASE_URL_VAR} env var is not set"))
            })?;

        let database = tokio_postgres::Config::from_str(&dsn).map_err(|e| {
            TablescopeError::config(format!("{DATABASE_URL_VAR} is not a valid connection string: {e}"))
        })?;

        let pool_max_size = parse_or(&lookup, POOL_SIZE_VAR, DEFAULT_POOL_SIZE)?;
        if pool_max_size == 0 {
            return Err(TablescopeError::config(format!("{POOL_SIZE_VAR} must be at least 1")));
        }

        let max_preview_rows = parse_or(&lookup, MAX_PREVIEW_ROWS_VAR, DEFAULT_MAX_PREVIEW_ROWS)?;
        if max_preview_rows < 0 {
            return Err(TablescopeError::config(format!("{MAX_PREVIEW_ROWS_VAR} must not be negative")));
        }

        Ok(Self {
            database,
            host: parse_or(&lookup, HOST_VAR, IpAddr::from([127, 0, 0, 1]))?,
            port: parse_or(&lookup, PORT_VAR, 8080)?,
            pool_max_size,
            pool_wait_timeout: Duration::from_secs(parse_or(&lookup, POOL_TIMEOUT_VAR, 30)?),
            connect_timeout: Duration::from_secs(parse_or(&lookup, CONNECT_TIMEOUT_VAR, 10)?),
            max_preview_rows,
            log_dir: lookup(LOG_DIR_VAR).filter(|v| !v.is_empty()).map(PathBuf::from),
        })
    }
}

// Connection strings may carry a password, so Debug shows only the target.
impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("database", &self.database.get_dbname())
            .field("host", &self.host)
            .field("port", &self.port)
            .field("pool_max_size", &self.pool_max_size)
            .field("pool_wait_timeout", &self.pool_wait_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_preview_rows", &self.max_preview_rows)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> TablescopeResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| TablescopeError::config(format!("{key}={raw:?} is invalid: {e}"))),
    }
}
