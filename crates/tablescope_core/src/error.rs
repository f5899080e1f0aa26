//! Error types for the Tablescope profiler.
//!
//! Every failure a capability can report is a `TablescopeError`. Column-level
//! numeric statistics failures are not errors of the report; they are carried
//! as [`crate::models::NumericStatsOutcome::Failed`] on the affected column.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type TablescopeResult<T> = Result<T, TablescopeError>;

/// Main error type for Tablescope.
#[derive(Debug, Error)]
pub enum TablescopeError {
    /// A schema, table or column name failed the identifier grammar.
    #[error("{reason}")]
    InvalidIdentifier {
        /// The rejected input, verbatim.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A value parameter (bucket count, row limit) was malformed or out of range.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Query parameter name.
        name: String,
        /// Human-readable error message.
        message: String,
    },

    /// The catalog reports no columns for the table.
    #[error("Table {table} not found")]
    NotFound {
        /// Qualified `schema.table` name.
        table: String,
    },

    /// Error reported by PostgreSQL while running a query.
    #[error("{message}")]
    Database {
        /// PostgreSQL error message.
        message: String,
        /// Additional detail from PostgreSQL.
        detail: Option<String>,
        /// PostgreSQL hint.
        hint: Option<String>,
        /// SQLSTATE code (e.g., "42P01").
        code: Option<String>,
    },

    /// Connection could not be established or was lost.
    #[error("Connection error: {message}")]
    Connection {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connection pool exhausted.
    #[error("Pool timeout: {message}")]
    PoolTimeout {
        /// Human-readable error message.
        message: String,
        /// Number of tasks waiting for connections.
        waiting: usize,
    },

    /// Missing or malformed process configuration.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Unexpected internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl TablescopeError {
    // ========== Constructors ==========

    /// Create an invalid identifier error.
    pub fn invalid_identifier(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier { name: name.into(), reason: reason.into() }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter { name: name.into(), message: message.into() }
    }

    /// Create a not found error for a qualified table name.
    pub fn not_found(table: impl Into<String>) -> Self {
        Self::NotFound { table: table.into() }
    }

    /// Create a database error carrying only a message.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database { message: message.into(), detail: None, hint: None, code: None }
    }

    /// Create a new pool timeout error.
    pub fn pool_timeout(message: impl Into<String>, waiting: usize) -> Self {
        Self::PoolTimeout { message: message.into(), waiting }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    // ========== Methods ==========

    /// True for errors caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidIdentifier { .. } | Self::InvalidParameter { .. })
    }

    /// True when the requested table does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "InvalidIdentifier",
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::NotFound { .. } => "NotFound",
            Self::Database { .. } => "Database",
            Self::Connection { .. } => "Connection",
            Self::PoolTimeout { .. } => "Pool",
            Self::Config { .. } => "Config",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Get PostgreSQL SQLSTATE code (if applicable).
    pub fn pg_code(&self) -> Option<&str> {
        match self {
            Self::Database { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Convert from tokio_postgres::Error to TablescopeError.
impl From<tokio_postgres::Error> for TablescopeError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let message = db_err.message().to_string();
            let code_str = db_err.code().code();

            // Connection exceptions (08xxx)
            if code_str.starts_with("08") {
                return TablescopeError::Connection { message, source: Some(Box::new(err)) };
            }

            return TablescopeError::Database {
                message,
                detail: db_err.detail().map(String::from),
                hint: db_err.hint().map(String::from),
                code: Some(code_str.to_string()),
            };
        }

        if err.is_closed() {
            return TablescopeError::Connection {
                message: "Connection closed".to_string(),
                source: Some(Box::new(err)),
            };
        }

        // Decoding failures and other client-side errors
        TablescopeError::database(err.to_string())
    }
}

/// Convert from deadpool pool errors to TablescopeError.
impl From<deadpool_postgres::PoolError> for TablescopeError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Backend(e) if e.as_db_error().is_some() => {
                TablescopeError::from(e)
            }
            deadpool_postgres::PoolError::Backend(e) => TablescopeError::Connection {
                message: format!("Failed to connect: {e}"),
                source: Some(Box::new(e)),
            },
            other => TablescopeError::Connection {
                message: format!("Failed to acquire connection: {other}"),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(TablescopeError::invalid_identifier("a;b", "bad").is_client_error());
        assert!(TablescopeError::invalid_parameter("buckets", "must be positive").is_client_error());
        assert!(!TablescopeError::not_found("public.t").is_client_error());
        assert!(!TablescopeError::database("boom").is_client_error());
    }

    #[test]
    fn test_not_found_message() {
        let err = TablescopeError::not_found("public.orders");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Table public.orders not found");
        assert_eq!(err.category(), "NotFound");
    }

    #[test]
    fn test_internal_error() {
        let err = TablescopeError::internal("Failed to encode response: key must be a string");
        assert!(!err.is_client_error());
        assert!(!err.is_not_found());
        assert_eq!(err.category(), "Internal");
        assert_eq!(
            err.to_string(),
            "Internal error: Failed to encode response: key must be a string"
        );
    }

    #[test]
    fn test_database_error_message_is_verbatim() {
        let err = TablescopeError::database("relation \"x\" does not exist");
        assert_eq!(err.to_string(), "relation \"x\" does not exist");
        assert_eq!(err.pg_code(), None);
    }
}
