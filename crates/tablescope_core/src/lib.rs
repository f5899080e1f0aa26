//! Query generation and statistics engine for Tablescope.
//!
//! This crate provides the service layer behind the HTTP API:
//!
//! - **error**: Error handling with PostgreSQL-specific details
//! - **config**: Environment-driven process configuration
//! - **logging**: Structured logging setup
//! - **models**: Report, histogram and preview data structures
//! - **services**: Identifier validation, catalog reading, profiling, pooling

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::ServiceConfig;
pub use error::{TablescopeError, TablescopeResult};
pub use models::{
    ColumnMeta, ColumnMetrics, HistogramBucket, HistogramReport, NumericStats, NumericValue,
    PoolStatus, Preview, ProfilingReport, RowStats, TableSummary,
};
pub use services::{
    CatalogService, ConnectionPool, HistogramService, Identifier, PreviewService, ReportService,
    TableRef,
};
