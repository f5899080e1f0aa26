//! Backend services for Tablescope.
//!
//! - `identifier` - Identifier validation and table references
//! - `connection` - Database connection pooling with deadpool-postgres
//! - `catalog` - Table and column listing from information_schema
//! - `profiler` - Null, distinct, numeric and duplicate-row statistics
//! - `histogram` - Equal-width histograms
//! - `report` - Table profiling report assembly
//! - `preview` - Bounded row previews

pub mod catalog;
pub mod connection;
pub mod histogram;
pub mod identifier;
pub mod preview;
pub mod profiler;
pub mod report;

pub use catalog::CatalogService;
pub use connection::{ConnectionPool, PooledConnection};
pub use histogram::HistogramService;
pub use identifier::{Identifier, TableRef};
pub use preview::PreviewService;
pub use profiler::{ColumnProfiler, NumericDomain, RowProfiler};
pub use report::{ReportService, StatsSource};
