//! Data models for Tablescope.
//!
//! - `catalog` - TableSummary, ColumnMeta
//! - `profile` - ProfilingReport, ColumnMetrics, NumericStats, RowStats
//! - `histogram` - HistogramBucket, HistogramReport
//! - `preview` - Preview
//! - `pool` - PoolStatus

pub mod catalog;
pub mod histogram;
pub mod pool;
pub mod preview;
pub mod profile;

pub use catalog::{ColumnMeta, TableSummary};
pub use histogram::{HistogramBucket, HistogramReport, DEFAULT_BUCKETS, MAX_BUCKETS};
pub use pool::PoolStatus;
pub use preview::{Preview, PreviewRow, DEFAULT_PREVIEW_LIMIT};
pub use profile::{
    ColumnMetrics, NumericStats, NumericStatsOutcome, NumericValue, ProfilingReport, RowStats,
};
