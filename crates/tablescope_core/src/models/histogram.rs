//! Histogram models.

use serde::Serialize;

/// Default number of equal-width buckets.
pub const DEFAULT_BUCKETS: i32 = 20;

/// Upper bound accepted for the bucket count.
pub const MAX_BUCKETS: i32 = 1000;

/// One non-empty bucket of an equal-width histogram.
///
/// `min` and `max` are the column-wide extremes the bucket width was derived
/// from, identical across every bucket of one histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBucket {
    /// 1-based bucket index.
    pub bucket: i32,
    pub count: i64,
    pub min: f64,
    pub max: f64,
}

/// Response body of `/api/histogram`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramReport {
    /// Qualified `schema.table` name.
    pub table: String,
    pub column: String,
    /// Requested bucket count.
    pub buckets: i32,
    /// Buckets with at least one value, by ascending index.
    pub histogram: Vec<HistogramBucket>,
}

impl HistogramReport {
    /// Total number of values across all buckets.
    pub fn total_count(&self) -> i64 {
        self.histogram.iter().map(|b| b.count).sum()
    }
}
