//! Profiling report models.
//!
//! Wire names are camelCase. Column metrics use the short `nulls` / `unique`
//! keys clients already consume.

use serde::Serialize;

/// A numeric value in the column's own domain.
///
/// Integer columns keep integer values; every other numeric type is rendered
/// as floating point, accepting precision loss for `numeric`/`decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumericValue {
    /// smallint / integer / bigint
    Int(i64),
    /// real / double precision / numeric / decimal
    Float(f64),
}

/// Distribution summary of the non-null values of a numeric column.
///
/// Everything except `n` is absent when the column has no non-null values;
/// `stddev` is also absent when `n < 2`. Quartiles are discrete: each is a
/// value present in the column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    /// Count of non-null values.
    pub n: i64,
    pub min: Option<NumericValue>,
    pub max: Option<NumericValue>,
    pub mean: Option<f64>,
    /// Sample standard deviation.
    pub stddev: Option<f64>,
    pub q1: Option<NumericValue>,
    pub median: Option<NumericValue>,
    pub q3: Option<NumericValue>,
}

/// Result of the numeric statistics step for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericStatsOutcome {
    /// The column is numeric and statistics were computed.
    Computed(NumericStats),
    /// The column is numeric but the statistics query failed.
    Failed(String),
    /// The column type is not numeric; no statistics were attempted.
    NotApplicable,
}

/// Metrics for one column of a profiled table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetrics {
    pub name: String,
    pub data_type: String,
    /// Rows where the column is NULL.
    #[serde(rename = "nulls")]
    pub null_count: i64,
    /// Distinct non-null values.
    #[serde(rename = "unique")]
    pub distinct_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_stats: Option<NumericStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_stats_error: Option<String>,
}

impl ColumnMetrics {
    /// Build column metrics, folding the numeric outcome into the two
    /// mutually exclusive optional fields.
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        null_count: i64,
        distinct_count: i64,
        outcome: NumericStatsOutcome,
    ) -> Self {
        let (numeric_stats, numeric_stats_error) = match outcome {
            NumericStatsOutcome::Computed(stats) => (Some(stats), None),
            NumericStatsOutcome::Failed(message) => (None, Some(message)),
            NumericStatsOutcome::NotApplicable => (None, None),
        };
        Self {
            name: name.into(),
            data_type: data_type.into(),
            null_count,
            distinct_count,
            numeric_stats,
            numeric_stats_error,
        }
    }
}

/// Whole-row statistics for a table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowStats {
    pub total_rows: i64,
    /// Rows beyond the first occurrence of each distinct full-row tuple.
    pub duplicate_rows: i64,
    /// `duplicate_rows / total_rows`, 0.0 for an empty table.
    pub duplicate_pct: f64,
}

impl RowStats {
    /// Build row statistics from the total and distinct-tuple counts.
    ///
    /// Negative inputs are clamped to zero so `duplicate_rows <= total_rows`
    /// always holds.
    pub fn from_counts(total_rows: i64, duplicate_rows: i64) -> Self {
        let total_rows = total_rows.max(0);
        let duplicate_rows = duplicate_rows.clamp(0, total_rows);
        let duplicate_pct =
            if total_rows == 0 { 0.0 } else { duplicate_rows as f64 / total_rows as f64 };
        Self { total_rows, duplicate_rows, duplicate_pct }
    }
}

/// Table-level profiling report returned by `/api/summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilingReport {
    /// Qualified `schema.table` name.
    pub table: String,
    pub row_stats: RowStats,
    /// One entry per column, in ordinal order.
    pub columns: Vec<ColumnMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_stats_empty_table() {
        let stats = RowStats::from_counts(0, 0);
        assert_eq!(stats.total_rows, 0);
        assert_eq!(stats.duplicate_rows, 0);
        assert_eq!(stats.duplicate_pct, 0.0);
    }

    #[test]
    fn test_row_stats_ratio() {
        let stats = RowStats::from_counts(8, 2);
        assert_eq!(stats.duplicate_pct, 0.25);

        let clamped = RowStats::from_counts(3, 7);
        assert_eq!(clamped.duplicate_rows, 3);
        assert_eq!(clamped.duplicate_pct, 1.0);
    }

    #[test]
    fn test_column_metrics_outcome_fields_are_exclusive() {
        let failed = ColumnMetrics::new(
            "amount",
            "numeric",
            1,
            4,
            NumericStatsOutcome::Failed("boom".into()),
        );
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["numericStatsError"], "boom");
        assert!(json.get("numericStats").is_none());
        assert_eq!(json["nulls"], 1);
        assert_eq!(json["unique"], 4);

        let text = ColumnMetrics::new("name", "text", 0, 2, NumericStatsOutcome::NotApplicable);
        let json = serde_json::to_value(&text).unwrap();
        assert!(json.get("numericStats").is_none());
        assert!(json.get("numericStatsError").is_none());
        assert_eq!(json["dataType"], "text");
    }

    #[test]
    fn test_numeric_stats_serialization() {
        let stats = NumericStats {
            n: 1,
            min: Some(NumericValue::Int(7)),
            max: Some(NumericValue::Int(7)),
            mean: Some(7.0),
            stddev: None,
            q1: Some(NumericValue::Int(7)),
            median: Some(NumericValue::Int(7)),
            q3: Some(NumericValue::Float(7.5)),
        };
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            json!({
                "n": 1, "min": 7, "max": 7, "mean": 7.0, "stddev": null,
                "q1": 7, "median": 7, "q3": 7.5
            })
        );
    }
}
