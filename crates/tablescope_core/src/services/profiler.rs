//! Column and row profilers.
//!
//! SQL text is produced by the `*_sql` builders from validated identifiers
//! only; the async functions run it on a pooled session.

use crate::error::TablescopeResult;
use crate::models::{ColumnMeta, NumericStats, NumericValue, RowStats};
use crate::services::connection::PooledConnection;
use crate::services::identifier::{Identifier, TableRef};

/// Data-type substrings that mark a column as numeric (case-insensitive).
///
/// Any type name containing one of these is profiled as numeric, including
/// non-numeric types whose names happen to contain a marker.
pub const NUMERIC_TYPE_MARKERS: [&str; 7] =
    ["integer", "numeric", "double", "real", "bigint", "smallint", "decimal"];

const INTEGER_TYPE_MARKERS: [&str; 3] = ["smallint", "integer", "bigint"];

/// How numeric statistics are decoded for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericDomain {
    /// Values are returned as `bigint`.
    Integer,
    /// Values are returned as `double precision`.
    Float,
}

impl NumericDomain {
    /// Classify a catalog data type; `None` for non-numeric types.
    pub fn classify(data_type: &str) -> Option<Self> {
        let lower = data_type.to_lowercase();
        if !NUMERIC_TYPE_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return None;
        }
        if INTEGER_TYPE_MARKERS.iter().any(|marker| lower.contains(marker)) {
            Some(Self::Integer)
        } else {
            Some(Self::Float)
        }
    }

    fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "bigint",
            Self::Float => "double precision",
        }
    }
}

/// `SELECT` counting rows where the column is NULL.
pub fn null_count_sql(table: &TableRef, column: &Identifier) -> String {
    format!(
        "SELECT COUNT(*) FILTER (WHERE {col} IS NULL) FROM {table}",
        col = column.quoted(),
        table = table.qualified(),
    )
}

/// `SELECT` counting distinct non-null values of the column.
pub fn distinct_count_sql(table: &TableRef, column: &Identifier) -> String {
    format!(
        "SELECT COUNT(DISTINCT {col}) FROM {table}",
        col = column.quoted(),
        table = table.qualified(),
    )
}

/// `SELECT` computing count, extremes, mean, sample stddev and discrete quartiles
/// over the non-null values of the column.
pub fn numeric_stats_sql(table: &TableRef, column: &Identifier, domain: NumericDomain) -> String {
    let col = column.quoted();
    let ty = domain.sql_type();
    let percentile =
        |p: &str| format!("(PERCENTILE_DISC({p}) WITHIN GROUP (ORDER BY {col}))::{ty}");
    format!(
        r#"
        SELECT
            COUNT({col})::bigint AS n,
            MIN({col})::{ty} AS min,
            MAX({col})::{ty} AS max,
            AVG({col})::double precision AS mean,
            STDDEV_SAMP({col})::double precision AS stddev,
            {q1} AS q1,
            {median} AS median,
            {q3} AS q3
        FROM {table}
        WHERE {col} IS NOT NULL
        "#,
        q1 = percentile("0.25"),
        median = percentile("0.5"),
        q3 = percentile("0.75"),
        table = table.qualified(),
    )
}

/// `SELECT` computing total rows and rows that repeat an earlier full-row tuple.
///
/// The tuple lists the columns in the order given (catalog ordinal order).
pub fn row_stats_sql(table: &TableRef, columns: &[ColumnMeta]) -> String {
    if columns.is_empty() {
        return format!(
            "SELECT COUNT(*)::bigint AS total_rows, 0::bigint AS duplicate_rows FROM {}",
            table.qualified()
        );
    }

    let tuple = columns
        .iter()
        .map(|c| Identifier::from_catalog(c.name.as_str()).quoted())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"
        SELECT
            COUNT(*)::bigint AS total_rows,
            COUNT(*)::bigint - COUNT(DISTINCT ROW({tuple}))::bigint AS duplicate_rows
        FROM {table}
        "#,
        table = table.qualified(),
    )
}

/// Per-column statistics.
pub struct ColumnProfiler;

impl ColumnProfiler {
    /// Count of rows where the column is NULL.
    pub async fn null_count(
        conn: &PooledConnection,
        table: &TableRef,
        column: &Identifier,
    ) -> TablescopeResult<i64> {
        let row = conn.query_one(&null_count_sql(table, column), &[]).await?;
        Ok(row.try_get(0)?)
    }

    /// Count of distinct non-null values.
    pub async fn distinct_count(
        conn: &PooledConnection,
        table: &TableRef,
        column: &Identifier,
    ) -> TablescopeResult<i64> {
        let row = conn.query_one(&distinct_count_sql(table, column), &[]).await?;
        Ok(row.try_get(0)?)
    }

    /// Distribution summary of a numeric column.
    pub async fn numeric_stats(
        conn: &PooledConnection,
        table: &TableRef,
        column: &Identifier,
        domain: NumericDomain,
    ) -> TablescopeResult<NumericStats> {
        let row = conn.query_one(&numeric_stats_sql(table, column, domain), &[]).await?;

        let value = |name: &str| -> TablescopeResult<Option<NumericValue>> {
            Ok(match domain {
                NumericDomain::Integer => {
                    row.try_get::<_, Option<i64>>(name)?.map(NumericValue::Int)
                }
                NumericDomain::Float => {
                    row.try_get::<_, Option<f64>>(name)?.map(NumericValue::Float)
                }
            })
        };

        Ok(NumericStats {
            n: row.try_get("n")?,
            min: value("min")?,
            max: value("max")?,
            mean: row.try_get("mean")?,
            stddev: row.try_get("stddev")?,
            q1: value("q1")?,
            median: value("median")?,
            q3: value("q3")?,
        })
    }
}

/// Whole-row statistics.
pub struct RowProfiler;

impl RowProfiler {
    /// Total rows and duplicate full-row tuples.
    pub async fn row_stats(
        conn: &PooledConnection,
        table: &TableRef,
        columns: &[ColumnMeta],
    ) -> TablescopeResult<RowStats> {
        let row = conn.query_one(&row_stats_sql(table, columns), &[]).await?;
        Ok(RowStats::from_counts(row.try_get("total_rows")?, row.try_get("duplicate_rows")?))
    }
}
