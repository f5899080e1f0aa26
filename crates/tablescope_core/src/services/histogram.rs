//! Equal-width histogram builder.
//!
//! Non-null values are cast to `double precision` and assigned to `buckets`
//! bins spanning `[min, max]` with `width_bucket`. The maximum itself would
//! land in overflow bucket `buckets + 1`, so indices are clamped to `buckets`.
//! When every value is equal there is one bucket. Only non-empty buckets are
//! returned.

use crate::error::{TablescopeError, TablescopeResult};
use crate::models::{HistogramBucket, HistogramReport, MAX_BUCKETS};
use crate::services::connection::PooledConnection;
use crate::services::identifier::{Identifier, TableRef};

/// `SELECT` producing `(bucket, count, min, max)` rows ordered by bucket.
///
/// `$1` is the bucket count.
pub fn histogram_sql(table: &TableRef, column: &Identifier) -> String {
    // The profiled table is aliased `src` so its columns never collide with
    // the `bounds` CTE.
    let col = format!("src.{}", column.quoted());
    format!(
        r#"
        WITH bounds AS (
            SELECT MIN({col})::double precision AS mn, MAX({col})::double precision AS mx
            FROM {table} AS src
            WHERE {col} IS NOT NULL
        )
        SELECT
            CASE
                WHEN bounds.mx = bounds.mn THEN 1
                ELSE LEAST(
                    width_bucket({col}::double precision, bounds.mn, bounds.mx, $1::integer),
                    $1::integer
                )
            END AS bucket,
            COUNT(*)::bigint AS count,
            bounds.mn AS min,
            bounds.mx AS max
        FROM {table} AS src
        CROSS JOIN bounds
        WHERE {col} IS NOT NULL
        GROUP BY 1, 3, 4
        ORDER BY 1
        "#,
        table = table.qualified(),
    )
}

/// Reject bucket counts outside `1..=MAX_BUCKETS`.
pub fn validate_buckets(buckets: i32) -> TablescopeResult<i32> {
    if (1..=MAX_BUCKETS).contains(&buckets) {
        Ok(buckets)
    } else {
        Err(TablescopeError::invalid_parameter(
            "buckets",
            format!("must be between 1 and {MAX_BUCKETS}, got {buckets}"),
        ))
    }
}

/// Histogram service.
pub struct HistogramService;

impl HistogramService {
    /// Build an equal-width histogram of one numeric column.
    pub async fn histogram(
        conn: &PooledConnection,
        table: &TableRef,
        column: &Identifier,
        buckets: i32,
    ) -> TablescopeResult<HistogramReport> {
        let buckets = validate_buckets(buckets)?;
        let rows = conn.query(&histogram_sql(table, column), &[&buckets]).await?;

        let histogram = rows
            .iter()
            .map(|row| -> TablescopeResult<HistogramBucket> {
                Ok(HistogramBucket {
                    bucket: row.try_get("bucket")?,
                    count: row.try_get("count")?,
                    min: row.try_get("min")?,
                    max: row.try_get("max")?,
                })
            })
            .collect::<TablescopeResult<Vec<_>>>()?;

        let report = HistogramReport {
            table: table.to_string(),
            column: column.to_string(),
            buckets,
            histogram,
        };

        tracing::debug!(
            table = %table,
            column = %column,
            buckets,
            filled = report.histogram.len(),
            values = report.total_count(),
            "Histogram built"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_sql_shape() {
        let table = TableRef::parse("t").unwrap();
        let column = Identifier::parse("id").unwrap();
        let sql = histogram_sql(&table, &column);

        assert!(sql.contains("FROM \"public\".\"t\" AS src"));
        assert!(sql.contains("CROSS JOIN bounds"));
        assert!(sql.contains(
            "width_bucket(src.\"id\"::double precision, bounds.mn, bounds.mx, $1::integer)"
        ));
        assert!(sql.contains("WHEN bounds.mx = bounds.mn THEN 1"));
        assert!(sql.contains("GROUP BY 1, 3, 4"));
        assert!(sql.contains("ORDER BY 1"));
        // The bucket count is bound, never formatted into the text.
        assert!(!sql.contains("20"));
    }

    #[test]
    fn test_bucket_count_bounds() {
        assert_eq!(validate_buckets(1).unwrap(), 1);
        assert_eq!(validate_buckets(20).unwrap(), 20);
        assert_eq!(validate_buckets(MAX_BUCKETS).unwrap(), MAX_BUCKETS);

        for bad in [0, -3, MAX_BUCKETS + 1] {
            let err = validate_buckets(bad).unwrap_err();
            assert!(matches!(err, TablescopeError::InvalidParameter { .. }));
        }
    }
}
