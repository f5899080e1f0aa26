//! Profiling report assembler.
//!
//! Combines the catalog reader, row profiler and column profiler into one
//! [`ProfilingReport`]. Numeric statistics failures are recorded on the
//! affected column and never abort the report; every other failure does.

use async_trait::async_trait;

use crate::error::{TablescopeError, TablescopeResult};
use crate::models::{
    ColumnMeta, ColumnMetrics, NumericStats, NumericStatsOutcome, ProfilingReport, RowStats,
};
use crate::services::catalog::CatalogService;
use crate::services::connection::PooledConnection;
use crate::services::identifier::{Identifier, TableRef};
use crate::services::profiler::{ColumnProfiler, NumericDomain, RowProfiler};

/// The queries a profiling report is built from.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Columns of the table in ordinal order; empty when the table is absent.
    async fn columns_of(&self, table: &TableRef) -> TablescopeResult<Vec<ColumnMeta>>;

    /// Total and duplicate row counts over the full-row tuple.
    async fn row_stats(&self, table: &TableRef, columns: &[ColumnMeta])
        -> TablescopeResult<RowStats>;

    /// Rows where the column is NULL.
    async fn null_count(&self, table: &TableRef, column: &Identifier) -> TablescopeResult<i64>;

    /// Distinct non-null values of the column.
    async fn distinct_count(&self, table: &TableRef, column: &Identifier)
        -> TablescopeResult<i64>;

    /// Distribution summary of a numeric column.
    async fn numeric_stats(
        &self,
        table: &TableRef,
        column: &Identifier,
        domain: NumericDomain,
    ) -> TablescopeResult<NumericStats>;
}

#[async_trait]
impl StatsSource for PooledConnection {
    async fn columns_of(&self, table: &TableRef) -> TablescopeResult<Vec<ColumnMeta>> {
        CatalogService::columns_of(self, table).await
    }

    async fn row_stats(
        &self,
        table: &TableRef,
        columns: &[ColumnMeta],
    ) -> TablescopeResult<RowStats> {
        RowProfiler::row_stats(self, table, columns).await
    }

    async fn null_count(&self, table: &TableRef, column: &Identifier) -> TablescopeResult<i64> {
        ColumnProfiler::null_count(self, table, column).await
    }

    async fn distinct_count(
        &self,
        table: &TableRef,
        column: &Identifier,
    ) -> TablescopeResult<i64> {
        ColumnProfiler::distinct_count(self, table, column).await
    }

    async fn numeric_stats(
        &self,
        table: &TableRef,
        column: &Identifier,
        domain: NumericDomain,
    ) -> TablescopeResult<NumericStats> {
        ColumnProfiler::numeric_stats(self, table, column, domain).await
    }
}

/// Report assembly service.
pub struct ReportService;

impl ReportService {
    /// Profile a whole table.
    ///
    /// Fails with `NotFound` when the catalog lists no columns for the table.
    pub async fn summarize<S>(source: &S, table: &TableRef) -> TablescopeResult<ProfilingReport>
    where
        S: StatsSource + ?Sized,
    {
        let columns = source.columns_of(table).await?;
        if columns.is_empty() {
            return Err(TablescopeError::not_found(table.to_string()));
        }

        let row_stats = source.row_stats(table, &columns).await?;

        let mut metrics = Vec::with_capacity(columns.len());
        for meta in &columns {
            let column = Identifier::from_catalog(meta.name.as_str());
            let null_count = source.null_count(table, &column).await?;
            let distinct_count = source.distinct_count(table, &column).await?;

            let outcome = match NumericDomain::classify(&meta.data_type) {
                None => NumericStatsOutcome::NotApplicable,
                Some(domain) => match source.numeric_stats(table, &column, domain).await {
                    Ok(stats) => NumericStatsOutcome::Computed(stats),
                    Err(e) => {
                        tracing::warn!(
                            table = %table,
                            column = %column,
                            data_type = %meta.data_type,
                            error = %e,
                            "Numeric statistics failed"
                        );
                        NumericStatsOutcome::Failed(e.to_string())
                    }
                },
            };

            metrics.push(ColumnMetrics::new(
                meta.name.as_str(),
                meta.data_type.as_str(),
                null_count,
                distinct_count,
                outcome,
            ));
        }

        tracing::debug!(
            table = %table,
            columns = metrics.len(),
            total_rows = row_stats.total_rows,
            "Profiling report assembled"
        );

        Ok(ProfilingReport { table: table.to_string(), row_stats, columns: metrics })
    }
}
