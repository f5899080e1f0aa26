//! Catalog reader.
//!
//! Enumerates user tables and column metadata through information_schema.
//! Catalog values are bound as query parameters; nothing here is interpolated.

use crate::error::TablescopeResult;
use crate::models::{ColumnMeta, TableSummary};
use crate::services::connection::PooledConnection;
use crate::services::identifier::TableRef;

// information_schema columns are domain types (sql_identifier, character_data)
// which tokio-postgres will not decode as String without the ::text casts.
const LIST_TABLES_SQL: &str = r#"
    SELECT table_schema::text AS schema, table_name::text AS name
    FROM information_schema.tables
    WHERE table_type = 'BASE TABLE'
      AND table_schema NOT IN ('pg_catalog', 'information_schema')
    ORDER BY 1, 2
"#;

const COLUMNS_SQL: &str = r#"
    SELECT column_name::text AS name, data_type::text AS data_type
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2
    ORDER BY ordinal_position
"#;

/// Catalog introspection service.
pub struct CatalogService;

impl CatalogService {
    /// List base tables outside the system schemas, ordered by (schema, table).
    pub async fn list_tables(conn: &PooledConnection) -> TablescopeResult<Vec<TableSummary>> {
        let rows = conn.query(LIST_TABLES_SQL, &[]).await?;

        tracing::debug!(table_count = rows.len(), "Listed tables");

        rows.iter()
            .map(|row| -> TablescopeResult<TableSummary> {
                Ok(TableSummary { schema: row.try_get("schema")?, table: row.try_get("name")? })
            })
            .collect()
    }

    /// Columns of one table in ordinal order.
    ///
    /// An empty result means the table does not exist (or has no columns);
    /// callers decide whether that is an error.
    pub async fn columns_of(
        conn: &PooledConnection,
        table: &TableRef,
    ) -> TablescopeResult<Vec<ColumnMeta>> {
        let rows = conn.query(COLUMNS_SQL, &[&table.schema.as_str(), &table.table.as_str()]).await?;

        rows.iter()
            .map(|row| -> TablescopeResult<ColumnMeta> {
                Ok(ColumnMeta { name: row.try_get("name")?, data_type: row.try_get("data_type")? })
            })
            .collect()
    }
}
