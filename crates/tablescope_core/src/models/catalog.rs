//! Catalog models: tables and column metadata as reported by information_schema.

use serde::Serialize;

/// A user table, as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    /// Schema containing the table.
    pub schema: String,
    /// Table name.
    pub table: String,
}

/// Name and declared type of one column, in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMeta {
    /// Column name as stored in the catalog.
    pub name: String,
    /// `information_schema.columns.data_type` (e.g., "integer", "character varying").
    pub data_type: String,
}

impl ColumnMeta {
    /// Create column metadata.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self { name: name.into(), data_type: data_type.into() }
    }
}
