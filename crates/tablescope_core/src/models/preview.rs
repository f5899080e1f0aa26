//! Row preview models.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Default number of preview rows.
pub const DEFAULT_PREVIEW_LIMIT: i64 = 10;

/// A single row of preview values, in column order.
pub type PreviewRow = Vec<JsonValue>;

/// Response body of `/api/preview`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    /// Column names in the table's natural projection order.
    pub columns: Vec<String>,
    pub rows: Vec<PreviewRow>,
}
