//! Row preview reader.
//!
//! Fetches up to `limit` rows of `SELECT *` in whatever order the database
//! returns them. The statement is prepared first to learn the column list;
//! columns whose type has no native JSON rendering are then cast in the
//! projection (`numeric` to `double precision`, everything else to `text`)
//! so every value can be decoded.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::{TablescopeError, TablescopeResult};
use crate::models::{Preview, PreviewRow};
use crate::services::connection::PooledConnection;
use crate::services::identifier::{Identifier, TableRef};

/// Reject negative limits and clamp to `max_rows`.
pub fn clamp_limit(limit: i64, max_rows: i64) -> TablescopeResult<i64> {
    if limit < 0 {
        return Err(TablescopeError::invalid_parameter(
            "limit",
            format!("must not be negative, got {limit}"),
        ));
    }
    Ok(limit.min(max_rows))
}

/// Projection expression for one column of the given type, aliased to its
/// own name.
pub fn projection_expr(name: &str, ty: &Type) -> String {
    let col = Identifier::from_catalog(name).quoted();
    match *ty {
        Type::BOOL
        | Type::INT2
        | Type::INT4
        | Type::INT8
        | Type::FLOAT4
        | Type::FLOAT8
        | Type::TEXT
        | Type::VARCHAR
        | Type::BPCHAR
        | Type::NAME
        | Type::UUID
        | Type::JSON
        | Type::JSONB
        | Type::DATE
        | Type::TIME
        | Type::TIMESTAMP
        | Type::TIMESTAMPTZ => col,
        Type::NUMERIC => format!("{col}::double precision AS {col}"),
        _ => format!("{col}::text AS {col}"),
    }
}

/// Preview service.
pub struct PreviewService;

impl PreviewService {
    /// Fetch up to `limit` raw rows of a table.
    pub async fn preview(
        conn: &PooledConnection,
        table: &TableRef,
        limit: i64,
    ) -> TablescopeResult<Preview> {
        let probe = conn.prepare(&format!("SELECT * FROM {}", table.qualified())).await?;

        let columns: Vec<String> = probe.columns().iter().map(|c| c.name().to_string()).collect();
        let projection = probe
            .columns()
            .iter()
            .map(|c| projection_expr(c.name(), c.type_()))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!("SELECT {projection} FROM {} LIMIT $1", table.qualified());
        let rows = conn.query(&sql, &[&limit]).await?;

        tracing::debug!(table = %table, limit, row_count = rows.len(), "Preview fetched");

        Ok(Preview { columns, rows: rows.iter().map(row_to_json).collect() })
    }
}

/// Decode one value. Values the Rust type cannot represent (e.g. timestamp
/// `infinity`) render as null.
fn cell<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Option<T> {
    match row.try_get::<_, Option<T>>(idx) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(
                column = row.columns()[idx].name(),
                error = %e,
                "Preview value could not be decoded"
            );
            None
        }
    }
}

fn float_to_json(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

/// Convert a PostgreSQL row to JSON values.
fn row_to_json(row: &Row) -> PreviewRow {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let value = match *col.type_() {
                Type::BOOL => cell::<bool>(row, i).map(JsonValue::Bool),
                Type::INT2 => cell::<i16>(row, i).map(JsonValue::from),
                Type::INT4 => cell::<i32>(row, i).map(JsonValue::from),
                Type::INT8 => cell::<i64>(row, i).map(JsonValue::from),
                Type::FLOAT4 => cell::<f32>(row, i).map(|v| float_to_json(v as f64)),
                Type::FLOAT8 => cell::<f64>(row, i).map(float_to_json),
                Type::UUID => cell::<Uuid>(row, i).map(|v| JsonValue::String(v.to_string())),
                Type::JSON | Type::JSONB => cell::<JsonValue>(row, i),
                Type::TIMESTAMPTZ => {
                    cell::<DateTime<Utc>>(row, i).map(|v| JsonValue::String(v.to_rfc3339()))
                }
                Type::TIMESTAMP => cell::<NaiveDateTime>(row, i)
                    .map(|v| JsonValue::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
                Type::DATE => cell::<NaiveDate>(row, i).map(|v| JsonValue::String(v.to_string())),
                Type::TIME => cell::<NaiveTime>(row, i).map(|v| JsonValue::String(v.to_string())),
                // Text-like, and everything the projection cast to text
                _ => cell::<String>(row, i).map(JsonValue::String),
            };
            value.unwrap_or(JsonValue::Null)
        })
        .collect()
}
