//! Endpoint handlers.
//!
//! Every handler validates its parameters before acquiring a session, so a
//! malformed request never reaches the database.

use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use hyper::{Body, Response, StatusCode};
use serde_json::json;
use tablescope_core::models::{DEFAULT_BUCKETS, DEFAULT_PREVIEW_LIMIT};
use tablescope_core::services::histogram::validate_buckets;
use tablescope_core::services::preview::clamp_limit;
use tablescope_core::{
    CatalogService, HistogramService, Identifier, PreviewService, ReportService, TableRef,
    TablescopeError, TablescopeResult,
};

use crate::app::{json_response, Context, Params};

type ApiResult = TablescopeResult<Response<Body>>;

/// `GET /api/health`. Never touches the database.
pub fn health(context: &Context) -> Response<Body> {
    json_response(
        StatusCode::OK,
        &json!({
            "ok": true,
            "ts": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "pool": context.pool.status(),
        }),
    )
}

/// `GET /api/tables`
pub async fn tables(context: &Context) -> ApiResult {
    let conn = context.pool.get().await?;
    let tables = CatalogService::list_tables(&conn).await?;
    Ok(json_response(StatusCode::OK, &json!({ "tables": tables })))
}

/// `GET /api/summary?table=`
pub async fn summary(context: &Context, params: &Params) -> ApiResult {
    let table = table_param(params)?;
    let conn = context.pool.get().await?;
    let report = ReportService::summarize(&conn, &table).await?;
    Ok(json_response(StatusCode::OK, &report))
}

/// `GET /api/histogram?table=&column=&buckets=`
pub async fn histogram(context: &Context, params: &Params) -> ApiResult {
    let table = table_param(params)?;
    let column = Identifier::parse(text_param(params, "column"))?;
    let buckets = validate_buckets(int_param(params, "buckets", DEFAULT_BUCKETS)?)?;

    let conn = context.pool.get().await?;
    let report = HistogramService::histogram(&conn, &table, &column, buckets).await?;
    Ok(json_response(StatusCode::OK, &report))
}

/// `GET /api/preview?table=&limit=`
pub async fn preview(context: &Context, params: &Params) -> ApiResult {
    let table = table_param(params)?;
    let limit = clamp_limit(
        int_param(params, "limit", DEFAULT_PREVIEW_LIMIT)?,
        context.max_preview_rows,
    )?;

    let conn = context.pool.get().await?;
    let preview = PreviewService::preview(&conn, &table, limit).await?;
    Ok(json_response(StatusCode::OK, &preview))
}

// An absent parameter reads as empty and fails identifier validation.
fn text_param<'a>(params: &'a Params, name: &str) -> &'a str {
    params.get(name).map(String::as_str).unwrap_or_default()
}

fn table_param(params: &Params) -> TablescopeResult<TableRef> {
    TableRef::parse(text_param(params, "table"))
}

fn int_param<T>(params: &Params, name: &str, default: T) -> TablescopeResult<T>
where
    T: FromStr,
{
    match params.get(name).map(|v| v.trim()) {
        None | Some("") => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            TablescopeError::invalid_parameter(name, format!("expected an integer, got {raw:?}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::parse_params;

    #[test]
    fn test_table_param() {
        let table = table_param(&parse_params(Some("table=sales.orders"))).unwrap();
        assert_eq!(table.to_string(), "sales.orders");

        let table = table_param(&parse_params(Some("table=orders"))).unwrap();
        assert_eq!(table.to_string(), "public.orders");

        assert!(table_param(&parse_params(None)).unwrap_err().is_client_error());
    }

    #[test]
    fn test_int_param_defaults() {
        let params = parse_params(Some("buckets=&limit=25"));
        assert_eq!(int_param(&params, "buckets", DEFAULT_BUCKETS).unwrap(), DEFAULT_BUCKETS);
        assert_eq!(int_param(&params, "limit", DEFAULT_PREVIEW_LIMIT).unwrap(), 25);
        assert_eq!(int_param(&params, "missing", 7i64).unwrap(), 7);
    }

    #[test]
    fn test_int_param_rejects_garbage() {
        let params = parse_params(Some("buckets=2.5"));
        let err = int_param(&params, "buckets", DEFAULT_BUCKETS).unwrap_err();
        assert!(matches!(err, TablescopeError::InvalidParameter { .. }));
        assert!(err.to_string().contains("buckets"));
    }
}
