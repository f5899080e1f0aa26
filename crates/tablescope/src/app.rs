//! HTTP front end: routing, response encoding and the server loop.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::header::{self, HeaderValue};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode, Uri};
use serde::Serialize;
use serde_json::json;
use tablescope_core::{ConnectionPool, TablescopeError};
use tracing::Instrument;
use uuid::Uuid;

use crate::api;

/// Query parameters of one request. The first occurrence of a key wins.
pub type Params = BTreeMap<String, String>;

/// Shared state handed to every request.
pub struct Context {
    pub pool: ConnectionPool,
    pub max_preview_rows: i64,
}

impl Context {
    pub fn new(pool: ConnectionPool, max_preview_rows: i64) -> Self {
        Self { pool, max_preview_rows }
    }
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, context: Context, shutdown: F) -> hyper::Result<()>
where
    F: std::future::Future<Output = ()>,
{
    let context = Arc::new(context);
    let service = make_service_fn(|_| {
        let context = context.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                let context = context.clone();
                async move { Ok::<_, Infallible>(handle(request, context).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)?;
    tracing::info!(%addr, "Serving");
    server.serve(service).with_graceful_shutdown(shutdown).await
}

/// Route one request and encode its outcome.
pub async fn handle(request: Request<Body>, context: Arc<Context>) -> Response<Body> {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let span = tracing::info_span!("request", %request_id, %method, path = uri.path());

    async move {
        let started = Instant::now();
        let response = route(&method, &uri, &context).await;
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );
        response
    }
    .instrument(span)
    .await
}

async fn route(method: &Method, uri: &Uri, context: &Context) -> Response<Body> {
    if method == Method::OPTIONS {
        return preflight_response();
    }
    if method != Method::GET {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let params = parse_params(uri.query());
    let path = uri.path();
    let path = if path.len() > 1 { path.strip_suffix('/').unwrap_or(path) } else { path };

    let result = match path {
        "/api/health" => Ok(api::health(context)),
        "/api/tables" => api::tables(context).await,
        "/api/summary" => api::summary(context, &params).await,
        "/api/histogram" => api::histogram(context, &params).await,
        "/api/preview" => api::preview(context, &params).await,
        _ => return error_response(StatusCode::NOT_FOUND, "Not found"),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, category = e.category(), "Request failed");
            } else {
                tracing::debug!(error = %e, category = e.category(), "Request rejected");
            }
            error_response(status, &e.to_string())
        }
    }
}

pub fn parse_params(query: Option<&str>) -> Params {
    let mut params = Params::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()).into_owned() {
            params.entry(key).or_insert(value);
        }
    }
    params
}

pub fn status_for(error: &TablescopeError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Encode `value` as a JSON response with the common headers.
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(bytes) => with_headers(status, Body::from(bytes)),
        Err(e) => {
            let error = TablescopeError::internal(format!("Failed to encode response: {e}"));
            tracing::error!(error = %error, category = error.category(), "Request failed");
            // Serializing a json! value cannot fail.
            let body = json!({ "error": error.to_string() }).to_string();
            with_headers(status_for(&error), Body::from(body))
        }
    }
}

pub fn error_response(status: StatusCode, message: &str) -> Response<Body> {
    json_response(status, &json!({ "error": message }))
}

fn preflight_response() -> Response<Body> {
    let mut response = with_headers(StatusCode::NO_CONTENT, Body::empty());
    let headers = response.headers_mut();
    headers.remove(header::CONTENT_TYPE);
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET,OPTIONS"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    response
}

fn with_headers(status: StatusCode, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as JsonValue;
    use tablescope_core::ServiceConfig;

    // Points at a port nothing listens on; the pool is lazy, so routes that
    // never touch the database still work.
    fn context() -> Arc<Context> {
        let config = ServiceConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://profiler@127.0.0.1:1/warehouse".to_string()),
            "TABLESCOPE_CONNECT_TIMEOUT_SECS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap();
        let pool = ConnectionPool::new(&config).unwrap();
        Arc::new(Context::new(pool, config.max_preview_rows))
    }

    async fn call(method: Method, uri: &str) -> (StatusCode, Response<Body>) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = handle(request, context()).await;
        (response.status(), response)
    }

    async fn body_json(response: Response<Body>) -> JsonValue {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, response) = call(Method::GET, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store, max-age=0");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert!(body["ts"].as_str().unwrap().ends_with('Z'));
        assert_eq!(body["pool"]["size"], 0);
    }

    #[tokio::test]
    async fn test_trailing_slash_is_tolerated() {
        let (status, _) = call(Method::GET, "/api/health/").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        for uri in ["/", "/api", "/api/healthz", "/api/health/extra", "/static/app.js"] {
            let (status, response) = call(Method::GET, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body_json(response).await["error"], "Not found");
        }
    }

    #[tokio::test]
    async fn test_preflight() {
        let (status, response) = call(Method::OPTIONS, "/api/summary").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,OPTIONS");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_other_methods_are_rejected() {
        let (status, response) = call(Method::POST, "/api/summary?table=t").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_invalid_identifiers_are_rejected_before_any_query() {
        for uri in [
            "/api/summary?table=users;%20DROP%20TABLE%20x",
            "/api/summary",
            "/api/histogram?table=t&column=a-b",
            "/api/histogram?table=t",
            "/api/preview?table=1t",
        ] {
            let (status, response) = call(Method::GET, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let error = body_json(response).await["error"].as_str().unwrap().to_string();
            assert!(error.ends_with("identifier") || error.starts_with("Invalid identifier: "));
        }
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        for uri in [
            "/api/histogram?table=t&column=id&buckets=0",
            "/api/histogram?table=t&column=id&buckets=lots",
            "/api/histogram?table=t&column=id&buckets=1001",
            "/api/preview?table=t&limit=-1",
            "/api/preview?table=t&limit=ten",
        ] {
            let (status, _) = call(Method::GET, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_unreachable_database_is_a_server_error() {
        let (status, response) = call(Method::GET, "/api/tables").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unencodable_value_is_an_internal_error() {
        // Map keys must serialize as strings.
        let value: BTreeMap<(i32, i32), i32> = [((1, 2), 3)].into_iter().collect();
        let response = json_response(StatusCode::OK, &value);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        let error = body_json(response).await["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("Internal error: Failed to encode response"), "{error}");
    }

    #[test]
    fn test_first_parameter_wins() {
        let params = parse_params(Some("table=a&table=b&column=x%20y"));
        assert_eq!(params["table"], "a");
        assert_eq!(params["column"], "x y");
        assert!(parse_params(None).is_empty());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&TablescopeError::invalid_identifier("x;", "bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&TablescopeError::not_found("public.t")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&TablescopeError::database("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
