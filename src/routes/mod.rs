//! HTTP interface. Every collection lives at `/api/<kind>`; PUT and DELETE
//! address a record with the `id` query parameter.

pub mod dashboard;
pub mod dresses;
pub mod products;
pub mod users;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Json, Query},
    http::{Method, Request},
    response::Json as RespJson,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{AppError, Result};
use crate::model::query_int;
use crate::state::AppState;
use crate::table::PageRequest;

/// The API with shared state, request tracing and permissive CORS.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(users::users_router())
        .merge(products::products_router())
        .merge(dresses::dresses_router())
        .merge(dashboard::dashboard_router())
        .route("/api/health", get(health))
        .layer(Extension(state))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

async fn health(Extension(state): Extension<AppState>) -> RespJson<Value> {
    RespJson(serde_json::json!({
        "status": "ok",
        "backend": state.backend_name(),
        "timestamp": now(),
    }))
}

/// Fallback for verbs a collection does not serve.
pub(crate) async fn method_not_implemented(method: Method) -> AppError {
    AppError::NotImplemented(method.to_string())
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IdQuery {
    pub id: Option<String>,
}

/// Record id from `?id=`: missing is "<Kind> ID is required", non-numeric is
/// "Invalid <Kind> ID".
pub(crate) fn record_id(query: std::result::Result<Query<IdQuery>, QueryRejection>, kind: &str) -> Result<i64> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let raw = query
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{kind} ID is required")))?;
    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid {kind} ID: {raw}")))
}

pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

pub(crate) fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(q)| q)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

pub(crate) fn page_request(page: Option<&str>, limit: Option<&str>) -> Result<PageRequest> {
    Ok(PageRequest::new(
        query_int(page, "page")?,
        query_int(limit, "limit")?,
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::sheets::{CellRange, MemorySheet, MemoryWorkbook, SheetBackend, SheetError, SheetInfo};
    use crate::state::{AppState, SheetLayout};

    pub fn sheet(sheet_id: i64, title: &str, rows: &[&[&str]]) -> MemorySheet {
        MemorySheet {
            sheet_id,
            title: title.to_string(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        }
    }

    pub fn app_with(sheets: Vec<MemorySheet>) -> (Router, Arc<MemoryWorkbook>) {
        let workbook = Arc::new(MemoryWorkbook::new(sheets));
        let backend: Arc<dyn SheetBackend> = workbook.clone();
        let router = super::app(AppState::new(backend, SheetLayout::default()));
        (router, workbook)
    }

    /// Backend whose every call fails, as when credentials are revoked.
    pub struct BrokenBackend;

    #[async_trait]
    impl SheetBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn sheets(&self) -> Result<Vec<SheetInfo>, SheetError> {
            Err(SheetError::Unauthorized)
        }

        async fn read_range(&self, _: &SheetInfo, _: CellRange) -> Result<Vec<Vec<String>>, SheetError> {
            Err(SheetError::Unauthorized)
        }

        async fn append_row(&self, _: &SheetInfo, _: Vec<String>) -> Result<(), SheetError> {
            Err(SheetError::Unauthorized)
        }

        async fn write_row(&self, _: &SheetInfo, _: usize, _: Vec<String>) -> Result<(), SheetError> {
            Err(SheetError::Unauthorized)
        }

        async fn delete_row(&self, _: &SheetInfo, _: usize) -> Result<(), SheetError> {
            Err(SheetError::Unauthorized)
        }
    }

    pub fn broken_app() -> Router {
        super::app(AppState::new(Arc::new(BrokenBackend), SheetLayout::default()))
    }

    pub async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
