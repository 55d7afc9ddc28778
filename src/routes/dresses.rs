use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Json, Query,
    },
    http::StatusCode,
    response::Json as RespJson,
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::{json_body, method_not_implemented, now, page_request, query_params, record_id, IdQuery};
use crate::error::AppError;
use crate::model::dress::{
    CreateDressRequest, Dress, DressFilter, DressQuery, UpdateDressRequest, BRANCHES, DRESS_TYPES,
};
use crate::state::AppState;
use crate::table::{dates, PageMeta};

#[derive(Debug, Serialize)]
pub struct DressListResponse {
    pub success: bool,
    pub dresses: Vec<Dress>,
    #[serde(flatten)]
    pub meta: PageMeta,
    pub timestamp: String,
    pub fallback: bool,
}

pub fn dresses_router() -> Router {
    Router::new()
        .route(
            "/api/dresses",
            get(list_dresses)
                .post(create_dress)
                .put(update_dress)
                .delete(delete_dress)
                .fallback(method_not_implemented),
        )
        .route("/api/dresses/options", get(dress_options))
}

/// Branch and dress-type choices for the job form.
async fn dress_options() -> RespJson<Value> {
    RespJson(json!({
        "success": true,
        "branches": BRANCHES,
        "dress_types": DRESS_TYPES,
    }))
}

async fn list_dresses(
    Extension(state): Extension<AppState>,
    query: Result<Query<DressQuery>, QueryRejection>,
) -> Result<RespJson<DressListResponse>, AppError> {
    let params = query_params(query)?;
    let page = page_request(params.page.as_deref(), params.limit.as_deref())?;
    let filter = DressFilter::from_query(&params)?;
    tracing::info!(
        page = page.page,
        limit = page.limit,
        search = ?filter.search,
        month = ?filter.month,
        designer = ?filter.designer,
        time_dap = ?filter.time_dap,
        time_dinh = ?filter.time_dinh,
        "Listing dresses"
    );

    let listing = state.dresses().list(|d| filter.matches(d), page).await;
    Ok(RespJson(DressListResponse {
        success: true,
        dresses: listing.items,
        meta: listing.meta,
        timestamp: now(),
        fallback: listing.fallback,
    }))
}

async fn create_dress(
    Extension(state): Extension<AppState>,
    payload: Result<Json<CreateDressRequest>, JsonRejection>,
) -> Result<(StatusCode, RespJson<Value>), AppError> {
    let dress = json_body(payload)?.into_dress(&dates::today())?;
    tracing::info!(code = %dress.dress_code, branch = %dress.branch, dress_type = %dress.dress_type, "Creating dress");

    let dress = state
        .dresses()
        .create(dress)
        .await
        .map_err(|e| AppError::store("add dress", e))?;

    Ok((
        StatusCode::CREATED,
        RespJson(json!({
            "success": true,
            "dress": dress,
            "message": "Dress created successfully",
        })),
    ))
}

async fn update_dress(
    Extension(state): Extension<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
    payload: Result<Json<UpdateDressRequest>, JsonRejection>,
) -> Result<RespJson<Value>, AppError> {
    let id = record_id(query, "Dress")?;
    let change = json_body(payload)?.into_change()?;
    tracing::info!(id, "Updating dress");

    let dress = state
        .dresses()
        .update(id, change)
        .await
        .map_err(|e| AppError::store("update dress", e))?;

    Ok(RespJson(json!({
        "success": true,
        "dress": dress,
        "message": "Dress updated successfully",
    })))
}

async fn delete_dress(
    Extension(state): Extension<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<RespJson<Value>, AppError> {
    let id = record_id(query, "Dress")?;
    tracing::info!(id, "Deleting dress");

    state
        .dresses()
        .delete(id)
        .await
        .map_err(|e| AppError::store("delete dress", e))?;

    Ok(RespJson(json!({
        "success": true,
        "message": "Dress deleted successfully",
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app_with, broken_app, call, sheet};
    use crate::sheets::{CellRange, MemorySheet, MemoryWorkbook, SheetBackend};
    use crate::table::dates;

    const HEADER: &[&str] = &[
        "id", "date", "dress_code", "dress_description", "branch", "dress_type", "designer30", "designer100",
        "designer60", "designer20", "designer20_2", "time_dap", "status", "time_dinh", "team_dinh", "created_at",
    ];

    fn tabs(jobs: &[&[&str]]) -> Vec<MemorySheet> {
        let mut rows: Vec<&[&str]> = vec![HEADER];
        rows.extend_from_slice(jobs);
        vec![
            sheet(0, "users", &[&["name"]]),
            sheet(1, "products", &[&["product_name"]]),
            sheet(728_077_449, "DRESS", &rows),
        ]
    }

    fn jobs() -> Vec<MemorySheet> {
        tabs(&[
            &["1", "15/06/2025", "DR001", "Váy đuôi cá", "LINH NGA Hà Nội", "LUXURY - LÊN MỚI", "Lan", "", "", "", "", "3", "active", "2", "Team A", "2025-06-15"],
            &["2", "2025-06-28", "DR002", "Váy xòe", "LINH NGA HCM", "ÁO DÀI - LÊN MỚI", "", "Hà", "", "", "", "5", "active", "2", "Team B", "2025-06-28"],
            &["3", "02/07/2025", "DR003", "Áo dài cưới", "SHILA HVH", "EM BÉ", "", "", "Lan Anh", "", "", "3", "active", "1", "Team A", "2025-07-02"],
        ])
    }

    async fn dress_rows(workbook: &MemoryWorkbook) -> Vec<Vec<String>> {
        let info = workbook
            .sheets()
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.title == "Dress")
            .unwrap();
        workbook.read_range(&info, CellRange::whole("Dress")).await.unwrap()
    }

    fn codes(body: &serde_json::Value) -> Vec<String> {
        body["dresses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["dress_code"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_create_with_defaults() {
        let (router, _) = app_with(jobs());
        let (status, body) = call(&router, "POST", "/api/dresses", Some(json!({"dress_code": "DR100"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["dress"]["id"], 4);
        assert_eq!(body["dress"]["branch"], "LINH NGA Hà Nội");
        assert_eq!(body["dress"]["dress_type"], "LUXURY - LÊN MỚI");
        assert_eq!(body["dress"]["created_at"], dates::today());
        assert_eq!(body["message"], "Dress created successfully");
    }

    #[tokio::test]
    async fn test_filters() {
        let (router, _) = app_with(jobs());

        let (_, body) = call(&router, "GET", "/api/dresses?month=2025-06", None).await;
        assert_eq!(codes(&body), vec!["DR001", "DR002"]);

        let (_, body) = call(&router, "GET", "/api/dresses?designer=lan", None).await;
        assert_eq!(codes(&body), vec!["DR001", "DR003"]);

        let (_, body) = call(&router, "GET", "/api/dresses?time_dap=3&time_dinh=1", None).await;
        assert_eq!(codes(&body), vec!["DR003"]);

        let (_, body) = call(&router, "GET", "/api/dresses?search=%C3%A1o%20d%C3%A0i", None).await;
        assert_eq!(codes(&body), vec!["DR002", "DR003"]);

        let (status, _) = call(&router, "GET", "/api/dresses?time_dap=nhanh", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (router, _) = app_with(jobs());

        let (status, body) = call(
            &router,
            "PUT",
            "/api/dresses?id=2",
            Some(json!({"date": "01/08/2025", "time_dinh": "4"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dress"]["date"], "2025-08-01");
        assert_eq!(body["dress"]["time_dinh"], 4);
        assert_eq!(body["dress"]["designer100"], "Hà");

        let (status, body) = call(&router, "DELETE", "/api/dresses?id=9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Dress with ID 9 not found");

        let (status, _) = call(&router, "DELETE", "/api/dresses?id=1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&router, "GET", "/api/dresses", None).await;
        assert_eq!(codes(&body), vec!["DR002", "DR003"]);
    }

    #[tokio::test]
    async fn test_missing_dress_tab() {
        let (router, _) = app_with(vec![sheet(0, "users", &[&["name"]]), sheet(1, "products", &[&["product_name"]])]);

        let (status, body) = call(&router, "GET", "/api/dresses", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fallback"], true);
        assert_eq!(codes(&body), vec!["DR001"]);

        let (status, body) = call(&router, "POST", "/api/dresses", Some(json!({"dress_code": "DR5"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to add dress: Dress sheet not found");
    }

    #[tokio::test]
    async fn test_options_and_bad_date() {
        let (router, _) = app_with(jobs());
        let (_, body) = call(&router, "GET", "/api/dresses/options", None).await;
        assert_eq!(body["branches"].as_array().unwrap().len(), 6);
        assert_eq!(body["dress_types"].as_array().unwrap().len(), 18);

        let (status, body) = call(
            &router,
            "POST",
            "/api/dresses",
            Some(json!({"dress_code": "DR6", "date": "sang tuần"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid date"));
    }

    #[tokio::test]
    async fn test_broken_backend() {
        let (_, body) = call(&broken_app(), "GET", "/api/dresses?month=2030-01", None).await;
        assert_eq!(body["fallback"], true);
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_update_leaves_other_cells_as_stored() {
        let (router, workbook) = app_with(vec![
            sheet(0, "users", &[&["name"]]),
            sheet(1, "products", &[&["product_name"]]),
            sheet(2, "Dress", &[&["id", "dress_code", "time_dap", "status", "created_at"], &["1", "DR1", "12 phút", "", ""]]),
        ]);

        let (status, body) = call(&router, "PUT", "/api/dresses?id=1", Some(json!({"dress_code": "DR1B"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dress"]["dress_code"], "DR1B");
        assert_eq!(body["dress"]["time_dap"], 12);

        assert_eq!(dress_rows(&workbook).await[1], vec!["1", "DR1B", "12 phút", "", ""]);
    }

    #[tokio::test]
    async fn test_writes_through_repeated_designer_headers() {
        let (router, workbook) = app_with(vec![
            sheet(0, "users", &[&["name"]]),
            sheet(1, "products", &[&["product_name"]]),
            sheet(
                2,
                "Dress",
                &[
                    &["ID", "Date", "dress_code", "Designer20", "Designer20", "TimeDap", "status"],
                    &["1", "15/06/2025", "DR001", "Lan", "Hoa", "3", ""],
                ],
            ),
        ]);

        let (_, body) = call(&router, "GET", "/api/dresses", None).await;
        assert_eq!(body["dresses"][0]["designer20"], "Lan");
        assert_eq!(body["dresses"][0]["designer20_2"], "Hoa");

        let (status, body) = call(
            &router,
            "POST",
            "/api/dresses",
            Some(json!({"dress_code": "DR002", "designer20": "Mai", "designer20_2": "Thu"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["dress"]["id"], 2);
        let rows = dress_rows(&workbook).await;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].len(), 7);
        assert_eq!((rows[2][0].as_str(), rows[2][2].as_str()), ("2", "DR002"));
        assert_eq!((rows[2][3].as_str(), rows[2][4].as_str()), ("Mai", "Thu"));

        let (status, _) = call(&router, "PUT", "/api/dresses?id=1", Some(json!({"designer20_2": "Ngọc"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            dress_rows(&workbook).await[1],
            vec!["1", "15/06/2025", "DR001", "Lan", "Ngọc", "3", ""]
        );

        let (status, _) = call(&router, "DELETE", "/api/dresses?id=1", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = dress_rows(&workbook).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][2], "DR002");

        let (_, body) = call(&router, "GET", "/api/dresses", None).await;
        assert_eq!(body["dresses"][0]["id"], 2);
        assert_eq!(body["dresses"][0]["designer20_2"], "Thu");
    }
}
