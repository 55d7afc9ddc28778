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
use crate::model::product::{CreateProductRequest, Product, ProductFilter, ProductQuery, UpdateProductRequest};
use crate::state::AppState;
use crate::table::{dates, PageMeta};

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<Product>,
    #[serde(flatten)]
    pub meta: PageMeta,
    pub timestamp: String,
    pub fallback: bool,
}

pub fn products_router() -> Router {
    Router::new().route(
        "/api/products",
        get(list_products)
            .post(create_product)
            .put(update_product)
            .delete(delete_product)
            .fallback(method_not_implemented),
    )
}

async fn list_products(
    Extension(state): Extension<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<RespJson<ProductListResponse>, AppError> {
    let params = query_params(query)?;
    let page = page_request(params.page.as_deref(), params.limit.as_deref())?;
    let filter = ProductFilter::from_query(&params);
    tracing::info!(page = page.page, limit = page.limit, search = ?filter.search, "Listing products");

    let listing = state.products().list(|p| filter.matches(p), page).await;
    Ok(RespJson(ProductListResponse {
        success: true,
        products: listing.items,
        meta: listing.meta,
        timestamp: now(),
        fallback: listing.fallback,
    }))
}

async fn create_product(
    Extension(state): Extension<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, RespJson<Value>), AppError> {
    let product = json_body(payload)?.into_product(&dates::today())?;
    tracing::info!(code = %product.product_code, name = %product.product_name, "Creating product");

    let product = state
        .products()
        .create(product)
        .await
        .map_err(|e| AppError::store("add product", e))?;

    Ok((
        StatusCode::CREATED,
        RespJson(json!({
            "success": true,
            "product": product,
            "message": "Product created successfully",
        })),
    ))
}

async fn update_product(
    Extension(state): Extension<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<RespJson<Value>, AppError> {
    let id = record_id(query, "Product")?;
    let change = json_body(payload)?.into_change()?;
    tracing::info!(id, "Updating product");

    let product = state
        .products()
        .update(id, change)
        .await
        .map_err(|e| AppError::store("update product", e))?;

    Ok(RespJson(json!({
        "success": true,
        "product": product,
        "message": "Product updated successfully",
    })))
}

async fn delete_product(
    Extension(state): Extension<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<RespJson<Value>, AppError> {
    let id = record_id(query, "Product")?;
    tracing::info!(id, "Deleting product");

    state
        .products()
        .delete(id)
        .await
        .map_err(|e| AppError::store("delete product", e))?;

    Ok(RespJson(json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}
