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
use crate::model::user::{CreateUserRequest, UpdateUserRequest, User, UserFilter, UserQuery};
use crate::state::AppState;
use crate::table::{dates, PageMeta};

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<User>,
    #[serde(flatten)]
    pub meta: PageMeta,
    pub timestamp: String,
    pub fallback: bool,
}

pub fn users_router() -> Router {
    Router::new().route(
        "/api/users",
        get(list_users)
            .post(create_user)
            .put(update_user)
            .delete(delete_user)
            .fallback(method_not_implemented),
    )
}

async fn list_users(
    Extension(state): Extension<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<RespJson<UserListResponse>, AppError> {
    let params = query_params(query)?;
    let page = page_request(params.page.as_deref(), params.limit.as_deref())?;
    let filter = UserFilter::from_query(&params);
    tracing::info!(
        page = page.page,
        limit = page.limit,
        search = ?filter.search,
        status = ?filter.status,
        "Listing users"
    );

    let listing = state.users().list(|u| filter.matches(u), page).await;
    Ok(RespJson(UserListResponse {
        success: true,
        users: listing.items,
        meta: listing.meta,
        timestamp: now(),
        fallback: listing.fallback,
    }))
}

async fn create_user(
    Extension(state): Extension<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, RespJson<Value>), AppError> {
    let user = json_body(payload)?.into_user(&dates::today())?;
    tracing::info!(name = %user.name, email = %user.email, "Creating user");

    let user = state
        .users()
        .create(user)
        .await
        .map_err(|e| AppError::store("add user", e))?;

    Ok((
        StatusCode::CREATED,
        RespJson(json!({
            "success": true,
            "user": user,
            "message": "User created successfully",
        })),
    ))
}

async fn update_user(
    Extension(state): Extension<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<RespJson<Value>, AppError> {
    let id = record_id(query, "User")?;
    let change = json_body(payload)?.into_change()?;
    tracing::info!(id, "Updating user");

    let user = state
        .users()
        .update(id, change)
        .await
        .map_err(|e| AppError::store("update user", e))?;

    Ok(RespJson(json!({
        "success": true,
        "user": user,
        "message": "User updated successfully",
    })))
}

async fn delete_user(
    Extension(state): Extension<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<RespJson<Value>, AppError> {
    let id = record_id(query, "User")?;
    tracing::info!(id, "Deleting user");

    state
        .users()
        .delete(id)
        .await
        .map_err(|e| AppError::store("delete user", e))?;

    Ok(RespJson(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}
