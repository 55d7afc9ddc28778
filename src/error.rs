//! Handler error type.
//!
//! Every handler returns `Result<_, AppError>`. Errors render as
//! `{"success": false, "error": "..."}` with a matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::InputError;
use crate::table::TableError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Client input rejected before touching the sheet.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// A write or lookup against the sheet failed.
    #[error("Failed to {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: TableError,
    },

    #[error("{0} method not implemented")]
    NotImplemented(String),
}

impl AppError {
    /// Wrap a table failure, keeping not-found distinct from store failures.
    pub fn store(action: &'static str, err: TableError) -> Self {
        match err {
            TableError::RecordNotFound { .. } => Self::NotFound(err.to_string()),
            source => Self::Store { action, source },
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
