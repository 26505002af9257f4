//! Maps view errors to JSON error responses.

use audit_view::ViewError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// The audit backend failed or answered with an error status.
    #[error("backend error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    pub trace_id: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ViewError> for AppError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::UnknownRecord(_) => AppError::NotFound(err.to_string()),
            ViewError::InvalidValue(_) | ViewError::Validation(_) => {
                AppError::Validation(err.to_string())
            }
            ViewError::Gateway(_) => AppError::Upstream(err.to_string()),
            ViewError::Io(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
            trace_id: Uuid::new_v4().to_string(),
        };
        tracing::warn!(status = body.code, trace_id = %body.trace_id, "{}", body.message);
        (status, Json(body)).into_response()
    }
}
