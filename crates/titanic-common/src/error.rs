use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::question::QuestionError;

/// Errors surfaced to HTTP clients. The body is `{"detail": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Failure detail is logged server-side, never returned to the client.
    #[error("Internal server error.")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal      => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QuestionError> for ApiError {
    fn from(err: QuestionError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Malformed or incomplete request bodies share the `{"detail": ..}` shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "detail": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
