//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::core::ToolError;

// Errors

pub struct ApiError(anyhow::Error);

impl ApiError {
    fn status(&self) -> StatusCode {
        match ToolError::find(&self.0) {
            Some(ToolError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            Some(ToolError::UnknownOperation(_)) => StatusCode::NOT_FOUND,
            Some(ToolError::UpstreamFailure { .. }) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Always log the error
        tracing::error!("{:#}", self.0);

        (status, axum::Json(json!({ "error": format!("{:#}", self.0) }))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod calendar {
    pub use crate::api::routes::calendar::public::*;
}
