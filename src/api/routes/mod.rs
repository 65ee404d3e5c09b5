//! API routes module

pub mod calendar;
mod tools;

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use serde_json::{Map, Value};

use crate::api::state::AppState;
use crate::core::ToolError;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Calendar routes
        .nest("/calendar", calendar::router())
        // Generic tool calls by name
        .nest("/tools", tools::router())
}

/// Read a request body as tool arguments. An empty body means no
/// arguments.
pub(crate) fn json_args(body: &Bytes) -> Result<Map<String, Value>, ToolError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(args)) => Ok(args),
        Ok(_) => Err(ToolError::invalid("body", "expected a JSON object")),
        Err(e) => Err(ToolError::invalid("body", e.to_string())),
    }
}
