//! Router for calling any tool by name

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
};

use crate::api::public::ApiError;
use crate::api::routes::json_args;
use crate::api::state::AppState;
use crate::tools::{ToolDefinition, ToolOutput, definitions};

type SharedState = Arc<AppState>;

async fn list_tools() -> Json<Vec<ToolDefinition>> {
    Json(definitions())
}

async fn call_tool(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolOutput>, ApiError> {
    let args = json_args(&body)?;
    let output = state.tools.call(&name, Some(&args)).await?;
    Ok(Json(output))
}

/// Create the tools router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_tools))
        .route("/{name}", post(call_tool))
}
