//! Router for the calendar API

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    routing::{get, patch, post},
};
use axum_extra::extract::Query;
use serde_json::Value;

use super::public;
use crate::api::public::ApiError;
use crate::api::routes::json_args;
use crate::api::state::AppState;
use crate::tools::{Operation, ToolOutput};

type SharedState = Arc<AppState>;

async fn list_events(
    State(state): State<SharedState>,
    Query(params): Query<public::ListEventsParams>,
) -> Result<Json<ToolOutput>, ApiError> {
    let args = params.into_args();
    let output = state
        .tools
        .call(Operation::ListEvents.name(), Some(&args))
        .await?;
    Ok(Json(output))
}

async fn create_event(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<ToolOutput>, ApiError> {
    let args = json_args(&body)?;
    let output = state
        .tools
        .call(Operation::CreateEvent.name(), Some(&args))
        .await?;
    Ok(Json(output))
}

// The event id in the path wins over one in the body
async fn update_event(
    State(state): State<SharedState>,
    Path(event_id): Path<String>,
    body: Bytes,
) -> Result<Json<ToolOutput>, ApiError> {
    let mut args = json_args(&body)?;
    args.insert("eventId".into(), Value::String(event_id));
    let output = state
        .tools
        .call(Operation::UpdateEvent.name(), Some(&args))
        .await?;
    Ok(Json(output))
}

async fn delete_event(
    State(state): State<SharedState>,
    Path(event_id): Path<String>,
) -> Result<Json<ToolOutput>, ApiError> {
    let mut args = serde_json::Map::new();
    args.insert("eventId".into(), Value::String(event_id));
    let output = state
        .tools
        .call(Operation::DeleteEvent.name(), Some(&args))
        .await?;
    Ok(Json(output))
}

async fn find_free_time(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<ToolOutput>, ApiError> {
    let args = json_args(&body)?;
    let output = state
        .tools
        .call(Operation::FindFreeTime.name(), Some(&args))
        .await?;
    Ok(Json(output))
}

/// Create the calendar router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", patch(update_event).delete(delete_event))
        .route("/free-time", post(find_free_time))
}
