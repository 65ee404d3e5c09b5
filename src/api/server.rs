use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::api::state::AppState;
use crate::core::{AppConfig, logging};
use crate::google::gcal::GoogleCalendar;
use crate::tools::CalendarTools;

async fn health() -> &'static str {
    "Server running"
}

pub fn app(shared_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(health))
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: &AppConfig) -> Result<()> {
    // axum logs rejections from built-in extractors with the `axum::rejection`
    // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
    logging::init(&format!(
        "{},tower_http=debug,axum::rejection=trace",
        logging::crate_directives()
    ));
    config.log_redacted();

    let calendar = GoogleCalendar::new(config)?;
    let tools = CalendarTools::new(Arc::new(calendar), config.timezone.clone());
    let app = app(Arc::new(AppState::new(tools)));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::info!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
