//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{Router, body::Body};

use gcal_mcp::api::{AppState, app};
use gcal_mcp::core::ToolError;
use gcal_mcp::google::gcal::{
    CalendarService, Event, EventBody, EventDateTime, EventsPage, ListEventsQuery,
};
use gcal_mcp::tools::CalendarTools;

/// In-memory calendar holding a fixed set of events. Writes are
/// recorded so tests can inspect what would have been sent to Google.
#[derive(Default)]
pub struct StubCalendar {
    pub events: Vec<Event>,
    pub patches: Mutex<Vec<(String, EventBody)>>,
    pub deleted: Mutex<Vec<String>>,
}

impl StubCalendar {
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }
}

fn not_found(event_id: &str) -> anyhow::Error {
    ToolError::UpstreamFailure {
        status: 404,
        message: format!("Event {} not found", event_id),
    }
    .into()
}

#[async_trait]
impl CalendarService for StubCalendar {
    async fn list_events(&self, query: &ListEventsQuery) -> Result<EventsPage> {
        let limit = query.max_results.unwrap_or(u32::MAX) as usize;
        Ok(EventsPage {
            items: self.events.iter().take(limit).cloned().collect(),
            next_page_token: None,
        })
    }

    async fn get_event(&self, event_id: &str) -> Result<Event> {
        self.events
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or_else(|| not_found(event_id))
    }

    async fn insert_event(&self, body: &EventBody) -> Result<Event> {
        Ok(Event {
            id: String::from("evt_new"),
            summary: body.summary.clone(),
            description: body.description.clone(),
            start: body.start.clone(),
            end: body.end.clone(),
            html_link: Some(String::from("https://calendar.google.com/event?eid=evt_new")),
            attendees: body.attendees.clone(),
            status: Some(String::from("confirmed")),
        })
    }

    async fn patch_event(&self, event_id: &str, body: &EventBody) -> Result<Event> {
        let mut event = self.get_event(event_id).await?;
        self.patches
            .lock()
            .unwrap()
            .push((event_id.to_string(), body.clone()));
        event.summary = body.summary.clone().or(event.summary);
        Ok(event)
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        self.get_event(event_id).await?;
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(())
    }
}

/// Timed event between two RFC 3339 instants.
pub fn event(id: &str, summary: &str, start: &str, end: &str) -> Event {
    let at = |raw: &str| EventDateTime {
        date_time: Some(raw.to_string()),
        ..Default::default()
    };
    Event {
        id: id.to_string(),
        summary: Some(summary.to_string()),
        description: None,
        start: Some(at(start)),
        end: Some(at(end)),
        html_link: None,
        attendees: None,
        status: Some(String::from("confirmed")),
    }
}

/// Two meetings on 2024-05-01 UTC, leaving 09:00-10:00, 11:00-14:00
/// and 15:00-17:00 free inside a 09:00-17:00 window.
pub fn default_events() -> Vec<Event> {
    vec![
        event(
            "evt_001",
            "Standup",
            "2024-05-01T10:00:00Z",
            "2024-05-01T11:00:00Z",
        ),
        event(
            "evt_002",
            "Design review",
            "2024-05-01T14:00:00Z",
            "2024-05-01T15:00:00Z",
        ),
    ]
}

/// Creates a test application router backed by `calendar`.
pub fn test_app_with(calendar: Arc<StubCalendar>) -> Router {
    let tools = CalendarTools::new(calendar, None);
    app(Arc::new(AppState::new(tools)))
}

/// Creates a test application router over the default events.
pub fn test_app() -> Router {
    test_app_with(Arc::new(StubCalendar::with_events(default_events())))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not JSON")
}
