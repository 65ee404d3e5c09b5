//! Google Calendar v3 events client

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::oauth::refresh_access_token;
use super::upstream_error;
use crate::calendar::parse_instant;
use crate::core::AppConfig;

/// Start or end of an event. Timed events carry `dateTime`, all-day
/// events only `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    pub fn at(instant: DateTime<Utc>, time_zone: Option<&str>) -> Self {
        Self {
            date_time: Some(instant.to_rfc3339_opts(SecondsFormat::Secs, true)),
            date: None,
            time_zone: time_zone.map(str::to_string),
        }
    }

    pub fn display(&self) -> &str {
        self.date_time
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or("")
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_instant(self.display())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
    pub html_link: Option<String>,
    pub attendees: Option<Vec<Attendee>>,
    pub status: Option<String>,
}

/// Request body for insert and patch. Absent fields are left out of
/// the JSON so a patch keeps the stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<Event>,
    pub next_page_token: Option<String>,
}

/// Filters for `events.list`. Results are always expanded into single
/// instances and ordered by start time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEventsQuery {
    pub time_min: Option<DateTime<Utc>>,
    pub time_max: Option<DateTime<Utc>>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
}

impl ListEventsQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        if let Some(time_min) = self.time_min {
            params.push(("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(time_max) = self.time_max {
            params.push(("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(max_results) = self.max_results {
            params.push(("maxResults", max_results.to_string()));
        }
        if let Some(page_token) = &self.page_token {
            params.push(("pageToken", page_token.clone()));
        }
        params
    }
}

/// The external calendar the tools operate on.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn list_events(&self, query: &ListEventsQuery) -> Result<EventsPage>;
    async fn get_event(&self, event_id: &str) -> Result<Event>;
    async fn insert_event(&self, body: &EventBody) -> Result<Event>;
    async fn patch_event(&self, event_id: &str, body: &EventBody) -> Result<Event>;
    async fn delete_event(&self, event_id: &str) -> Result<()>;
}

pub type SharedCalendar = Arc<dyn CalendarService>;

/// Calendar v3 over HTTPS. A fresh access token is minted from the
/// refresh token for every call.
pub struct GoogleCalendar {
    http: Client,
    api_url: String,
    oauth_url: String,
    calendar_id: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

impl GoogleCalendar {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            http,
            api_url: config.calendar_api_url.trim_end_matches('/').to_string(),
            oauth_url: config.oauth_url.clone(),
            calendar_id: config.calendar_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
        })
    }

    async fn access_token(&self) -> Result<String> {
        let token = refresh_access_token(
            &self.http,
            &self.oauth_url,
            &self.client_id,
            &self.client_secret,
            &self.refresh_token,
        )
        .await?;
        Ok(token.access_token)
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }
}

async fn check_status(res: Response, action: &str) -> Result<String> {
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        tracing::error!("{} failed: {} ({})", action, status, text);
        return Err(upstream_error(status.as_u16(), &text).into());
    }
    Ok(text)
}

async fn read_json<T: DeserializeOwned>(res: Response, action: &str) -> Result<T> {
    let text = check_status(res, action).await?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    async fn list_events(&self, query: &ListEventsQuery) -> Result<EventsPage> {
        tracing::debug!(?query, "Listing events");
        let token = self.access_token().await?;
        let res = self
            .http
            .get(self.events_url())
            .bearer_auth(token)
            .query(&query.to_params())
            .send()
            .await?;
        read_json(res, "Event list").await
    }

    async fn get_event(&self, event_id: &str) -> Result<Event> {
        tracing::debug!(event_id, "Fetching event");
        let token = self.access_token().await?;
        let res = self
            .http
            .get(self.event_url(event_id))
            .bearer_auth(token)
            .send()
            .await?;
        read_json(res, "Event fetch").await
    }

    async fn insert_event(&self, body: &EventBody) -> Result<Event> {
        tracing::debug!(summary = ?body.summary, "Inserting event");
        let token = self.access_token().await?;
        let res = self
            .http
            .post(self.events_url())
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        read_json(res, "Event insert").await
    }

    async fn patch_event(&self, event_id: &str, body: &EventBody) -> Result<Event> {
        tracing::debug!(event_id, "Patching event");
        let token = self.access_token().await?;
        let res = self
            .http
            .patch(self.event_url(event_id))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        read_json(res, "Event patch").await
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        tracing::debug!(event_id, "Deleting event");
        let token = self.access_token().await?;
        let res = self
            .http
            .delete(self.event_url(event_id))
            .bearer_auth(token)
            .send()
            .await?;
        check_status(res, "Event delete").await?;
        Ok(())
    }
}
