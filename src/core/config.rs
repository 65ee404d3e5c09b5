use std::env;
use std::time::Duration;

use super::ToolError;

pub const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_OAUTH_URL: &str = "https://oauth2.googleapis.com";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const REQUIRED_VARS: [&str; 4] = [
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "GOOGLE_REDIRECT_URI",
    "GOOGLE_REFRESH_TOKEN",
];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: String,
    pub calendar_id: String,
    // IANA zone name sent along with event start/end times
    pub timezone: Option<String>,
    pub http_timeout: Duration,
    pub calendar_api_url: String,
    pub oauth_url: String,
}

impl AppConfig {
    /// Build the config from the process environment. Every missing
    /// required variable is reported at once.
    pub fn from_env() -> Result<Self, ToolError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ToolError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|&&key| get(key).is_none())
            .map(|&key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::ConfigurationMissing(missing));
        }

        let required = |key: &str| get(key).unwrap_or_default();
        let http_timeout_secs = match get("GOOGLE_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                ToolError::invalid("GOOGLE_HTTP_TIMEOUT_SECS", "expected a whole number of seconds")
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            client_id: required("GOOGLE_CLIENT_ID"),
            client_secret: required("GOOGLE_CLIENT_SECRET"),
            redirect_uri: required("GOOGLE_REDIRECT_URI"),
            refresh_token: required("GOOGLE_REFRESH_TOKEN"),
            calendar_id: get("GOOGLE_CALENDAR_ID").unwrap_or_else(|| "primary".to_string()),
            timezone: get("GOOGLE_CALENDAR_TIMEZONE"),
            http_timeout: Duration::from_secs(http_timeout_secs),
            calendar_api_url: get("GOOGLE_CALENDAR_API_URL")
                .unwrap_or_else(|| DEFAULT_CALENDAR_API_URL.to_string()),
            oauth_url: get("GOOGLE_OAUTH_URL").unwrap_or_else(|| DEFAULT_OAUTH_URL.to_string()),
        })
    }

    /// Log which credentials are in use without leaking them.
    pub fn log_redacted(&self) {
        tracing::info!(
            client_id = %redact(&self.client_id),
            client_secret = %redact(&self.client_secret),
            redirect_uri = %self.redirect_uri,
            has_refresh_token = !self.refresh_token.is_empty(),
            calendar_id = %self.calendar_id,
            "Loaded Google Calendar configuration"
        );
    }
}

fn redact(secret: &str) -> String {
    format!("{}...", secret.chars().take(5).collect::<String>())
}
