//! Google REST clients: OAuth token endpoint and Calendar v3

pub mod gcal;
pub mod oauth;

use serde_json::Value;

use crate::core::ToolError;

/// Turn a non-2xx Google response into an `UpstreamFailure`, keeping
/// Google's own message when the body carries one.
pub(crate) fn upstream_error(status: u16, body: &str) -> ToolError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            let error = json.get("error")?;
            // Calendar API: {"error": {"code": 404, "message": "Not Found"}}
            if let Some(message) = error.get("message").and_then(Value::as_str) {
                return Some(message.to_string());
            }
            // OAuth: {"error": "invalid_grant", "error_description": "Bad Request"}
            let code = error.as_str()?;
            match json.get("error_description").and_then(Value::as_str) {
                Some(description) => Some(format!("{}: {}", code, description)),
                None => Some(code.to_string()),
            }
        })
        .unwrap_or_else(|| body.trim().to_string());

    ToolError::UpstreamFailure { status, message }
}
