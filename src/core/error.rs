use thiserror::Error;

/// Failures a tool invocation can surface to its caller.
///
/// Plumbing code returns `anyhow::Result` and wraps these with `?`;
/// each surface (MCP, HTTP, CLI) downcasts to pick a response shape.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    #[error("Google Calendar request failed ({status}): {message}")]
    UpstreamFailure { status: u16, message: String },

    #[error("Missing required environment variables: {}", .0.join(", "))]
    ConfigurationMissing(Vec<String>),
}

impl ToolError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ToolError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Find a `ToolError` anywhere in an `anyhow` chain.
    pub fn find(err: &anyhow::Error) -> Option<&ToolError> {
        err.chain().find_map(|cause| cause.downcast_ref::<ToolError>())
    }
}
