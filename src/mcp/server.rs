use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use serde_json::{Map, Value, json};

use crate::core::{AppConfig, ToolError};
use crate::google::gcal::GoogleCalendar;
use crate::tools::{CalendarTools, ToolOutput, definitions};

const SERVER_NAME: &str = "google-calendar-server";

#[derive(Clone)]
pub struct CalendarServer {
    tools: CalendarTools,
}

impl CalendarServer {
    pub fn new(tools: CalendarTools) -> Self {
        Self { tools }
    }

    pub fn tool_list() -> Vec<Tool> {
        definitions()
            .into_iter()
            .map(|def| {
                Tool::new(
                    def.name,
                    def.description,
                    Arc::new(def.input_schema.to_json_object()),
                )
            })
            .collect()
    }

    /// Run a tool and shape the outcome for MCP. Bad arguments and
    /// unknown tools are protocol errors; calendar failures come back
    /// as a tool result flagged `isError` so the client can read them.
    pub async fn run_tool(
        &self,
        name: &str,
        arguments: Option<&Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.call(name, arguments).await {
            Ok(output) => Ok(CallToolResult::success(contents(output))),
            Err(err) => match ToolError::find(&err) {
                Some(ToolError::InvalidInput { field, .. }) => Err(McpError::invalid_params(
                    err.to_string(),
                    Some(json!({ "field": field })),
                )),
                Some(ToolError::UnknownOperation(_)) => {
                    Err(McpError::invalid_params(err.to_string(), None))
                }
                _ => Ok(CallToolResult::error(vec![Content::text(format!(
                    "{:#}",
                    err
                ))])),
            },
        }
    }
}

fn contents(output: ToolOutput) -> Vec<Content> {
    output
        .content
        .into_iter()
        .map(|c| Content::text(c.text))
        .collect()
}

impl ServerHandler for CalendarServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            instructions: Some(
                "Google Calendar tools. Times are ISO-8601 strings; use find_free_time before \
                 create_event to pick a slot and pass the returned start/end unchanged."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        tracing::debug!("Tools requested by client");
        Ok(ListToolsResult::with_all_items(Self::tool_list()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(&request.name, request.arguments.as_ref()).await
    }
}

/// Serve the calendar tools on stdin/stdout until the client hangs up.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let calendar = GoogleCalendar::new(config)?;
    let tools = CalendarTools::new(Arc::new(calendar), config.timezone.clone());

    let service = CalendarServer::new(tools)
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| tracing::error!("Failed to start MCP server: {:?}", e))?;
    tracing::info!("Google Calendar MCP Server running on stdio");

    let reason = service.waiting().await?;
    tracing::info!(?reason, "MCP session ended");
    Ok(())
}
