//! Calendar tools shared by the MCP server, the HTTP API and the CLI

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::ToolError;

pub mod definitions;
pub use definitions::{ToolDefinition, definitions};

mod dispatch;
pub use dispatch::CalendarTools;

pub mod format;

pub mod requests;
pub use requests::ToolRequest;

/// Every operation a caller can invoke by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    FindFreeTime,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::ListEvents,
        Operation::CreateEvent,
        Operation::UpdateEvent,
        Operation::DeleteEvent,
        Operation::FindFreeTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListEvents => "list_events",
            Operation::CreateEvent => "create_event",
            Operation::UpdateEvent => "update_event",
            Operation::DeleteEvent => "delete_event",
            Operation::FindFreeTime => "find_free_time",
        }
    }
}

impl FromStr for Operation {
    type Err = ToolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| ToolError::UnknownOperation(name.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub r#type: String,
    pub text: String,
}

/// Result of a tool call, shaped like an MCP `CallToolResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Vec<TextContent>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent {
                r#type: String::from("text"),
                text: text.into(),
            }],
        }
    }

    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
