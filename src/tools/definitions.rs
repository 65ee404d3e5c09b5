//! JSON Schema descriptions of each tool, as advertised to callers

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::Operation;

#[derive(Debug, Clone, Serialize)]
pub struct Items {
    pub r#type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub r#type: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
}

impl Property {
    fn string(description: &'static str) -> Self {
        Self {
            r#type: "string",
            description,
            items: None,
        }
    }

    fn integer(description: &'static str) -> Self {
        Self {
            r#type: "integer",
            description,
            items: None,
        }
    }

    fn string_list(description: &'static str) -> Self {
        Self {
            r#type: "array",
            description,
            items: Some(Items { r#type: "string" }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputSchema {
    pub r#type: &'static str,
    pub properties: BTreeMap<&'static str, Property>,
    pub required: Vec<&'static str>,
}

impl InputSchema {
    fn object(properties: Vec<(&'static str, Property)>, required: Vec<&'static str>) -> Self {
        Self {
            r#type: "object",
            properties: properties.into_iter().collect(),
            required,
        }
    }

    pub fn to_json_object(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

impl Operation {
    pub fn definition(&self) -> ToolDefinition {
        let (description, input_schema) = match self {
            Operation::ListEvents => (
                "List calendar events within a specified time range",
                InputSchema::object(
                    vec![
                        ("timeMin", Property::string("Start time (ISO string). Defaults to now")),
                        ("timeMax", Property::string("End time (ISO string)")),
                        (
                            "maxResults",
                            Property::integer("Maximum number of events to return (default 10)"),
                        ),
                    ],
                    vec![],
                ),
            ),
            Operation::CreateEvent => (
                "Create a new calendar event",
                InputSchema::object(
                    vec![
                        ("summary", Property::string("Event title")),
                        ("description", Property::string("Event description")),
                        ("startTime", Property::string("Event start time (ISO string)")),
                        ("endTime", Property::string("Event end time (ISO string)")),
                        (
                            "attendees",
                            Property::string_list("List of attendee email addresses"),
                        ),
                    ],
                    vec!["summary", "startTime", "endTime"],
                ),
            ),
            Operation::UpdateEvent => (
                "Update an existing calendar event. Fields left out keep their current value",
                InputSchema::object(
                    vec![
                        ("eventId", Property::string("ID of the event to update")),
                        ("summary", Property::string("New event title")),
                        ("description", Property::string("New event description")),
                        ("startTime", Property::string("New start time (ISO string)")),
                        ("endTime", Property::string("New end time (ISO string)")),
                    ],
                    vec!["eventId"],
                ),
            ),
            Operation::DeleteEvent => (
                "Delete a calendar event",
                InputSchema::object(
                    vec![("eventId", Property::string("ID of the event to delete"))],
                    vec!["eventId"],
                ),
            ),
            Operation::FindFreeTime => (
                "Find available time slots in the calendar",
                InputSchema::object(
                    vec![
                        ("timeMin", Property::string("Start of time range (ISO string)")),
                        ("timeMax", Property::string("End of time range (ISO string)")),
                        ("duration", Property::integer("Desired duration in minutes")),
                    ],
                    vec!["timeMin", "timeMax", "duration"],
                ),
            ),
        };

        ToolDefinition {
            name: self.name(),
            description,
            input_schema,
        }
    }
}

pub fn definitions() -> Vec<ToolDefinition> {
    Operation::ALL.iter().map(Operation::definition).collect()
}
