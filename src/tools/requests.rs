//! Validation of raw JSON tool arguments into typed requests

use chrono::{DateTime, FixedOffset, Offset, TimeDelta, Utc};
use serde_json::{Map, Value};

use super::Operation;
use crate::calendar::{Interval, parse_instant};
use crate::core::ToolError;

pub const DEFAULT_MAX_RESULTS: u32 = 10;
// Upper bound accepted by Google for events.list
pub const MAX_RESULTS_LIMIT: u32 = 2500;

#[derive(Debug, Clone, PartialEq)]
pub struct ListEventsRequest {
    // None means "now", resolved at call time
    pub time_min: Option<DateTime<Utc>>,
    pub time_max: Option<DateTime<Utc>>,
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateEventRequest {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEventRequest {
    pub event_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteEventRequest {
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FindFreeTimeRequest {
    pub window: Interval,
    pub duration_minutes: u32,
    // Offset of `timeMin` as given by the caller, used to print slots
    pub display_offset: FixedOffset,
}

impl FindFreeTimeRequest {
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.duration_minutes))
    }
}

/// A validated call to one of the calendar operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    ListEvents(ListEventsRequest),
    CreateEvent(CreateEventRequest),
    UpdateEvent(UpdateEventRequest),
    DeleteEvent(DeleteEventRequest),
    FindFreeTime(FindFreeTimeRequest),
}

impl ToolRequest {
    pub fn parse(operation: Operation, args: &Map<String, Value>) -> Result<Self, ToolError> {
        let args = Args(args);
        let request = match operation {
            Operation::ListEvents => ToolRequest::ListEvents(ListEventsRequest {
                time_min: args.opt_instant("timeMin")?,
                time_max: args.opt_instant("timeMax")?,
                max_results: match args.opt_uint("maxResults")? {
                    Some(0) => return Err(ToolError::invalid("maxResults", "must be at least 1")),
                    Some(n) if n > u64::from(MAX_RESULTS_LIMIT) => {
                        return Err(ToolError::invalid(
                            "maxResults",
                            format!("must be at most {}", MAX_RESULTS_LIMIT),
                        ));
                    }
                    Some(n) => n as u32,
                    None => DEFAULT_MAX_RESULTS,
                },
            }),
            Operation::CreateEvent => {
                let summary = args.req_str("summary")?;
                let start = args.req_instant("startTime")?;
                let end = args.req_instant("endTime")?;
                check_order(Some(start), Some(end), "endTime", "startTime")?;
                ToolRequest::CreateEvent(CreateEventRequest {
                    summary,
                    description: args.opt_str("description")?,
                    start,
                    end,
                    attendees: args.opt_str_list("attendees")?.unwrap_or_default(),
                })
            }
            Operation::UpdateEvent => {
                let event_id = args.req_str("eventId")?;
                let start = args.opt_instant("startTime")?;
                let end = args.opt_instant("endTime")?;
                check_order(start, end, "endTime", "startTime")?;
                ToolRequest::UpdateEvent(UpdateEventRequest {
                    event_id,
                    summary: args.opt_str("summary")?,
                    description: args.opt_str("description")?,
                    start,
                    end,
                })
            }
            Operation::DeleteEvent => ToolRequest::DeleteEvent(DeleteEventRequest {
                event_id: args.req_str("eventId")?,
            }),
            Operation::FindFreeTime => {
                let raw_min = args.req_str("timeMin")?;
                let time_min = instant("timeMin", &raw_min)?;
                let time_max = args.req_instant("timeMax")?;
                check_order(Some(time_min), Some(time_max), "timeMax", "timeMin")?;
                let duration_minutes = match args.req_uint("duration")? {
                    0 => return Err(ToolError::invalid("duration", "must be a positive number of minutes")),
                    n => u32::try_from(n)
                        .map_err(|_| ToolError::invalid("duration", "is too large"))?,
                };
                let display_offset = DateTime::parse_from_rfc3339(raw_min.trim())
                    .map(|dt| *dt.offset())
                    .unwrap_or_else(|_| Utc.fix());
                ToolRequest::FindFreeTime(FindFreeTimeRequest {
                    window: Interval::new(time_min, time_max),
                    duration_minutes,
                    display_offset,
                })
            }
        };
        Ok(request)
    }

    pub fn operation(&self) -> Operation {
        match self {
            ToolRequest::ListEvents(_) => Operation::ListEvents,
            ToolRequest::CreateEvent(_) => Operation::CreateEvent,
            ToolRequest::UpdateEvent(_) => Operation::UpdateEvent,
            ToolRequest::DeleteEvent(_) => Operation::DeleteEvent,
            ToolRequest::FindFreeTime(_) => Operation::FindFreeTime,
        }
    }
}

fn check_order(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    end_field: &str,
    start_field: &str,
) -> Result<(), ToolError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ToolError::invalid(
            end_field,
            format!("must not be before `{}`", start_field),
        )),
        _ => Ok(()),
    }
}

fn instant(field: &str, raw: &str) -> Result<DateTime<Utc>, ToolError> {
    parse_instant(raw).ok_or_else(|| {
        ToolError::invalid(field, format!("`{}` is not an ISO-8601 date or date-time", raw))
    })
}

/// Typed accessors over a JSON object. `null` counts as absent.
struct Args<'a>(&'a Map<String, Value>);

impl Args<'_> {
    fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    fn opt_str(&self, field: &str) -> Result<Option<String>, ToolError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ToolError::invalid(field, "expected a string")),
        }
    }

    fn req_str(&self, field: &str) -> Result<String, ToolError> {
        match self.opt_str(field)? {
            None => Err(ToolError::invalid(field, "is required")),
            Some(s) if s.trim().is_empty() => Err(ToolError::invalid(field, "must not be empty")),
            Some(s) => Ok(s),
        }
    }

    fn opt_instant(&self, field: &str) -> Result<Option<DateTime<Utc>>, ToolError> {
        self.opt_str(field)?
            .map(|raw| instant(field, &raw))
            .transpose()
    }

    fn req_instant(&self, field: &str) -> Result<DateTime<Utc>, ToolError> {
        let raw = self.req_str(field)?;
        instant(field, &raw)
    }

    fn opt_uint(&self, field: &str) -> Result<Option<u64>, ToolError> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        value
            .as_u64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .map(Some)
            .ok_or_else(|| ToolError::invalid(field, "expected a non-negative whole number"))
    }

    fn req_uint(&self, field: &str) -> Result<u64, ToolError> {
        self.opt_uint(field)?
            .ok_or_else(|| ToolError::invalid(field, "is required"))
    }

    fn opt_str_list(&self, field: &str) -> Result<Option<Vec<String>>, ToolError> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(ToolError::invalid(field, "expected an array of strings"));
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
                _ => Err(ToolError::invalid(field, "expected an array of non-empty strings")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}
