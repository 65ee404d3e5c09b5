//! Human-readable renderings of calendar responses

use chrono::{FixedOffset, SecondsFormat};

use crate::calendar::Interval;
use crate::google::gcal::Event;

pub fn events(events: &[Event]) -> String {
    if events.is_empty() {
        return "No events found in the specified time range.".to_string();
    }

    let formatted = events
        .iter()
        .map(|event| {
            format!(
                "• {}\n  Start: {}\n  End: {}\n  ID: {}",
                event.summary.as_deref().unwrap_or("(No title)"),
                event.start.as_ref().map(|s| s.display()).unwrap_or(""),
                event.end.as_ref().map(|e| e.display()).unwrap_or(""),
                event.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Found {} events:\n\n{}", events.len(), formatted)
}

pub fn created(event: &Event) -> String {
    format!(
        "Event created successfully!\nID: {}\nLink: {}",
        event.id,
        event.html_link.as_deref().unwrap_or("")
    )
}

pub fn updated(event_id: &str) -> String {
    format!("Event {} updated successfully!", event_id)
}

pub fn deleted(event_id: &str) -> String {
    format!("Event {} deleted successfully!", event_id)
}

pub fn free_slots(slots: &[Interval], offset: FixedOffset, duration_minutes: u32) -> String {
    if slots.is_empty() {
        return format!(
            "No available time slots found for duration of {} minutes in the specified range.",
            duration_minutes
        );
    }

    let stamp = |instant: chrono::DateTime<chrono::Utc>| {
        instant
            .with_timezone(&offset)
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    };
    let formatted = slots
        .iter()
        .map(|slot| format!("• {} - {}", stamp(slot.start), stamp(slot.end)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Found {} available time slots:\n\n{}",
        slots.len(),
        formatted
    )
}
