use anyhow::Result;
use chrono::Utc;
use serde_json::{Map, Value};

use super::requests::{
    CreateEventRequest, DeleteEventRequest, FindFreeTimeRequest, ListEventsRequest,
    MAX_RESULTS_LIMIT, UpdateEventRequest,
};
use super::{Operation, ToolOutput, ToolRequest, format};
use crate::calendar::{Interval, find_free_slots};
use crate::google::gcal::{Attendee, EventBody, EventDateTime, ListEventsQuery, SharedCalendar};

/// Runs validated tool requests against a calendar.
#[derive(Clone)]
pub struct CalendarTools {
    calendar: SharedCalendar,
    time_zone: Option<String>,
}

impl CalendarTools {
    pub fn new(calendar: SharedCalendar, time_zone: Option<String>) -> Self {
        Self {
            calendar,
            time_zone,
        }
    }

    /// Look up the operation by name, validate `args` and run it.
    /// Missing arguments are treated as an empty object.
    pub async fn call(&self, name: &str, args: Option<&Map<String, Value>>) -> Result<ToolOutput> {
        let empty = Map::new();
        let operation: Operation = name.parse()?;
        let request = ToolRequest::parse(operation, args.unwrap_or(&empty))?;
        tracing::info!(tool = name, "Executing tool");
        self.execute(request).await.inspect_err(|e| {
            tracing::error!("Error executing tool {}: {:#}", name, e);
        })
    }

    pub async fn execute(&self, request: ToolRequest) -> Result<ToolOutput> {
        let text = match request {
            ToolRequest::ListEvents(req) => self.list_events(req).await?,
            ToolRequest::CreateEvent(req) => self.create_event(req).await?,
            ToolRequest::UpdateEvent(req) => self.update_event(req).await?,
            ToolRequest::DeleteEvent(req) => self.delete_event(req).await?,
            ToolRequest::FindFreeTime(req) => self.find_free_time(req).await?,
        };
        Ok(ToolOutput::text(text))
    }

    async fn list_events(&self, req: ListEventsRequest) -> Result<String> {
        let query = ListEventsQuery {
            time_min: Some(req.time_min.unwrap_or_else(Utc::now)),
            time_max: req.time_max,
            max_results: Some(req.max_results),
            page_token: None,
        };
        let page = self.calendar.list_events(&query).await?;
        Ok(format::events(&page.items))
    }

    async fn create_event(&self, req: CreateEventRequest) -> Result<String> {
        let time_zone = self.time_zone.as_deref();
        let attendees = (!req.attendees.is_empty()).then(|| {
            req.attendees
                .into_iter()
                .map(|email| Attendee {
                    email,
                    display_name: None,
                    response_status: None,
                })
                .collect()
        });
        let body = EventBody {
            summary: Some(req.summary),
            description: req.description,
            start: Some(EventDateTime::at(req.start, time_zone)),
            end: Some(EventDateTime::at(req.end, time_zone)),
            attendees,
        };
        let event = self.calendar.insert_event(&body).await?;
        Ok(format::created(&event))
    }

    // Read-modify-write without any concurrency check. A change made
    // elsewhere between the two calls is overwritten.
    async fn update_event(&self, req: UpdateEventRequest) -> Result<String> {
        let existing = self.calendar.get_event(&req.event_id).await?;
        let time_zone = self.time_zone.as_deref();

        let body = EventBody {
            summary: non_empty(req.summary).or(existing.summary),
            description: non_empty(req.description).or(existing.description),
            start: req.start.map(|start| EventDateTime::at(start, time_zone)),
            end: req.end.map(|end| EventDateTime::at(end, time_zone)),
            attendees: None,
        };
        self.calendar.patch_event(&req.event_id, &body).await?;
        Ok(format::updated(&req.event_id))
    }

    async fn delete_event(&self, req: DeleteEventRequest) -> Result<String> {
        self.calendar.delete_event(&req.event_id).await?;
        Ok(format::deleted(&req.event_id))
    }

    async fn find_free_time(&self, req: FindFreeTimeRequest) -> Result<String> {
        let busy = self.busy_intervals(req.window).await?;
        let slots = find_free_slots(req.window, req.duration(), &busy);
        tracing::debug!(busy = busy.len(), slots = slots.len(), "Computed free time");
        Ok(format::free_slots(&slots, req.display_offset, req.duration_minutes))
    }

    /// Every event overlapping `window`, across all result pages, as
    /// intervals sorted by start.
    async fn busy_intervals(&self, window: Interval) -> Result<Vec<Interval>> {
        let mut busy = Vec::new();
        let mut query = ListEventsQuery {
            time_min: Some(window.start),
            time_max: Some(window.end),
            max_results: Some(MAX_RESULTS_LIMIT),
            page_token: None,
        };

        loop {
            let page = self.calendar.list_events(&query).await?;
            for event in page.items {
                if event.status.as_deref() == Some("cancelled") {
                    continue;
                }
                let start = event.start.as_ref().and_then(EventDateTime::instant);
                let end = event.end.as_ref().and_then(EventDateTime::instant);
                match (start, end) {
                    (Some(start), Some(end)) => busy.push(Interval::new(start, end.max(start))),
                    _ => tracing::warn!(event_id = %event.id, "Skipping event without usable start/end"),
                }
            }
            match page.next_page_token {
                Some(token) => query.page_token = Some(token),
                None => break,
            }
        }

        busy.sort_by_key(|interval| interval.start);
        Ok(busy)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolError;
    use crate::google::gcal::{CalendarService, Event, EventsPage};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List(ListEventsQuery),
        Get(String),
        Insert(EventBody),
        Patch(String, EventBody),
        Delete(String),
    }

    /// Records every call and replays canned pages.
    #[derive(Default)]
    struct FakeCalendar {
        calls: Mutex<Vec<Call>>,
        pages: Mutex<Vec<EventsPage>>,
        existing: Option<Event>,
    }

    impl FakeCalendar {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CalendarService for FakeCalendar {
        async fn list_events(&self, query: &ListEventsQuery) -> Result<EventsPage> {
            self.calls.lock().unwrap().push(Call::List(query.clone()));
            let mut pages = self.pages.lock().unwrap();
            Ok(if pages.is_empty() {
                EventsPage::default()
            } else {
                pages.remove(0)
            })
        }

        async fn get_event(&self, event_id: &str) -> Result<Event> {
            self.calls.lock().unwrap().push(Call::Get(event_id.to_string()));
            self.existing.clone().ok_or_else(|| {
                ToolError::UpstreamFailure {
                    status: 404,
                    message: "Not Found".into(),
                }
                .into()
            })
        }

        async fn insert_event(&self, body: &EventBody) -> Result<Event> {
            self.calls.lock().unwrap().push(Call::Insert(body.clone()));
            Ok(event("new_001", None, None, None))
        }

        async fn patch_event(&self, event_id: &str, body: &EventBody) -> Result<Event> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Patch(event_id.to_string(), body.clone()));
            Ok(event(event_id, None, None, None))
        }

        async fn delete_event(&self, event_id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Delete(event_id.to_string()));
            Ok(())
        }
    }

    fn event(id: &str, summary: Option<&str>, start: Option<&str>, end: Option<&str>) -> Event {
        let at = |raw: Option<&str>| {
            raw.map(|r| EventDateTime {
                date_time: Some(r.to_string()),
                ..Default::default()
            })
        };
        Event {
            id: id.to_string(),
            summary: summary.map(str::to_string),
            description: Some("Existing description".into()),
            start: at(start),
            end: at(end),
            html_link: Some(format!("https://calendar.google.com/event?eid={}", id)),
            attendees: None,
            status: Some("confirmed".into()),
        }
    }

    fn tools(fake: Arc<FakeCalendar>) -> CalendarTools {
        CalendarTools::new(fake, Some("America/Sao_Paulo".into()))
    }

    #[tokio::test]
    async fn it_rejects_create_without_start_time_before_calling_google() {
        let fake = Arc::new(FakeCalendar::default());
        let args = json!({"summary": "Planning", "endTime": "2024-05-01T10:00:00Z"});
        let err = tools(fake.clone())
            .call("create_event", args.as_object())
            .await
            .unwrap_err();

        assert!(matches!(
            ToolError::find(&err),
            Some(ToolError::InvalidInput { field, .. }) if field == "startTime"
        ));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn it_rejects_unknown_tools() {
        let fake = Arc::new(FakeCalendar::default());
        let err = tools(fake.clone()).call("book_room", None).await.unwrap_err();
        assert!(matches!(
            ToolError::find(&err),
            Some(ToolError::UnknownOperation(name)) if name == "book_room"
        ));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn it_keeps_existing_fields_when_updating_with_only_an_id() -> Result<()> {
        let fake = Arc::new(FakeCalendar {
            existing: Some(event(
                "evt_001",
                Some("Existing summary"),
                Some("2024-05-01T10:00:00Z"),
                Some("2024-05-01T11:00:00Z"),
            )),
            ..Default::default()
        });
        let out = tools(fake.clone())
            .call("update_event", json!({"eventId": "evt_001"}).as_object())
            .await?;

        assert_eq!(out.joined_text(), "Event evt_001 updated successfully!");
        assert_eq!(
            fake.calls(),
            vec![
                Call::Get("evt_001".into()),
                Call::Patch(
                    "evt_001".into(),
                    EventBody {
                        summary: Some("Existing summary".into()),
                        description: Some("Existing description".into()),
                        start: None,
                        end: None,
                        attendees: None,
                    }
                ),
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn it_overrides_only_the_given_fields_on_update() -> Result<()> {
        let fake = Arc::new(FakeCalendar {
            existing: Some(event("evt_001", Some("Existing summary"), None, None)),
            ..Default::default()
        });
        tools(fake.clone())
            .call(
                "update_event",
                json!({
                    "eventId": "evt_001",
                    "summary": "Moved",
                    "description": "",
                    "startTime": "2024-05-01T13:00:00Z"
                })
                .as_object(),
            )
            .await?;

        let calls = fake.calls();
        let Call::Patch(_, body) = &calls[1] else {
            panic!("expected a patch, got {:?}", calls);
        };
        assert_eq!(body.summary.as_deref(), Some("Moved"));
        assert_eq!(body.description.as_deref(), Some("Existing description"));
        assert_eq!(
            body.start,
            Some(EventDateTime {
                date_time: Some("2024-05-01T13:00:00Z".into()),
                date: None,
                time_zone: Some("America/Sao_Paulo".into()),
            })
        );
        assert_eq!(body.end, None);

        Ok(())
    }

    #[tokio::test]
    async fn it_surfaces_a_missing_event_on_update() {
        let fake = Arc::new(FakeCalendar::default());
        let err = tools(fake.clone())
            .call("update_event", json!({"eventId": "gone"}).as_object())
            .await
            .unwrap_err();
        assert!(matches!(
            ToolError::find(&err),
            Some(ToolError::UpstreamFailure { status: 404, .. })
        ));
        assert_eq!(fake.calls(), vec![Call::Get("gone".into())]);
    }

    #[tokio::test]
    async fn it_creates_events_with_attendees() -> Result<()> {
        let fake = Arc::new(FakeCalendar::default());
        let out = tools(fake.clone())
            .call(
                "create_event",
                json!({
                    "summary": "Planning",
                    "startTime": "2024-05-01T09:00:00-03:00",
                    "endTime": "2024-05-01T10:00:00-03:00",
                    "attendees": ["ana@example.com"]
                })
                .as_object(),
            )
            .await?;

        assert_eq!(
            out.joined_text(),
            "Event created successfully!\nID: new_001\nLink: https://calendar.google.com/event?eid=new_001"
        );
        let calls = fake.calls();
        let Call::Insert(body) = &calls[0] else {
            panic!("expected an insert, got {:?}", calls);
        };
        assert_eq!(body.summary.as_deref(), Some("Planning"));
        assert_eq!(
            body.start.as_ref().and_then(|s| s.date_time.as_deref()),
            Some("2024-05-01T12:00:00Z")
        );
        assert_eq!(
            body.attendees.as_ref().map(|a| a[0].email.as_str()),
            Some("ana@example.com")
        );

        Ok(())
    }

    #[tokio::test]
    async fn it_lists_events_with_defaults() -> Result<()> {
        let fake = Arc::new(FakeCalendar::default());
        let before = Utc::now();
        let out = tools(fake.clone()).call("list_events", None).await?;

        assert_eq!(out.joined_text(), "No events found in the specified time range.");
        let calls = fake.calls();
        let Call::List(query) = &calls[0] else {
            panic!("expected a list, got {:?}", calls);
        };
        assert_eq!(query.max_results, Some(10));
        assert!(query.time_min.unwrap() >= before);
        assert!(query.time_max.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn it_deletes_events() -> Result<()> {
        let fake = Arc::new(FakeCalendar::default());
        let out = tools(fake.clone())
            .call("delete_event", json!({"eventId": "evt_009"}).as_object())
            .await?;
        assert_eq!(out.joined_text(), "Event evt_009 deleted successfully!");
        assert_eq!(fake.calls(), vec![Call::Delete("evt_009".into())]);

        Ok(())
    }

    #[tokio::test]
    async fn it_finds_free_time_across_pages() -> Result<()> {
        let fake = Arc::new(FakeCalendar {
            pages: Mutex::new(vec![
                EventsPage {
                    items: vec![event(
                        "a",
                        Some("Design review"),
                        Some("2024-05-01T10:00:00Z"),
                        Some("2024-05-01T11:00:00Z"),
                    )],
                    next_page_token: Some("page-2".into()),
                },
                EventsPage {
                    items: vec![event(
                        "b",
                        Some("Lunch"),
                        Some("2024-05-01T13:00:00Z"),
                        Some("2024-05-01T14:00:00Z"),
                    )],
                    next_page_token: None,
                },
            ]),
            ..Default::default()
        });
        let out = tools(fake.clone())
            .call(
                "find_free_time",
                json!({
                    "timeMin": "2024-05-01T09:00:00Z",
                    "timeMax": "2024-05-01T17:00:00Z",
                    "duration": 90
                })
                .as_object(),
            )
            .await?;

        assert_eq!(
            out.joined_text(),
            "Found 2 available time slots:\n\n\
             • 2024-05-01T11:00:00Z - 2024-05-01T13:00:00Z\n\
             • 2024-05-01T14:00:00Z - 2024-05-01T17:00:00Z"
        );
        let calls = fake.calls();
        assert_eq!(calls.len(), 2);
        let Call::List(second) = &calls[1] else {
            panic!("expected a list, got {:?}", calls);
        };
        assert_eq!(second.page_token.as_deref(), Some("page-2"));
        assert_eq!(second.max_results, Some(MAX_RESULTS_LIMIT));

        Ok(())
    }

    #[tokio::test]
    async fn it_skips_events_without_times_when_finding_free_time() -> Result<()> {
        let fake = Arc::new(FakeCalendar {
            pages: Mutex::new(vec![EventsPage {
                items: vec![event("broken", Some("?"), None, None)],
                next_page_token: None,
            }]),
            ..Default::default()
        });
        let out = tools(fake)
            .call(
                "find_free_time",
                json!({
                    "timeMin": "2024-05-01T09:00:00Z",
                    "timeMax": "2024-05-01T10:00:00Z",
                    "duration": 60
                })
                .as_object(),
            )
            .await?;

        assert_eq!(
            out.joined_text(),
            "Found 1 available time slots:\n\n• 2024-05-01T09:00:00Z - 2024-05-01T10:00:00Z"
        );

        Ok(())
    }
}
