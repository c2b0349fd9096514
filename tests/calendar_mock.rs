use muistutin::components::google_calendar::models::CalendarEvent;
use muistutin::components::google_calendar::time::{event_start, sort_by_start};
use muistutin::error::AppResult;
use chrono::{Duration, TimeZone, Utc};

/// Mock implementation of the calendar handle for testing without network
#[derive(Debug, Clone, Default)]
pub struct MockCalendarHandle {
    events: Vec<CalendarEvent>,
}

impl MockCalendarHandle {
    /// Create a new mock handle with predefined events
    pub fn new() -> Self {
        let now = Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap();
        let events = vec![
            CalendarEvent {
                id: "e1".to_string(),
                summary: Some("Test Event 1".to_string()),
                start_date_time: Some((now + Duration::minutes(30)).to_rfc3339()),
                start_date: None,
            },
            CalendarEvent {
                id: "e2".to_string(),
                summary: Some("Test Event 2".to_string()),
                start_date_time: Some((now + Duration::hours(2)).to_rfc3339()),
                start_date: None,
            },
        ];

        Self { events }
    }

    /// Get upcoming events from the mock
    pub async fn get_upcoming_events(&self) -> AppResult<Vec<CalendarEvent>> {
        Ok(self.events.clone())
    }
}

/// Test that demonstrates how to use the mock
#[tokio::test]
async fn test_calendar_mock() {
    let mock_handle = MockCalendarHandle::new();

    let events = mock_handle.get_upcoming_events().await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, "e1");
    assert_eq!(events[1].id, "e2");
}

/// Events inside one fetch window come back ordered by start time
#[tokio::test]
async fn test_events_ordered_by_start() {
    let now = Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap();
    let mut events = vec![
        CalendarEvent {
            id: "e2".to_string(),
            summary: Some("Later".to_string()),
            start_date_time: Some((now + Duration::hours(2)).to_rfc3339()),
            start_date: None,
        },
        CalendarEvent {
            id: "broken".to_string(),
            summary: None,
            start_date_time: None,
            start_date: None,
        },
        CalendarEvent {
            id: "e1".to_string(),
            summary: Some("Sooner".to_string()),
            start_date_time: Some((now + Duration::minutes(30)).to_rfc3339()),
            start_date: None,
        },
    ];

    sort_by_start(&mut events, chrono_tz::UTC);

    assert_eq!(events[0].id, "e1");
    assert_eq!(events[1].id, "e2");
    // Events without a resolvable start sort last
    assert_eq!(events[2].id, "broken");
}

/// All-day events resolve to midnight in the configured timezone
#[tokio::test]
async fn test_all_day_event_resolution() {
    let event = CalendarEvent {
        id: "all-day".to_string(),
        summary: Some("Holiday".to_string()),
        start_date_time: None,
        start_date: Some("2023-06-15".to_string()),
    };

    let start = event_start(&event, chrono_tz::Europe::Helsinki)
        .unwrap()
        .unwrap();

    assert_eq!(start, Utc.with_ymd_and_hms(2023, 6, 14, 21, 0, 0).unwrap());
}
