use muistutin::components::google_calendar::models::CalendarEvent;
use muistutin::config::{Config, DEFAULT_REMINDER_OFFSETS_MIN};
use serde_json::json;

fn test_config() -> Config {
    Config {
        credentials_path: "credentials.json".to_string(),
        token_path: "token.json".to_string(),
        calendar_id: "primary".to_string(),
        timezone: "UTC".to_string(),
        speech_command: "say".to_string(),
        poll_interval_secs: 600,
        fetch_window_hours: 24,
        reminder_offsets_min: DEFAULT_REMINDER_OFFSETS_MIN.to_vec(),
    }
}

/// Smoke test to verify that a config can be constructed
#[tokio::test]
async fn test_config_construction() {
    let config = test_config();

    assert_eq!(config.calendar_id, "primary");
    assert_eq!(config.reminder_offsets_min, vec![10, 2]);
    assert!(config.parsed_timezone().is_ok());
}

/// Invalid timezone names are rejected when parsed
#[tokio::test]
async fn test_invalid_timezone_rejected() {
    let config = Config {
        timezone: "Not/AZone".to_string(),
        ..test_config()
    };

    assert!(config.parsed_timezone().is_err());
}

/// Test basic calendar event parsing from an API item
#[tokio::test]
async fn test_event_from_item() {
    let item = json!({
        "id": "event1",
        "summary": "Test Event 1",
        "start": { "dateTime": "2023-01-01T10:00:00Z" },
        "end": { "dateTime": "2023-01-01T11:00:00Z" }
    });

    let event = CalendarEvent::from_item(&item);

    assert_eq!(event.id, "event1");
    assert_eq!(event.summary, Some("Test Event 1".to_string()));
    assert_eq!(
        event.start_date_time,
        Some("2023-01-01T10:00:00Z".to_string())
    );
    assert_eq!(event.start_date, None);
}

/// Untitled and all-day events still parse
#[tokio::test]
async fn test_event_from_item_all_day_untitled() {
    let item = json!({
        "id": "event2",
        "start": { "date": "2023-01-02" }
    });

    let event = CalendarEvent::from_item(&item);

    assert_eq!(event.id, "event2");
    assert_eq!(event.summary, None);
    assert_eq!(event.title(), "No Title");
    assert_eq!(event.start_date, Some("2023-01-02".to_string()));
}
