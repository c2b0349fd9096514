use super::models::CalendarEvent;
use crate::error::{fetch_error, AppResult};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolve the start of an event as an absolute instant.
///
/// Timed events carry an RFC 3339 datetime; all-day events carry a bare
/// date, taken as midnight in the configured timezone.
pub fn event_start(event: &CalendarEvent, tz: Tz) -> AppResult<Option<DateTime<Utc>>> {
    if let Some(start_time) = &event.start_date_time {
        let dt = DateTime::parse_from_rfc3339(start_time)
            .map_err(|e| fetch_error(&format!("Failed to parse datetime: {}", e)))?;
        Ok(Some(dt.with_timezone(&Utc)))
    } else if let Some(start_date) = &event.start_date {
        let date = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
            .map_err(|e| fetch_error(&format!("Failed to parse date: {}", e)))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| fetch_error("Failed to create datetime"))?;
        let local_dt = match tz.from_local_datetime(&midnight) {
            chrono::LocalResult::Single(dt) => dt,
            chrono::LocalResult::Ambiguous(_, _) => {
                return Err(fetch_error("Ambiguous local time"));
            }
            chrono::LocalResult::None => {
                return Err(fetch_error("Invalid local time"));
            }
        };
        Ok(Some(local_dt.with_timezone(&Utc)))
    } else {
        Ok(None)
    }
}

/// Sort events by resolved start time, unresolvable starts last
pub fn sort_by_start(events: &mut [CalendarEvent], tz: Tz) {
    events.sort_by_key(|event| match event_start(event, tz) {
        Ok(Some(start)) => (0, start),
        _ => (1, DateTime::<Utc>::MAX_UTC),
    });
}
