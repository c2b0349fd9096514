use crate::components::google_calendar::models::CalendarEvent;
use crate::components::google_calendar::time::event_start;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// A single reminder to fire at an absolute instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlan {
    pub event_id: String,
    pub fire_at: DateTime<Utc>,
    pub message: String,
}

/// Per-event record of which reminder offsets have already been scheduled.
///
/// The same event is seen across many polls because the poll interval is
/// much shorter than the fetch window; this ledger is the sole mechanism
/// preventing duplicate announcements.
#[derive(Debug, Default)]
pub struct ReminderLedger {
    entries: HashMap<String, LedgerEntry>,
}

#[derive(Debug)]
struct LedgerEntry {
    start: DateTime<Utc>,
    recorded_offsets: HashSet<i64>,
}

impl ReminderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events with at least one recorded offset
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the offset is already recorded for the event
    pub fn is_recorded(&self, event_id: &str, offset_min: i64) -> bool {
        self.entries
            .get(event_id)
            .map(|entry| entry.recorded_offsets.contains(&offset_min))
            .unwrap_or(false)
    }

    /// Whether every offset is already recorded for the event
    pub fn fully_recorded(&self, event_id: &str, offsets_min: &[i64]) -> bool {
        match self.entries.get(event_id) {
            Some(entry) => offsets_min
                .iter()
                .all(|offset| entry.recorded_offsets.contains(offset)),
            None => false,
        }
    }

    /// Record an offset for an event
    pub fn record(&mut self, event_id: &str, start: DateTime<Utc>, offset_min: i64) {
        let entry = self
            .entries
            .entry(event_id.to_string())
            .or_insert_with(|| LedgerEntry {
                start,
                recorded_offsets: HashSet::new(),
            });
        entry.start = start;
        entry.recorded_offsets.insert(offset_min);
    }

    /// Drop entries for events that have already started.
    ///
    /// Fire times always precede the event start and the fetch window
    /// never returns started events, so an evicted id cannot reappear.
    pub fn evict_started(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| entry.start > now);
    }
}

/// Decide which reminders to fire for a batch of upcoming events.
///
/// Each offset is planned at most once per event no matter how often the
/// event reappears across overlapping fetch windows. Offsets whose fire
/// time has already passed are recorded without planning, so a reminder
/// missed between polls stays silent instead of firing late.
pub fn plan_reminders(
    ledger: &mut ReminderLedger,
    events: &[CalendarEvent],
    offsets_min: &[i64],
    tz: Tz,
    now: DateTime<Utc>,
) -> Vec<ReminderPlan> {
    let mut plans = Vec::new();

    for event in events {
        let start = match event_start(event, tz) {
            Ok(Some(start)) => start,
            Ok(None) => {
                warn!("Event {} has no start time, skipping", event.id);
                continue;
            }
            Err(e) => {
                warn!("Could not resolve start of event {}: {}", event.id, e);
                continue;
            }
        };

        if ledger.fully_recorded(&event.id, offsets_min) {
            continue;
        }

        for &offset_min in offsets_min {
            if ledger.is_recorded(&event.id, offset_min) {
                continue;
            }

            let fire_at = start - Duration::minutes(offset_min);
            if fire_at > now {
                plans.push(ReminderPlan {
                    event_id: event.id.clone(),
                    fire_at,
                    message: format!(
                        "Upcoming event in {} minutes: {}",
                        offset_min,
                        event.title()
                    ),
                });
                info!(
                    "Scheduled {}-minute reminder for \"{}\"",
                    offset_min,
                    event.title()
                );
            }
            ledger.record(&event.id, start, offset_min);
        }
    }

    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const OFFSETS: [i64; 2] = [10, 2];

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap()
    }

    fn event(id: &str, summary: Option<&str>, start: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: summary.map(|s| s.to_string()),
            start_date_time: Some(start.to_rfc3339()),
            start_date: None,
        }
    }

    #[test]
    fn test_far_future_event_gets_all_offsets() {
        let now = test_now();
        let mut ledger = ReminderLedger::new();
        let events = vec![event("e1", Some("Standup"), now + Duration::minutes(15))];

        let plans = plan_reminders(&mut ledger, &events, &OFFSETS, chrono_tz::UTC, now);

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].fire_at, now + Duration::minutes(5));
        assert_eq!(plans[1].fire_at, now + Duration::minutes(13));
        assert!(plans[0].message.contains("Standup"));
        assert!(plans[1].message.contains("Standup"));
        assert_eq!(plans[0].message, "Upcoming event in 10 minutes: Standup");
        assert_eq!(plans[1].message, "Upcoming event in 2 minutes: Standup");
    }

    #[test]
    fn test_near_event_gets_only_short_offset() {
        let now = test_now();
        let mut ledger = ReminderLedger::new();
        let events = vec![event("e1", Some("Standup"), now + Duration::minutes(5))];

        let plans = plan_reminders(&mut ledger, &events, &OFFSETS, chrono_tz::UTC, now);

        // The 10-minute fire time has passed; only the 2-minute reminder fires
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].fire_at, now + Duration::minutes(3));
        assert_eq!(plans[0].message, "Upcoming event in 2 minutes: Standup");
        assert!(ledger.is_recorded("e1", 10));
        assert!(ledger.is_recorded("e1", 2));
    }

    #[test]
    fn test_past_event_records_without_planning() {
        let now = test_now();
        let mut ledger = ReminderLedger::new();
        let events = vec![event("e1", Some("Standup"), now - Duration::minutes(5))];

        let plans = plan_reminders(&mut ledger, &events, &OFFSETS, chrono_tz::UTC, now);

        assert!(plans.is_empty());
        assert!(ledger.fully_recorded("e1", &OFFSETS));
    }

    #[test]
    fn test_reprocessing_is_idempotent() {
        let now = test_now();
        let mut ledger = ReminderLedger::new();
        let events = vec![
            event("e1", Some("Standup"), now + Duration::minutes(30)),
            event("e2", Some("Lunch"), now + Duration::hours(2)),
        ];

        let first = plan_reminders(&mut ledger, &events, &OFFSETS, chrono_tz::UTC, now);
        assert_eq!(first.len(), 4);
        let tracked = ledger.len();

        let second = plan_reminders(&mut ledger, &events, &OFFSETS, chrono_tz::UTC, now);
        assert!(second.is_empty());
        assert_eq!(ledger.len(), tracked);
    }

    #[test]
    fn test_missed_offset_not_planned_on_later_poll() {
        let now = test_now();
        let mut ledger = ReminderLedger::new();
        let events = vec![event("e1", Some("Standup"), now + Duration::minutes(30))];

        // First poll sees only the 10-minute offset recorded
        let partial = [10];
        plan_reminders(&mut ledger, &events, &partial, chrono_tz::UTC, now);

        // A later poll with both offsets only plans the missing one
        let plans = plan_reminders(&mut ledger, &events, &OFFSETS, chrono_tz::UTC, now);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].message, "Upcoming event in 2 minutes: Standup");
    }

    #[test]
    fn test_event_without_start_is_skipped() {
        let now = test_now();
        let mut ledger = ReminderLedger::new();
        let events = vec![CalendarEvent {
            id: "e1".to_string(),
            summary: Some("Standup".to_string()),
            start_date_time: None,
            start_date: None,
        }];

        let plans = plan_reminders(&mut ledger, &events, &OFFSETS, chrono_tz::UTC, now);

        assert!(plans.is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_untitled_event_uses_placeholder() {
        let now = test_now();
        let mut ledger = ReminderLedger::new();
        let events = vec![event("e1", None, now + Duration::minutes(15))];

        let plans = plan_reminders(&mut ledger, &events, &OFFSETS, chrono_tz::UTC, now);

        assert_eq!(plans[0].message, "Upcoming event in 10 minutes: No Title");
    }

    #[test]
    fn test_evict_started_drops_old_entries() {
        let now = test_now();
        let mut ledger = ReminderLedger::new();
        ledger.record("past", now - Duration::minutes(1), 10);
        ledger.record("future", now + Duration::minutes(30), 10);

        ledger.evict_started(now);

        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_recorded("future", 10));
        assert!(!ledger.is_recorded("past", 10));
    }
}
