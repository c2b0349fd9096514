use super::scheduler::ReminderPlan;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A reminder waiting to fire
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueuedReminder {
    pub fire_at: DateTime<Utc>,
    pub message: String,
}

/// Pending reminders ordered by fire time
#[derive(Debug, Default)]
pub struct ReminderQueue {
    heap: BinaryHeap<Reverse<QueuedReminder>>,
}

impl ReminderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Add a planned reminder to the queue
    pub fn push(&mut self, plan: ReminderPlan) {
        self.heap.push(Reverse(QueuedReminder {
            fire_at: plan.fire_at,
            message: plan.message,
        }));
    }

    /// Fire time of the next pending reminder
    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.heap.peek().map(|Reverse(next)| next.fire_at)
    }

    /// Remove and return every reminder due at or before `now`, earliest first
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<QueuedReminder> {
        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.heap.peek() {
            if next.fire_at > now {
                break;
            }
            if let Some(Reverse(reminder)) = self.heap.pop() {
                due.push(reminder);
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn plan(id: &str, fire_at: DateTime<Utc>) -> ReminderPlan {
        ReminderPlan {
            event_id: id.to_string(),
            fire_at,
            message: format!("reminder {}", id),
        }
    }

    #[test]
    fn test_pop_due_returns_earliest_first() {
        let now = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        let mut queue = ReminderQueue::new();
        queue.push(plan("late", now + Duration::minutes(30)));
        queue.push(plan("second", now - Duration::minutes(1)));
        queue.push(plan("first", now - Duration::minutes(5)));

        let due = queue.pop_due(now);

        assert_eq!(due.len(), 2);
        assert_eq!(due[0].message, "reminder first");
        assert_eq!(due[1].message, "reminder second");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_fire_at(), Some(now + Duration::minutes(30)));
    }

    #[test]
    fn test_pop_due_leaves_future_reminders() {
        let now = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        let mut queue = ReminderQueue::new();
        queue.push(plan("future", now + Duration::seconds(1)));

        assert!(queue.pop_due(now).is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_empty_queue_has_no_next_fire() {
        let queue = ReminderQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.next_fire_at(), None);
    }
}
