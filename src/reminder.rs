use std::cmp::Reverse;
use std::collections::BinaryHeap;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::core::task::Task;

/// A reminder whose fire-time has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub task_id: Uuid,
    pub text: String,
    pub at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    at: NaiveDateTime,
    task_id: Uuid,
    text: String,
}

/// Pending reminder deadlines, soonest first.
///
/// The schedule is rebuilt from scratch on every [`resync`]: entries for
/// tasks that were completed, deleted, or re-dated simply do not survive the
/// rebuild, which is the sole cancellation mechanism. One driving timer in
/// the frontend sleeps until [`next_deadline`] and then calls [`pop_due`].
/// Time is always passed in, so tests never sleep.
///
/// [`resync`]: ReminderSchedule::resync
/// [`next_deadline`]: ReminderSchedule::next_deadline
/// [`pop_due`]: ReminderSchedule::pop_due
#[derive(Debug, Default)]
pub struct ReminderSchedule {
    pending: BinaryHeap<Reverse<Entry>>,
}

impl ReminderSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute eligibility for the whole list: one entry per incomplete
    /// task whose reminder lies strictly in the future.
    pub fn resync(&mut self, tasks: &[Task], now: NaiveDateTime) {
        self.pending.clear();
        for task in tasks {
            if !task.reminder_pending(now) {
                continue;
            }
            let Some(at) = task.reminder else { continue };
            self.pending.push(Reverse(Entry {
                at,
                task_id: task.id,
                text: task.text.clone(),
            }));
        }
        log::debug!("Reminder resync: {} pending", self.pending.len());
    }

    /// Soonest pending fire-time, if any.
    pub fn next_deadline(&self) -> Option<NaiveDateTime> {
        self.pending.peek().map(|Reverse(entry)| entry.at)
    }

    /// Remove and return every entry due at or before `now`.
    pub fn pop_due(&mut self, now: NaiveDateTime) -> Vec<DueReminder> {
        let mut due = Vec::new();
        while self
            .pending
            .peek()
            .is_some_and(|Reverse(entry)| entry.at <= now)
        {
            if let Some(Reverse(entry)) = self.pending.pop() {
                due.push(DueReminder {
                    task_id: entry.task_id,
                    text: entry.text,
                    at: entry.at,
                });
            }
        }
        due
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn with_reminder(text: &str, reminder: NaiveDateTime) -> Task {
        let mut task = Task::new(text);
        task.reminder = Some(reminder);
        task
    }

    #[test]
    fn resync_skips_completed_past_and_unset() {
        let now = at(12, 0);

        let future = with_reminder("future", at(13, 0));
        let past = with_reminder("past", at(11, 0));
        let mut done = with_reminder("done", at(13, 0));
        done.completed = true;
        let none = Task::new("no reminder");

        let mut schedule = ReminderSchedule::new();
        schedule.resync(&[future, past, done, none], now);

        assert_eq!(schedule.pending_count(), 1);
        assert_eq!(schedule.next_deadline(), Some(at(13, 0)));
    }

    #[test]
    fn pop_due_fires_exactly_once() {
        let now = at(12, 0);
        let task = with_reminder("ping", at(12, 5));

        let mut schedule = ReminderSchedule::new();
        schedule.resync(std::slice::from_ref(&task), now);

        // Not yet due.
        assert!(schedule.pop_due(at(12, 4)).is_empty());

        let due = schedule.pop_due(at(12, 5));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].task_id, task.id);
        assert_eq!(due[0].text, "ping");

        // Already popped; nothing fires twice.
        assert!(schedule.pop_due(at(23, 59)).is_empty());
    }

    #[test]
    fn pop_due_returns_soonest_first() {
        let a = with_reminder("later", at(14, 0));
        let b = with_reminder("sooner", at(13, 0));

        let mut schedule = ReminderSchedule::new();
        schedule.resync(&[a, b], at(12, 0));

        let due = schedule.pop_due(at(15, 0));
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].text, "sooner");
        assert_eq!(due[1].text, "later");
    }

    #[test]
    fn resync_drops_entries_for_removed_or_completed_tasks() {
        let now = at(12, 0);
        let mut task = with_reminder("ping", at(12, 5));

        let mut schedule = ReminderSchedule::new();
        schedule.resync(std::slice::from_ref(&task), now);
        assert_eq!(schedule.pending_count(), 1);

        // Completed before the fire-time: the rebuild cancels it.
        task.completed = true;
        schedule.resync(std::slice::from_ref(&task), now);
        assert!(schedule.pop_due(at(12, 5)).is_empty());

        // Deleted before the fire-time: same story.
        schedule.resync(&[], now);
        assert_eq!(schedule.pending_count(), 0);
        assert!(schedule.pop_due(at(23, 59)).is_empty());
    }

    #[test]
    fn resync_picks_up_changed_reminder() {
        let now = at(12, 0);
        let mut task = with_reminder("ping", at(12, 5));

        let mut schedule = ReminderSchedule::new();
        schedule.resync(std::slice::from_ref(&task), now);

        task.reminder = Some(at(18, 0));
        schedule.resync(std::slice::from_ref(&task), now);

        assert!(schedule.pop_due(at(12, 5)).is_empty());
        assert_eq!(schedule.next_deadline(), Some(at(18, 0)));
    }
}
