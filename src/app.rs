use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::core::task::{Priority, Task};
use crate::error::Error;
use crate::notify::{Notification, NotificationSink};
use crate::reminder::ReminderSchedule;
use crate::storage::Storage;
use crate::store::{TaskPatch, TaskStore};
use crate::view::{self, Filter, SortKey, TaskStats};

/// Reminders and overdue warnings linger longer than the default toast.
const REMINDER_DURATION: Duration = Duration::from_millis(8000);
const OVERDUE_DURATION: Duration = Duration::from_millis(6000);

/// Owns the task list state: store, storage slot, reminder schedule and the
/// active filter/sort. Every mutation runs the same sequence — store op,
/// persistence write, reminder resync — before anything re-renders.
///
/// The store never rolls back on a failed save; the in-memory state stays
/// authoritative and the failure is reported through the sink.
pub struct App {
    store: TaskStore,
    storage: Storage,
    schedule: ReminderSchedule,
    filter: Filter,
    sort: SortKey,
}

impl App {
    /// Load persisted tasks and arm reminders for them.
    pub fn open(storage: Storage, sink: &mut dyn NotificationSink) -> Self {
        let tasks = storage.load();
        log::info!("Loaded {} tasks from {}", tasks.len(), storage.path().display());

        let mut app = Self {
            store: TaskStore::new(tasks),
            storage,
            schedule: ReminderSchedule::new(),
            filter: Filter::default(),
            sort: SortKey::default(),
        };
        app.schedule.resync(app.store.tasks(), now());

        if app.store.is_empty() {
            sink.push(Notification::success(
                "Welcome to Track-List! Add your first task to get started.",
            ));
        }
        app
    }

    pub fn add_task(
        &mut self,
        text: &str,
        priority: Priority,
        due_date: Option<NaiveDate>,
        reminder: Option<NaiveDateTime>,
        sink: &mut dyn NotificationSink,
    ) -> Option<Uuid> {
        match self.store.add(text, priority, due_date, reminder) {
            Ok(id) => {
                self.commit(sink);
                sink.push(Notification::success("Task added successfully!"));
                Some(id)
            }
            Err(e) => {
                self.report(e, sink);
                None
            }
        }
    }

    pub fn edit_task(
        &mut self,
        id: Uuid,
        patch: TaskPatch,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        match self.store.update(id, patch) {
            Ok(()) => {
                self.commit(sink);
                sink.push(Notification::success("Task updated successfully!"));
                true
            }
            Err(e) => {
                self.report(e, sink);
                false
            }
        }
    }

    pub fn toggle_done(&mut self, id: Uuid, sink: &mut dyn NotificationSink) -> bool {
        match self.store.toggle_complete(id) {
            Ok(completed) => {
                self.commit(sink);
                let status = if completed { "completed" } else { "reopened" };
                sink.push(Notification::success(format!("Task {status}!")));
                true
            }
            Err(e) => {
                self.report(e, sink);
                false
            }
        }
    }

    pub fn delete_task(&mut self, id: Uuid, sink: &mut dyn NotificationSink) -> bool {
        match self.store.remove(id) {
            Ok(task) => {
                self.commit(sink);
                sink.push(Notification::success(format!("Task \"{}\" deleted.", task.text)));
                true
            }
            Err(e) => {
                self.report(e, sink);
                false
            }
        }
    }

    pub fn clear_all(&mut self, sink: &mut dyn NotificationSink) {
        if self.store.is_empty() {
            sink.push(Notification::warning("No tasks to clear."));
            return;
        }
        self.store.clear();
        self.commit(sink);
        sink.push(Notification::success("All tasks cleared."));
    }

    pub fn export_tasks(&self, dir: &Path, sink: &mut dyn NotificationSink) -> Option<PathBuf> {
        match self
            .storage
            .export(self.store.tasks(), dir, Local::now().date_naive())
        {
            Ok(path) => {
                sink.push(Notification::success("Tasks exported successfully!"));
                Some(path)
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                sink.push(Notification::error(format!("Export failed: {e}")));
                None
            }
        }
    }

    pub fn import_tasks(&mut self, path: &Path, sink: &mut dyn NotificationSink) -> bool {
        let records = match Storage::import(path) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Import from {} failed: {}", path.display(), e);
                sink.push(Notification::error(
                    "Error importing tasks. Please check the file format.",
                ));
                return false;
            }
        };
        match self.store.replace_all(records) {
            Ok(()) => {
                self.commit(sink);
                sink.push(Notification::success("Tasks imported successfully!"));
                true
            }
            Err(e) => {
                self.report(e, sink);
                false
            }
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn find(&self, id: Uuid) -> Option<&Task> {
        self.store.get(id)
    }

    /// The active projection: filtered and sorted for display.
    pub fn visible_tasks(&self) -> Vec<Task> {
        view::project(self.store.tasks(), self.filter, self.sort)
    }

    pub fn stats(&self) -> TaskStats {
        view::stats(self.store.tasks())
    }

    /// Soonest pending reminder; the frontend timer sleeps until it.
    pub fn next_reminder_deadline(&self) -> Option<NaiveDateTime> {
        self.schedule.next_deadline()
    }

    /// Forward every reminder that has come due to the sink. Returns how
    /// many fired.
    pub fn fire_due_reminders(&mut self, sink: &mut dyn NotificationSink) -> usize {
        let due = self.schedule.pop_due(now());
        for reminder in &due {
            log::info!("Reminder fired for task {}", reminder.task_id);
            sink.push(
                Notification::warning(format!("Reminder: {}", reminder.text))
                    .with_duration(REMINDER_DURATION),
            );
        }
        due.len()
    }

    /// Warn once about incomplete tasks whose due date has passed.
    pub fn check_overdue(&self, sink: &mut dyn NotificationSink) {
        let today = Local::now().date_naive();
        let overdue = self
            .store
            .tasks()
            .iter()
            .filter(|t| t.is_overdue(today))
            .count();
        if overdue > 0 {
            let plural = if overdue > 1 { "s" } else { "" };
            sink.push(
                Notification::warning(format!("You have {overdue} overdue task{plural}!"))
                    .with_duration(OVERDUE_DURATION),
            );
        }
    }

    /// Persist and resync after a successful store mutation. A save failure
    /// is reported and swallowed; the reminder schedule is rebuilt either
    /// way so it always reflects the store.
    fn commit(&mut self, sink: &mut dyn NotificationSink) {
        if let Err(e) = self.storage.save(self.store.tasks()) {
            log::error!("Failed to save tasks: {}", e);
            sink.push(Notification::error("Error saving tasks to local storage."));
        }
        self.schedule.resync(self.store.tasks(), now());
    }

    fn report(&self, err: Error, sink: &mut dyn NotificationSink) {
        if let Error::NotFound(id) = err {
            // Stale id from a previous render; nothing to corrupt, nothing to do.
            log::warn!("Ignoring operation on missing task {}", id);
            return;
        }
        sink.push(Notification::warning(err.to_string()));
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use std::fs;

    /// Sink that remembers everything it was shown.
    #[derive(Default)]
    struct RecordingSink {
        notifications: Vec<Notification>,
    }

    impl NotificationSink for RecordingSink {
        fn push(&mut self, notification: Notification) {
            self.notifications.push(notification);
        }
    }

    impl RecordingSink {
        fn messages(&self) -> Vec<&str> {
            self.notifications
                .iter()
                .map(|n| n.message.as_str())
                .collect()
        }
    }

    fn open_in(dir: &Path) -> (App, RecordingSink) {
        let mut sink = RecordingSink::default();
        let app = App::open(Storage::new(dir.join("tasks.json")), &mut sink);
        (app, sink)
    }

    #[test]
    fn empty_start_greets() {
        let dir = tempfile::tempdir().unwrap();
        let (_, sink) = open_in(dir.path());
        assert_eq!(sink.notifications.len(), 1);
        assert!(sink.notifications[0].message.starts_with("Welcome"));
    }

    #[test]
    fn add_persists_before_returning() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());

        app.add_task("buy milk", Priority::High, None, None, &mut sink);

        // The slot was written as part of the mutation, not lazily.
        let (reopened, _) = open_in(dir.path());
        let tasks = reopened.visible_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "buy milk");
        assert_eq!(tasks[0].priority, Priority::High);
    }

    #[test]
    fn add_empty_text_warns_and_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());
        sink.notifications.clear();

        assert!(app.add_task("   ", Priority::Medium, None, None, &mut sink).is_none());
        assert_eq!(app.stats().total, 0);
        assert_eq!(sink.notifications.len(), 1);
        assert_eq!(sink.notifications[0].severity, Severity::Warning);
    }

    #[test]
    fn toggle_wording_matches_direction() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());
        let id = app
            .add_task("task", Priority::Medium, None, None, &mut sink)
            .unwrap();
        sink.notifications.clear();

        app.toggle_done(id, &mut sink);
        app.toggle_done(id, &mut sink);
        assert_eq!(sink.messages(), ["Task completed!", "Task reopened!"]);
        assert!(!app.find(id).unwrap().completed);
    }

    #[test]
    fn delete_quotes_the_task_text() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());
        let id = app
            .add_task("feed the cat", Priority::Medium, None, None, &mut sink)
            .unwrap();
        sink.notifications.clear();

        assert!(app.delete_task(id, &mut sink));
        assert_eq!(sink.messages(), ["Task \"feed the cat\" deleted."]);
        assert_eq!(app.stats().total, 0);
    }

    #[test]
    fn stale_id_is_a_silent_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());
        app.add_task("task", Priority::Medium, None, None, &mut sink);
        sink.notifications.clear();

        assert!(!app.toggle_done(Uuid::new_v4(), &mut sink));
        assert!(!app.delete_task(Uuid::new_v4(), &mut sink));
        assert!(sink.notifications.is_empty());
        assert_eq!(app.stats().total, 1);
    }

    #[test]
    fn clear_on_empty_store_only_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());
        sink.notifications.clear();

        app.clear_all(&mut sink);
        assert_eq!(sink.messages(), ["No tasks to clear."]);
    }

    #[test]
    fn mutation_arms_and_disarms_reminders() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());

        let soon = now() + chrono::Duration::minutes(5);
        let id = app
            .add_task("call mom", Priority::Medium, None, Some(soon), &mut sink)
            .unwrap();
        assert_eq!(app.next_reminder_deadline(), Some(soon));

        // Completing the task cancels its reminder via the resync.
        app.toggle_done(id, &mut sink);
        assert_eq!(app.next_reminder_deadline(), None);

        app.toggle_done(id, &mut sink);
        assert_eq!(app.next_reminder_deadline(), Some(soon));

        app.delete_task(id, &mut sink);
        assert_eq!(app.next_reminder_deadline(), None);
    }

    #[test]
    fn import_bad_payload_leaves_store_alone() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());
        app.add_task("survivor", Priority::Medium, None, None, &mut sink);
        sink.notifications.clear();

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{"not":"an array"}"#).unwrap();

        assert!(!app.import_tasks(&bad, &mut sink));
        assert_eq!(app.stats().total, 1);
        assert_eq!(sink.notifications.len(), 1);
        assert_eq!(sink.notifications[0].severity, Severity::Error);
    }

    #[test]
    fn export_then_import_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());
        app.add_task("keep me", Priority::Low, None, None, &mut sink);

        let snapshot = app.export_tasks(dir.path(), &mut sink).unwrap();

        app.clear_all(&mut sink);
        assert_eq!(app.stats().total, 0);

        assert!(app.import_tasks(&snapshot, &mut sink));
        let tasks = app.visible_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "keep me");
    }

    #[test]
    fn filter_and_sort_drive_the_projection() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut sink) = open_in(dir.path());
        let a = app
            .add_task("alpha", Priority::Low, None, None, &mut sink)
            .unwrap();
        app.add_task("beta", Priority::High, None, None, &mut sink);
        app.toggle_done(a, &mut sink);

        app.set_filter(Filter::Pending);
        let visible = app.visible_tasks();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "beta");

        app.set_filter(Filter::All);
        app.set_sort(SortKey::Alphabetical);
        let visible = app.visible_tasks();
        assert_eq!(visible[0].text, "alpha");
        assert_eq!(visible[1].text, "beta");
    }
}
