use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::core::task::{Priority, Task};
use crate::error::{Error, Result};

/// Partial update applied by [`TaskStore::update`].
///
/// The nested options on the date fields distinguish "leave unchanged"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub reminder: Option<Option<NaiveDateTime>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.reminder.is_none()
    }
}

/// In-memory ordered task collection, newest first. The single source of
/// truth; every view is derived from it and every mutation goes through it.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Create a task and prepend it. Returns the fresh id.
    pub fn add(
        &mut self,
        text: &str,
        priority: Priority,
        due_date: Option<NaiveDate>,
        reminder: Option<NaiveDateTime>,
    ) -> Result<Uuid> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::validation("Please enter a task description."));
        }

        let mut task = Task::new(text);
        task.priority = priority;
        task.due_date = due_date;
        task.reminder = reminder;

        let id = task.id;
        self.tasks.insert(0, task);
        Ok(id)
    }

    /// Apply a partial update in place. Validation happens before the task
    /// is touched, so a failed update leaves the record as it was.
    pub fn update(&mut self, id: Uuid, patch: TaskPatch) -> Result<()> {
        let text = match patch.text {
            Some(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(Error::validation("Task description cannot be empty."));
                }
                Some(text)
            }
            None => None,
        };

        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;

        if let Some(text) = text {
            task.text = text;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(reminder) = patch.reminder {
            task.reminder = reminder;
        }
        Ok(())
    }

    /// Flip completion. Returns the new completed state.
    pub fn toggle_complete(&mut self, id: Uuid) -> Result<bool> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    /// Remove a task, handing the record back so callers can reference it
    /// (the deletion notice quotes its text).
    pub fn remove(&mut self, id: Uuid) -> Result<Task> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;
        Ok(self.tasks.remove(pos))
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Bulk-replace the whole collection (import). The replacement set must
    /// honor the store invariants: non-empty text, unique ids.
    pub fn replace_all(&mut self, records: Vec<Task>) -> Result<()> {
        let mut seen = HashSet::new();
        for record in &records {
            if record.text.trim().is_empty() {
                return Err(Error::validation("Imported task has an empty description."));
            }
            if !seen.insert(record.id) {
                return Err(Error::validation(format!(
                    "Imported tasks share the id {}.",
                    record.id
                )));
            }
        }
        self.tasks = records;
        Ok(())
    }
}
