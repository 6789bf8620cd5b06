use std::cmp::Reverse;

use chrono::NaiveDate;

use crate::core::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "completed" | "done" => Some(Self::Completed),
            _ => None,
        }
    }

    fn keeps(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Created,
    Priority,
    DueDate,
    Alphabetical,
}

impl SortKey {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Priority => "priority",
            Self::DueDate => "due",
            Self::Alphabetical => "alpha",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "priority" => Some(Self::Priority),
            "due" | "duedate" => Some(Self::DueDate),
            "alpha" | "alphabetical" => Some(Self::Alphabetical),
            _ => None,
        }
    }
}

/// Summary counts shown in the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

pub fn stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    TaskStats {
        total,
        pending: total - completed,
        completed,
    }
}

/// Filter and order tasks for display. Pure: the input is never mutated and
/// a fresh sequence comes back on every call.
///
/// All sorts are stable, so ties keep their relative input order. `Created`
/// re-sorts explicitly rather than relying on insertion order, since
/// `replace_all` may supply tasks in any order.
pub fn project(tasks: &[Task], filter: Filter, sort: SortKey) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.iter().filter(|t| filter.keeps(t)).cloned().collect();

    match sort {
        SortKey::Created => out.sort_by_key(|t| Reverse(t.created_at)),
        SortKey::Priority => out.sort_by_key(|t| Reverse(t.priority.weight())),
        // Undated tasks sort after every dated one.
        SortKey::DueDate => out.sort_by_key(|t| t.due_date.unwrap_or(NaiveDate::MAX)),
        SortKey::Alphabetical => {
            out.sort_by(|a, b| a.text.to_lowercase().cmp(&b.text.to_lowercase()))
        }
    }

    out
}
