use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Sort weight: high outranks medium outranks low.
    pub fn weight(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// A single tracked task. Serialized camelCase into the JSON slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub reminder: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            priority: Priority::default(),
            due_date: None,
            reminder: None,
            completed: false,
            created_at: chrono::Local::now().naive_local(),
        }
    }

    /// Past its due date and still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        if self.completed {
            return false;
        }
        self.due_date.is_some_and(|due| due < today)
    }

    /// Has a reminder that should still fire.
    pub fn reminder_pending(&self, now: NaiveDateTime) -> bool {
        if self.completed {
            return false;
        }
        self.reminder.is_some_and(|at| at > now)
    }
}
