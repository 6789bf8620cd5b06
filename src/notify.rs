use std::time::Duration;

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// An ephemeral user-facing message. The core decides wording, severity and
/// how long it should linger; display and auto-dismiss are the sink's
/// business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
}

impl Notification {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(4000);

    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            duration: Self::DEFAULT_DURATION,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Where notifications go. The console frontend prints them; tests collect
/// them.
pub trait NotificationSink {
    fn push(&mut self, notification: Notification);
}
