use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Title attached to every automatic deadline reminder.
pub const REMINDER_TITLE: &str = "Task Deadline Reminder";

/// How pressing a deadline is. Variants are declared in ascending order so
/// the derived `Ord` is the escalation order used by the hysteresis rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrgencyLevel::Low => write!(f, "low"),
            UrgencyLevel::Medium => write!(f, "medium"),
            UrgencyLevel::High => write!(f, "high"),
            UrgencyLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Coarse notification category; only affects display styling downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    DeadlineReminder,
    OverdueAlert,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::DeadlineReminder => write!(f, "deadline_reminder"),
            NotificationKind::OverdueAlert => write!(f, "overdue_alert"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Maps the stored priority label of a task row. `Urgent` folds into
    /// `High`; anything unrecognised carries no priority.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" | "urgent" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

/// Point-in-time view of a task handed to the notifier by a poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskSnapshot {
    pub id: i64,
    pub title: String,
    /// ISO-8601 timestamp; `None` means the task is never scheduled.
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

/// Last reminder emitted for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NotificationRecord {
    pub task_id: i64,
    pub last_notified_at: DateTime<Utc>,
    pub urgency_level: UrgencyLevel,
}

/// One row of the reminder cadence table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReminderTier {
    /// Minutes between repeat reminders; `None` never repeats automatically.
    pub interval_minutes: Option<u32>,
    pub display_duration_ms: u32,
    pub urgency: UrgencyLevel,
}

/// What the sink receives for one emitted reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeadlineReminder {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub task_id: i64,
    pub display_duration_ms: u32,
}

/// A task whose snapshot could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TaskFailure {
    pub task_id: i64,
    pub error: String,
}

/// Outcome of one batch evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BatchReport {
    pub emitted: Vec<DeadlineReminder>,
    pub failures: Vec<TaskFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_ordering() {
        assert!(UrgencyLevel::Low < UrgencyLevel::Medium);
        assert!(UrgencyLevel::Medium < UrgencyLevel::High);
        assert!(UrgencyLevel::High < UrgencyLevel::Critical);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&NotificationKind::OverdueAlert).unwrap();
        assert_eq!(json, "\"overdue_alert\"");
        assert_eq!(NotificationKind::DeadlineReminder.to_string(), "deadline_reminder");
    }

    #[test]
    fn test_priority_from_label() {
        assert_eq!(TaskPriority::from_label("Low"), Some(TaskPriority::Low));
        assert_eq!(TaskPriority::from_label("Urgent"), Some(TaskPriority::High));
        assert_eq!(TaskPriority::from_label("someday"), None);
    }

    #[test]
    fn test_snapshot_defaults_optional_fields() {
        let task: TaskSnapshot = serde_json::from_str(r#"{"id": 7, "title": "Ship"}"#).unwrap();
        assert_eq!(task.id, 7);
        assert!(task.due_date.is_none());
        assert!(!task.completed);
        assert!(task.priority.is_none());
    }
}
