use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::deadline::{TaskPriority, TaskSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Archived,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "Pending"),
            TaskStatus::InProgress => write!(f, "InProgress"),
            TaskStatus::Completed => write!(f, "Completed"),
            TaskStatus::Archived => write!(f, "Archived"),
        }
    }
}

/// Task row as stored by the task-management API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed.to_string()
    }

    pub fn to_snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            title: self.title.clone(),
            due_date: self
                .due_date
                .map(|due| due.to_rfc3339_opts(SecondsFormat::Millis, true)),
            completed: self.is_completed(),
            priority: TaskPriority::from_label(&self.priority),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(status: &str, priority: &str) -> Task {
        let created = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        Task {
            id: 12,
            user_id: Uuid::new_v4(),
            title: "Renew passport".to_string(),
            description: None,
            status: status.to_string(),
            priority: priority.to_string(),
            due_date: Some(Utc.with_ymd_and_hms(2025, 1, 12, 17, 0, 0).unwrap()),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_task_status_display() {
        assert_eq!(TaskStatus::Pending.to_string(), "Pending");
        assert_eq!(TaskStatus::InProgress.to_string(), "InProgress");
        assert_eq!(TaskStatus::Completed.to_string(), "Completed");
        assert_eq!(TaskStatus::Archived.to_string(), "Archived");
    }

    #[test]
    fn test_snapshot_from_open_task() {
        let snapshot = task("InProgress", "Urgent").to_snapshot();

        assert_eq!(snapshot.id, 12);
        assert_eq!(snapshot.title, "Renew passport");
        assert_eq!(snapshot.due_date.as_deref(), Some("2025-01-12T17:00:00.000Z"));
        assert!(!snapshot.completed);
        assert_eq!(snapshot.priority, Some(TaskPriority::High));
    }

    #[test]
    fn test_snapshot_marks_completed_task() {
        let snapshot = task("Completed", "Low").to_snapshot();
        assert!(snapshot.completed);
        assert_eq!(snapshot.priority, Some(TaskPriority::Low));
    }
}
