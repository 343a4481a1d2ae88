use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::deadline_error::{DeadlineError, Result};
use super::deadline_models::{
    BatchReport, DeadlineReminder, NotificationRecord, TaskFailure, TaskSnapshot, REMINDER_TITLE,
};
use super::deadline_policy::{
    classify, format_message, minutes_between, notification_kind, parse_due_date, should_notify,
};
use super::deadline_sink::NotificationSink;

/// Decides when each task gets a deadline reminder and remembers the last
/// one sent per task. One instance per user session.
pub struct DeadlineNotifier<S> {
    sink: S,
    records: DashMap<i64, NotificationRecord>,
}

impl<S: NotificationSink> DeadlineNotifier<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            records: DashMap::new(),
        }
    }

    pub fn check_and_notify(&self, task: &TaskSnapshot) -> Result<Option<DeadlineReminder>> {
        self.check_and_notify_at(task, Utc::now())
    }

    /// Evaluates one task as of `now` and emits a reminder if it is due.
    ///
    /// Returns the reminder handed to the sink, or `None` when the task was
    /// skipped or is still cooling down. Skips never touch the record table.
    pub fn check_and_notify_at(
        &self,
        task: &TaskSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Option<DeadlineReminder>> {
        if task.completed {
            return Ok(None);
        }

        let Some(raw_due) = task.due_date.as_deref() else {
            return Ok(None);
        };

        let due = parse_due_date(task.id, raw_due)?;
        let minutes_until_due = minutes_between(now, due);

        // TODO: decide whether overdue tasks should keep nagging after the deadline.
        if minutes_until_due < 0.0 {
            debug!("Task {} is overdue, no reminder scheduled", task.id);
            return Ok(None);
        }

        let tier = classify(minutes_until_due);

        // Holding the entry makes the read-decide-write atomic per task.
        let entry = self.records.entry(task.id);
        let previous = match &entry {
            Entry::Occupied(occupied) => Some(*occupied.get()),
            Entry::Vacant(_) => None,
        };

        if !should_notify(previous.as_ref(), &tier, now) {
            debug!(
                "Task {} still cooling down at {} urgency",
                task.id, tier.urgency
            );
            return Ok(None);
        }

        let reminder = DeadlineReminder {
            kind: notification_kind(tier.urgency),
            title: REMINDER_TITLE.to_string(),
            message: format_message(&task.title, minutes_until_due),
            task_id: task.id,
            display_duration_ms: tier.display_duration_ms,
        };

        self.sink.notify(&reminder)?;

        entry.insert(NotificationRecord {
            task_id: task.id,
            last_notified_at: now,
            urgency_level: tier.urgency,
        });

        debug!(
            "Sent {} reminder for task {} ({:.1} minutes left)",
            tier.urgency, task.id, minutes_until_due
        );

        Ok(Some(reminder))
    }

    pub fn check_multiple_tasks(&self, tasks: &[TaskSnapshot]) -> Result<BatchReport> {
        self.check_multiple_tasks_at(tasks, Utc::now())
    }

    /// Evaluates every task independently. Invalid task data is collected
    /// per task; a sink failure aborts the batch.
    pub fn check_multiple_tasks_at(
        &self,
        tasks: &[TaskSnapshot],
        now: DateTime<Utc>,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for task in tasks {
            match self.check_and_notify_at(task, now) {
                Ok(Some(reminder)) => report.emitted.push(reminder),
                Ok(None) => {}
                Err(err @ DeadlineError::InvalidTaskData { .. }) => {
                    warn!("Skipping task {}: {}", task.id, err);
                    report.failures.push(TaskFailure {
                        task_id: task.id,
                        error: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    /// Forgets a task so its next check counts as a first reminder.
    pub fn clear_task_history(&self, task_id: i64) -> Option<NotificationRecord> {
        self.records.remove(&task_id).map(|(_, record)| record)
    }

    /// Drops records for tasks not in `live_task_ids`, e.g. deleted tasks.
    /// Returns how many were removed.
    pub fn retain_tasks(&self, live_task_ids: &HashSet<i64>) -> usize {
        let before = self.records.len();
        self.records.retain(|task_id, _| live_task_ids.contains(task_id));
        before.saturating_sub(self.records.len())
    }

    pub fn clear_all_history(&self) {
        self.records.clear();
    }

    pub fn get_notification_status(&self, task_id: i64) -> Option<NotificationRecord> {
        self.records.get(&task_id).map(|record| *record)
    }

    pub fn tracked_tasks(&self) -> usize {
        self.records.len()
    }
}
