use tokio::sync::mpsc;
use uuid::Uuid;

use super::deadline_error::SinkError;
use super::deadline_models::DeadlineReminder;

/// Delivers reminders emitted by a [`DeadlineNotifier`](super::DeadlineNotifier).
///
/// Called while the notifier holds the task's record entry, so an
/// implementation must not call back into the same notifier.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, reminder: &DeadlineReminder) -> Result<(), SinkError>;
}

impl<F> NotificationSink for F
where
    F: Fn(&DeadlineReminder) -> Result<(), SinkError> + Send + Sync,
{
    fn notify(&self, reminder: &DeadlineReminder) -> Result<(), SinkError> {
        self(reminder)
    }
}

/// A reminder tagged with the user whose session emitted it.
#[derive(Debug, Clone)]
pub struct UserReminder {
    pub user_id: Uuid,
    pub reminder: DeadlineReminder,
}

pub type ReminderSender = mpsc::UnboundedSender<UserReminder>;

/// Hands reminders to the forwarding task without blocking.
#[derive(Clone)]
pub struct ChannelSink {
    user_id: Uuid,
    tx: ReminderSender,
}

impl ChannelSink {
    pub fn new(user_id: Uuid, tx: ReminderSender) -> Self {
        Self { user_id, tx }
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, reminder: &DeadlineReminder) -> Result<(), SinkError> {
        self.tx
            .send(UserReminder {
                user_id: self.user_id,
                reminder: reminder.clone(),
            })
            .map_err(|_| SinkError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadline::deadline_models::NotificationKind;

    fn reminder() -> DeadlineReminder {
        DeadlineReminder {
            kind: NotificationKind::DeadlineReminder,
            title: "Task Deadline Reminder".to_string(),
            message: "📅 \"Taxes\" is due in 5 hours".to_string(),
            task_id: 3,
            display_duration_ms: 2000,
        }
    }

    #[test]
    fn test_channel_sink_tags_user() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let user_id = Uuid::new_v4();
        let sink = ChannelSink::new(user_id, tx);

        sink.notify(&reminder()).unwrap();

        let received = rx.try_recv().unwrap();
        assert_eq!(received.user_id, user_id);
        assert_eq!(received.reminder.task_id, 3);
    }

    #[test]
    fn test_channel_sink_reports_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = ChannelSink::new(Uuid::new_v4(), tx);

        assert_eq!(sink.notify(&reminder()), Err(SinkError::ChannelClosed));
    }

    #[test]
    fn test_closure_is_a_sink() {
        let sink = |reminder: &DeadlineReminder| {
            if reminder.task_id == 3 {
                Err(SinkError::Rejected("muted".to_string()))
            } else {
                Ok(())
            }
        };
        assert!(sink.notify(&reminder()).is_err());
    }
}
