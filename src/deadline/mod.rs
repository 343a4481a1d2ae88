//! Deadline reminders: the per-task notification policy, the session
//! registry that owns one notifier per user, and the service plumbing that
//! polls tasks and delivers reminders.

pub mod deadline_dto;
pub mod deadline_error;
pub mod deadline_handlers;
pub mod deadline_models;
pub mod deadline_notifier;
pub mod deadline_policy;
pub mod deadline_registry;
pub mod deadline_service;
pub mod deadline_sink;

pub use deadline_error::{DeadlineError, SinkError};
pub use deadline_models::{
    BatchReport, DeadlineReminder, NotificationKind, NotificationRecord, ReminderTier,
    TaskFailure, TaskPriority, TaskSnapshot, UrgencyLevel, REMINDER_TITLE,
};
pub use deadline_notifier::DeadlineNotifier;
pub use deadline_registry::{NotifierRegistry, SessionNotifier, StreamGuard};
pub use deadline_service::{
    check_task_deadlines, forward_reminders, poll_sessions, poll_user, start_deadline_service,
};
pub use deadline_sink::{ChannelSink, NotificationSink, ReminderSender, UserReminder};
