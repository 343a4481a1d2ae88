use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{broadcast, mpsc};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::notification::NotificationRepository;
use crate::state::AppState;
use crate::task::Task;

use super::deadline_error::Result;
use super::deadline_models::TaskSnapshot;
use super::deadline_notifier::DeadlineNotifier;
use super::deadline_registry::NotifierRegistry;
use super::deadline_sink::{NotificationSink, UserReminder};

pub async fn start_deadline_service(state: AppState) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    let schedule = state.config.deadline_check_cron.clone();

    let job = Job::new_async(schedule.as_str(), move |_uuid, _l| {
        let state = state.clone();

        Box::pin(async move {
            if let Err(e) = check_task_deadlines(&state).await {
                error!("Error checking task deadlines: {:?}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Deadline service started ({})", schedule);
    Ok(scheduler)
}

/// One poll over the task table. Idle sessions are expired first, then
/// every remaining session is evaluated against its user's tasks.
pub async fn check_task_deadlines(state: &AppState) -> anyhow::Result<usize> {
    let idle_ttl = Duration::minutes(state.config.session_idle_minutes);
    let expired = state.notifiers.expire_idle(idle_ttl);
    if expired > 0 {
        info!("Expired {} idle deadline sessions", expired);
    }

    if state.notifiers.active_sessions() == 0 {
        return Ok(0);
    }

    let tasks = state.task_repository.find_with_due_date().await?;
    let sent = poll_sessions(&state.notifiers, &tasks, Utc::now());

    if sent > 0 {
        info!("Sent {} deadline reminders", sent);
    } else {
        debug!("No deadline reminders due");
    }

    Ok(sent)
}

/// Runs `poll_user` for every live session. A user whose poll fails is
/// logged and skipped; the others are still evaluated.
pub fn poll_sessions(
    notifiers: &NotifierRegistry,
    tasks: &[Task],
    now: DateTime<Utc>,
) -> usize {
    let grouped = group_by_user(tasks);
    let mut sent = 0;

    for (user_id, notifier) in notifiers.sessions() {
        let snapshots = grouped.get(&user_id).map(Vec::as_slice).unwrap_or(&[]);
        match poll_user(&notifier, snapshots, now) {
            Ok(count) => sent += count,
            Err(e) => error!("Deadline check failed for user {}: {}", user_id, e),
        }
    }

    sent
}

/// Brings one user's reminder history in line with their current tasks and
/// evaluates them. Records for tasks that are gone or completed are dropped,
/// so a task reopened later starts over with a first reminder.
pub fn poll_user<S: NotificationSink>(
    notifier: &DeadlineNotifier<S>,
    snapshots: &[TaskSnapshot],
    now: DateTime<Utc>,
) -> Result<usize> {
    let live: HashSet<i64> = snapshots.iter().map(|snapshot| snapshot.id).collect();
    let pruned = notifier.retain_tasks(&live);
    if pruned > 0 {
        debug!("Pruned reminder history for {} deleted tasks", pruned);
    }

    for snapshot in snapshots.iter().filter(|snapshot| snapshot.completed) {
        notifier.clear_task_history(snapshot.id);
    }

    let report = notifier.check_multiple_tasks_at(snapshots, now)?;
    Ok(report.emitted.len())
}

fn group_by_user(tasks: &[Task]) -> HashMap<Uuid, Vec<TaskSnapshot>> {
    let mut grouped: HashMap<Uuid, Vec<TaskSnapshot>> = HashMap::new();
    for task in tasks {
        grouped.entry(task.user_id).or_default().push(task.to_snapshot());
    }
    grouped
}

/// Persists every emitted reminder and fans it out to stream subscribers.
/// Runs until all notifier sinks are dropped.
pub async fn forward_reminders(
    mut rx: mpsc::UnboundedReceiver<UserReminder>,
    notification_repository: NotificationRepository,
    reminder_tx: broadcast::Sender<UserReminder>,
) {
    while let Some(user_reminder) = rx.recv().await {
        if let Err(e) = notification_repository
            .create(user_reminder.user_id, &user_reminder.reminder)
            .await
        {
            error!(
                "Failed to store reminder for task {}: {:?}",
                user_reminder.reminder.task_id, e
            );
        }

        // No subscribers is fine; the reminder is already stored.
        let _ = reminder_tx.send(user_reminder);
    }

    info!("Reminder channel closed");
}
