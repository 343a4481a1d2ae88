use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use validator::Validate;

use crate::{
    error::{AppError, Result},
    middleware::AuthUser,
    state::AppState,
};
use super::{
    deadline_dto::{CheckTasksRequest, CheckTasksResponse},
    deadline_models::NotificationRecord,
};

/// Evaluate a batch of task snapshots against the caller's reminder history
#[utoipa::path(
    post,
    path = "/api/deadlines/check",
    request_body = CheckTasksRequest,
    responses(
        (status = 200, description = "Reminders emitted for this batch", body = CheckTasksResponse),
        (status = 400, description = "Invalid batch"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "deadlines",
    security(("bearer_auth" = []))
)]
pub async fn check_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CheckTasksRequest>,
) -> Result<Json<CheckTasksResponse>> {
    payload.validate()?;

    let report = state
        .notifiers
        .session(user_id)
        .check_multiple_tasks(&payload.tasks)?;

    Ok(Json(report.into()))
}

/// Last reminder sent for a task
#[utoipa::path(
    get,
    path = "/api/deadlines/{task_id}/status",
    params(
        ("task_id" = i64, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Last reminder record", body = NotificationRecord),
        (status = 404, description = "No reminder sent for this task"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "deadlines",
    security(("bearer_auth" = []))
)]
pub async fn get_notification_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
) -> Result<Json<NotificationRecord>> {
    let record = state
        .notifiers
        .get(&user_id)
        .and_then(|notifier| notifier.get_notification_status(task_id))
        .ok_or_else(|| AppError::NotFound("No reminder sent for this task".to_string()))?;

    Ok(Json(record))
}

/// Forget reminder history for a completed or deleted task
#[utoipa::path(
    delete,
    path = "/api/deadlines/{task_id}",
    params(
        ("task_id" = i64, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "History cleared"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "deadlines",
    security(("bearer_auth" = []))
)]
pub async fn clear_task_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
) -> StatusCode {
    if let Some(notifier) = state.notifiers.get(&user_id) {
        notifier.clear_task_history(task_id);
    }

    StatusCode::NO_CONTENT
}

/// End the caller's reminder session (logout)
#[utoipa::path(
    delete,
    path = "/api/deadlines",
    responses(
        (status = 204, description = "Session ended and history cleared"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "deadlines",
    security(("bearer_auth" = []))
)]
pub async fn end_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> StatusCode {
    state.notifiers.end_session(&user_id);
    StatusCode::NO_CONTENT
}

/// Real-time deadline reminders (SSE)
#[utoipa::path(
    get,
    path = "/api/deadlines/stream",
    responses(
        (status = 200, description = "Reminder stream established"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "deadlines",
    security(("bearer_auth" = []))
)]
pub async fn reminder_stream(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    // Subscribing opts the user into server-side polling until the client
    // disconnects and the session goes idle.
    let guard = state.notifiers.open_stream(user_id);

    let rx = state.reminder_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let _ = &guard;
        match result {
            Ok(user_reminder) if user_reminder.user_id == user_id => {
                let json = serde_json::to_string(&user_reminder.reminder).ok()?;
                Some(Ok(Event::default()
                    .event(user_reminder.reminder.kind.to_string())
                    .data(json)))
            }
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
