use crate::deadline::DeadlineReminder;
use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;
use super::notification_models::Notification;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, reminder: &DeadlineReminder) -> Result<Notification> {
        let display_duration_ms = i32::try_from(reminder.display_duration_ms).unwrap_or(i32::MAX);

        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, task_id, kind, title, message, display_duration_ms)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *"
        )
        .bind(user_id)
        .bind(reminder.task_id)
        .bind(reminder.kind.to_string())
        .bind(&reminder.title)
        .bind(&reminder.message)
        .bind(display_duration_ms)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }
}
