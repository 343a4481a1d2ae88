use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A delivered reminder, kept so the user can review it later.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Option<i64>,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub display_duration_ms: i32,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
