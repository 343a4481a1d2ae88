use crate::error::Result;
use sqlx::PgPool;

use super::task_models::Task;

/// Read side of the task table used by the deadline poller.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every task that carries a due date and has not been archived.
    /// Completed and overdue rows are left for the notifier to skip.
    pub async fn find_with_due_date(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks
             WHERE due_date IS NOT NULL
             AND status <> 'Archived'
             ORDER BY user_id, due_date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }
}
