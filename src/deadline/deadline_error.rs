use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("reminder channel is closed")]
    ChannelClosed,

    #[error("sink rejected reminder: {0}")]
    Rejected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeadlineError {
    #[error("invalid task data for task {task_id}: unparsable due date {due_date:?}")]
    InvalidTaskData { task_id: i64, due_date: String },

    #[error("notification sink failed: {0}")]
    Sink(#[from] SinkError),
}

impl DeadlineError {
    /// Task the failure is scoped to, if any.
    pub fn task_id(&self) -> Option<i64> {
        match self {
            DeadlineError::InvalidTaskData { task_id, .. } => Some(*task_id),
            DeadlineError::Sink(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeadlineError>;
