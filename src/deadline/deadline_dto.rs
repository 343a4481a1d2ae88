use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::deadline_models::{BatchReport, DeadlineReminder, TaskFailure, TaskSnapshot};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckTasksRequest {
    #[validate(length(min = 1, max = 500))]
    pub tasks: Vec<TaskSnapshot>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckTasksResponse {
    pub emitted: Vec<DeadlineReminder>,
    pub failures: Vec<TaskFailure>,
}

impl From<BatchReport> for CheckTasksResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            emitted: report.emitted,
            failures: report.failures,
        }
    }
}
