pub mod task_models;
pub mod task_repository;

pub use task_models::{Task, TaskStatus};
pub use task_repository::TaskRepository;
