//! Storage for users, tasks and comments.
//!
//! Services only talk to the `Repository` trait. `PgRepository` is what the
//! server runs on; `MemoryRepository` keeps everything in a process-local map
//! and backs the test suites.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{
    Comment, CommentFilter, NewComment, NewTask, NewUser, Page, PageRequest, Task, TaskFilter,
    User,
};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Check-and-change step run against a task while the repository holds it
/// exclusively. Returning an error aborts the update and leaves the row untouched.
pub type TaskMutation = Box<dyn FnOnce(&mut Task) -> Result<(), AppError> + Send>;

/// Check run against a task while the repository holds it exclusively, before
/// deleting it.
pub type TaskCheck = Box<dyn FnOnce(&Task) -> Result<(), AppError> + Send>;

#[async_trait]
pub trait Repository: Send + Sync {
    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    /// Fails with `AppError::AlreadyExists` if the email is taken.
    async fn save_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_task_by_id(&self, task_id: i64) -> Result<Option<Task>, AppError>;

    async fn save_task(&self, task: NewTask) -> Result<Task, AppError>;

    /// Loads the task, runs `mutation` on it and persists the result as one
    /// atomic unit.
    ///
    /// Only title, description, status, priority and executor are written back;
    /// a mutation cannot move a task to another author. Fails with
    /// `AppError::TaskNotFound` if the task is absent, including when it is
    /// deleted concurrently.
    async fn update_task(&self, task_id: i64, mutation: TaskMutation) -> Result<Task, AppError>;

    /// Loads the task, runs `check` and deletes it as one atomic unit, together
    /// with its comments.
    async fn delete_task(&self, task_id: i64, check: TaskCheck) -> Result<(), AppError>;

    /// Tasks matching every supplied filter field, ordered by id.
    async fn find_tasks(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError>;

    async fn save_comment(&self, comment: NewComment) -> Result<Comment, AppError>;

    /// Comments on `task_id` matching the filter, ordered by id.
    async fn find_comments(
        &self,
        task_id: i64,
        filter: &CommentFilter,
        page: PageRequest,
    ) -> Result<Page<Comment>, AppError>;
}
