use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::validate_not_blank;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    /// Used whenever a request leaves the priority out.
    #[default]
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
///
/// Any status may follow any other; who may change it is decided by
/// `auth::permissions::can_edit_status`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Every task starts here.
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Body of a create or edit request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskCreateEditRequest {
    /// The title of the task. Must not be blank, at most 200 characters.
    #[validate(
        length(max = 200),
        custom(function = "validate_not_blank", message = "Title may not be blank")
    )]
    pub title: String,

    /// An optional description, at most 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Defaults to `MEDIUM` on creation; on edit, `None` keeps the current priority.
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStatusEditRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskExecutorEditRequest {
    pub executor_id: i64,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// The user who created the task. Never changes.
    pub author_id: i64,
    /// The user assigned to carry the task out, if any.
    pub executor_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub author_id: i64,
}

impl NewTask {
    /// Starts every task as `PENDING`, unassigned, owned by `author_id`.
    pub fn new(request: TaskCreateEditRequest, author_id: i64) -> Self {
        Self {
            title: request.title,
            description: request.description,
            status: TaskStatus::default(),
            priority: request.priority.unwrap_or_default(),
            author_id,
        }
    }
}

/// Query parameters for listing tasks. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub author_id: Option<i64>,
    pub executor_id: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// One equality constraint on a task column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPredicate {
    AuthorId(i64),
    ExecutorId(i64),
    Status(TaskStatus),
    Priority(TaskPriority),
}

impl TaskPredicate {
    pub fn column(&self) -> &'static str {
        match self {
            TaskPredicate::AuthorId(_) => "author_id",
            TaskPredicate::ExecutorId(_) => "executor_id",
            TaskPredicate::Status(_) => "status",
            TaskPredicate::Priority(_) => "priority",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match *self {
            TaskPredicate::AuthorId(id) => task.author_id == id,
            TaskPredicate::ExecutorId(id) => task.executor_id == Some(id),
            TaskPredicate::Status(status) => task.status == status,
            TaskPredicate::Priority(priority) => task.priority == priority,
        }
    }
}

impl TaskFilter {
    /// The supplied fields, in a fixed order, as predicates to be ANDed.
    pub fn predicates(&self) -> Vec<TaskPredicate> {
        [
            self.author_id.map(TaskPredicate::AuthorId),
            self.executor_id.map(TaskPredicate::ExecutorId),
            self.status.map(TaskPredicate::Status),
            self.priority.map(TaskPredicate::Priority),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.predicates().iter().all(|p| p.matches(task))
    }
}
