//! Ownership rules for task mutations.
//!
//! Each function answers one question about a fully loaded `Task` and the id of
//! the caller. They never fail; a `false` is turned into `AppError::Forbidden`
//! by the service that asked.

use crate::models::Task;

/// Title, description and priority may only be changed by the author.
pub fn can_edit_task_body(task: &Task, caller_id: i64) -> bool {
    task.author_id == caller_id
}

/// Only the author assigns or reassigns the executor.
pub fn can_edit_executor(task: &Task, caller_id: i64) -> bool {
    task.author_id == caller_id
}

/// The author, or the executor when one is assigned.
pub fn can_edit_status(task: &Task, caller_id: i64) -> bool {
    task.author_id == caller_id || task.executor_id == Some(caller_id)
}

pub fn can_delete(task: &Task, caller_id: i64) -> bool {
    task.author_id == caller_id
}
