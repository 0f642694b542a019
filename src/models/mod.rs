pub mod comment;
pub mod page;
pub mod task;
pub mod user;

use validator::ValidationError;

pub use comment::{Comment, CommentCreateRequest, CommentFilter, NewComment};
pub use page::{Page, PageMetadata, PageRequest};
pub use task::{
    NewTask, Task, TaskCreateEditRequest, TaskExecutorEditRequest, TaskFilter, TaskPredicate,
    TaskPriority, TaskStatus, TaskStatusEditRequest,
};
pub use user::{NewUser, User, UserResponse};

/// Rejects strings that are empty or whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
