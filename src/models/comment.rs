use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::validate_not_blank;

/// A comment left on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub task_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub task_id: i64,
    pub author_id: i64,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CommentCreateRequest {
    #[validate(
        length(max = 255),
        custom(function = "validate_not_blank", message = "Comment may not be blank")
    )]
    pub text: String,
}

/// Query parameters for listing a task's comments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentFilter {
    pub author_id: Option<i64>,
}

impl CommentFilter {
    pub fn matches(&self, comment: &Comment) -> bool {
        self.author_id.map_or(true, |id| comment.author_id == id)
    }
}
