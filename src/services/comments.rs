use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Comment, CommentCreateRequest, CommentFilter, NewComment, Page, PageRequest};
use crate::repository::Repository;

#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn Repository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Any authenticated user may comment on any existing task.
    pub async fn add(
        &self,
        task_id: i64,
        request: CommentCreateRequest,
        author_id: i64,
    ) -> Result<Comment, AppError> {
        if self.repo.find_task_by_id(task_id).await?.is_none() {
            return Err(AppError::TaskNotFound(task_id));
        }
        if self.repo.find_user_by_id(author_id).await?.is_none() {
            return Err(AppError::user_not_found_by_id(author_id));
        }

        let comment = self
            .repo
            .save_comment(NewComment {
                task_id,
                author_id,
                text: request.text,
            })
            .await
            // The task can disappear between the check and the insert.
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::TaskNotFound(task_id),
                other => other,
            })?;

        log::info!("user {} commented on task {}", author_id, task_id);
        Ok(comment)
    }

    pub async fn list(
        &self,
        task_id: i64,
        filter: &CommentFilter,
        page: PageRequest,
    ) -> Result<Page<Comment>, AppError> {
        self.repo.find_comments(task_id, filter, page).await
    }
}
