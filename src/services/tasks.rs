use std::sync::Arc;

use crate::auth::permissions;
use crate::error::AppError;
use crate::models::{
    NewTask, Page, PageRequest, Task, TaskCreateEditRequest, TaskExecutorEditRequest, TaskFilter,
    TaskStatusEditRequest,
};
use crate::repository::Repository;

/// Guards every task mutation with an ownership check.
///
/// Each mutating operation hands the repository one closure that checks the
/// caller against the freshly loaded task and applies the change, so the load,
/// the check and the write happen in the same transaction.
#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn Repository>,
}

fn forbidden_edit(task: &Task) -> AppError {
    AppError::Forbidden(format!(
        "To edit a task with id: {} you must be its creator",
        task.id
    ))
}

impl TaskService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Any authenticated user may create a task; they become its author.
    pub async fn create(
        &self,
        request: TaskCreateEditRequest,
        author_id: i64,
    ) -> Result<Task, AppError> {
        if self.repo.find_user_by_id(author_id).await?.is_none() {
            return Err(AppError::user_not_found_by_id(author_id));
        }

        let task = self.repo.save_task(NewTask::new(request, author_id)).await?;
        log::info!("user {} created task {}", author_id, task.id);
        Ok(task)
    }

    /// Replaces title and description. Priority changes only when supplied.
    pub async fn edit_body(
        &self,
        task_id: i64,
        request: TaskCreateEditRequest,
        caller_id: i64,
    ) -> Result<Task, AppError> {
        let task = self
            .repo
            .update_task(
                task_id,
                Box::new(move |task: &mut Task| {
                    if !permissions::can_edit_task_body(task, caller_id) {
                        log::debug!("user {} may not edit task {}", caller_id, task.id);
                        return Err(forbidden_edit(task));
                    }
                    task.title = request.title;
                    task.description = request.description;
                    if let Some(priority) = request.priority {
                        task.priority = priority;
                    }
                    Ok(())
                }),
            )
            .await?;

        log::info!("user {} edited task {}", caller_id, task.id);
        Ok(task)
    }

    /// Sets the status as given. Any status may follow any other.
    pub async fn edit_status(
        &self,
        task_id: i64,
        request: TaskStatusEditRequest,
        caller_id: i64,
    ) -> Result<Task, AppError> {
        let task = self
            .repo
            .update_task(
                task_id,
                Box::new(move |task: &mut Task| {
                    if !permissions::can_edit_status(task, caller_id) {
                        log::debug!("user {} may not move task {}", caller_id, task.id);
                        return Err(AppError::Forbidden(format!(
                            "To edit a task status with id: {} you must be its creator or executor",
                            task.id
                        )));
                    }
                    task.status = request.status;
                    Ok(())
                }),
            )
            .await?;

        log::info!(
            "user {} set task {} to {:?}",
            caller_id,
            task.id,
            task.status
        );
        Ok(task)
    }

    /// Assigns a new executor. A missing task wins over a denied caller, which
    /// wins over an unknown executor.
    pub async fn edit_executor(
        &self,
        task_id: i64,
        request: TaskExecutorEditRequest,
        caller_id: i64,
    ) -> Result<Task, AppError> {
        let executor_id = request.executor_id;
        let executor_exists = self.repo.find_user_by_id(executor_id).await?.is_some();

        let task = self
            .repo
            .update_task(
                task_id,
                Box::new(move |task: &mut Task| {
                    if !permissions::can_edit_executor(task, caller_id) {
                        log::debug!("user {} may not assign task {}", caller_id, task.id);
                        return Err(forbidden_edit(task));
                    }
                    if !executor_exists {
                        return Err(AppError::user_not_found_by_id(executor_id));
                    }
                    task.executor_id = Some(executor_id);
                    Ok(())
                }),
            )
            .await?;

        log::info!(
            "user {} assigned task {} to user {}",
            caller_id,
            task.id,
            executor_id
        );
        Ok(task)
    }

    pub async fn delete(&self, task_id: i64, caller_id: i64) -> Result<(), AppError> {
        self.repo
            .delete_task(
                task_id,
                Box::new(move |task: &Task| {
                    if !permissions::can_delete(task, caller_id) {
                        log::debug!("user {} may not delete task {}", caller_id, task.id);
                        return Err(AppError::Forbidden(format!(
                            "To delete a task with id: {} you must be its creator",
                            task.id
                        )));
                    }
                    Ok(())
                }),
            )
            .await?;

        log::info!("user {} deleted task {}", caller_id, task_id);
        Ok(())
    }

    /// Reading a task needs no ownership.
    pub async fn get_by_id(&self, task_id: i64) -> Result<Task, AppError> {
        self.repo
            .find_task_by_id(task_id)
            .await?
            .ok_or(AppError::TaskNotFound(task_id))
    }

    pub async fn list(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError> {
        self.repo.find_tasks(filter, page).await
    }
}
