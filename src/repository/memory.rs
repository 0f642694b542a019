use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::{
    Comment, CommentFilter, NewComment, NewTask, NewUser, Page, PageRequest, Task, TaskFilter,
    User,
};
use crate::repository::{Repository, TaskCheck, TaskMutation};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    comments: BTreeMap<i64, Comment>,
    last_user_id: i64,
    last_task_id: i64,
    last_comment_id: i64,
}

/// `Repository` kept in process memory.
///
/// One lock guards all tables, so every trait method is atomic with respect to
/// every other. Behaves like the Postgres schema: unique emails, comments
/// removed with their task, ids assigned in insertion order.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T: Clone>(matching: Vec<&T>, page: PageRequest) -> Page<T> {
    let total = matching.len() as u64;
    let content = matching
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Page::new(content, page, total)
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }

    async fn save_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists(format!(
                "User with email: {} already exists",
                user.email
            )));
        }

        tables.last_user_id += 1;
        let saved = User {
            id: tables.last_user_id,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn find_task_by_id(&self, task_id: i64) -> Result<Option<Task>, AppError> {
        Ok(self.tables.lock().await.tasks.get(&task_id).cloned())
    }

    async fn save_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&task.author_id) {
            return Err(AppError::NotFound("Referenced record not found".into()));
        }

        tables.last_task_id += 1;
        let now = Utc::now();
        let saved = Task {
            id: tables.last_task_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            author_id: task.author_id,
            executor_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn update_task(&self, task_id: i64, mutation: TaskMutation) -> Result<Task, AppError> {
        let mut tables = self.tables.lock().await;
        let mut draft = tables
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or(AppError::TaskNotFound(task_id))?;

        mutation(&mut draft)?;

        if let Some(executor_id) = draft.executor_id {
            if !tables.users.contains_key(&executor_id) {
                return Err(AppError::NotFound("Referenced record not found".into()));
            }
        }

        let stored = tables
            .tasks
            .get_mut(&task_id)
            .ok_or(AppError::TaskNotFound(task_id))?;
        stored.title = draft.title;
        stored.description = draft.description;
        stored.status = draft.status;
        stored.priority = draft.priority;
        stored.executor_id = draft.executor_id;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_task(&self, task_id: i64, check: TaskCheck) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        let task = tables
            .tasks
            .get(&task_id)
            .ok_or(AppError::TaskNotFound(task_id))?;

        check(task)?;

        tables.tasks.remove(&task_id);
        tables.comments.retain(|_, c| c.task_id != task_id);
        Ok(())
    }

    async fn find_tasks(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError> {
        let tables = self.tables.lock().await;
        let matching = tables.tasks.values().filter(|t| filter.matches(t)).collect();
        Ok(paginate(matching, page))
    }

    async fn save_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.tasks.contains_key(&comment.task_id)
            || !tables.users.contains_key(&comment.author_id)
        {
            return Err(AppError::NotFound("Referenced record not found".into()));
        }

        tables.last_comment_id += 1;
        let saved = Comment {
            id: tables.last_comment_id,
            task_id: comment.task_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: Utc::now(),
        };
        tables.comments.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn find_comments(
        &self,
        task_id: i64,
        filter: &CommentFilter,
        page: PageRequest,
    ) -> Result<Page<Comment>, AppError> {
        let tables = self.tables.lock().await;
        let matching = tables
            .comments
            .values()
            .filter(|c| c.task_id == task_id && filter.matches(c))
            .collect();
        Ok(paginate(matching, page))
    }
}
