use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::{
    Comment, CommentFilter, NewComment, NewTask, NewUser, Page, PageRequest, Task, TaskFilter,
    TaskPredicate, User,
};
use crate::repository::{Repository, TaskCheck, TaskMutation};

const USER_COLUMNS: &str = "id, email, password_hash, created_at";
const TASK_COLUMNS: &str =
    "id, title, description, status, priority, author_id, executor_id, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, task_id, author_id, text, created_at";

/// `Repository` backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Appends `WHERE a = $1 AND b = $2 ...` for each supplied filter field.
fn push_task_predicates(builder: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    for (i, predicate) in filter.predicates().into_iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(predicate.column()).push(" = ");
        match predicate {
            TaskPredicate::AuthorId(id) | TaskPredicate::ExecutorId(id) => builder.push_bind(id),
            TaskPredicate::Status(status) => builder.push_bind(status),
            TaskPredicate::Priority(priority) => builder.push_bind(priority),
        };
    }
}

fn push_comment_predicates(
    builder: &mut QueryBuilder<'_, Postgres>,
    task_id: i64,
    filter: &CommentFilter,
) {
    builder.push(" WHERE task_id = ").push_bind(task_id);
    if let Some(author_id) = filter.author_id {
        builder.push(" AND author_id = ").push_bind(author_id);
    }
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    builder
        .push(" ORDER BY id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

#[async_trait]
impl Repository for PgRepository {
    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn save_user(&self, user: NewUser) -> Result<User, AppError> {
        let saved = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::AlreadyExists(_) => AppError::AlreadyExists(format!(
                "User with email: {} already exists",
                user.email
            )),
            other => other,
        })?;
        Ok(saved)
    }

    async fn find_task_by_id(&self, task_id: i64) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn save_task(&self, task: NewTask) -> Result<Task, AppError> {
        let saved = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, status, priority, author_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn update_task(&self, task_id: i64, mutation: TaskMutation) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock held until commit or rollback.
        let mut task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 FOR UPDATE",
            TASK_COLUMNS
        ))
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::TaskNotFound(task_id))?;

        // Dropping `tx` on error rolls back.
        mutation(&mut task)?;

        let updated = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = $1, description = $2, status = $3, priority = $4, executor_id = $5,
                 updated_at = NOW()
             WHERE id = $6
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.executor_id)
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::TaskNotFound(task_id))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_task(&self, task_id: i64, check: TaskCheck) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 FOR UPDATE",
            TASK_COLUMNS
        ))
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::TaskNotFound(task_id))?;

        check(&task)?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::TaskNotFound(task_id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_tasks(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        push_task_predicates(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM tasks", TASK_COLUMNS));
        push_task_predicates(&mut select, filter);
        push_page(&mut select, page);
        let tasks = select.build_query_as::<Task>().fetch_all(&self.pool).await?;

        Ok(Page::new(tasks, page, total.max(0) as u64))
    }

    async fn save_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let saved = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (task_id, author_id, text) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(comment.task_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn find_comments(
        &self,
        task_id: i64,
        filter: &CommentFilter,
        page: PageRequest,
    ) -> Result<Page<Comment>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM comments");
        push_comment_predicates(&mut count, task_id, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM comments", COMMENT_COLUMNS));
        push_comment_predicates(&mut select, task_id, filter);
        push_page(&mut select, page);
        let comments = select
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(comments, page, total.max(0) as u64))
    }
}
