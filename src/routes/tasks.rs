use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{
        PageRequest, TaskCreateEditRequest, TaskExecutorEditRequest, TaskFilter,
        TaskStatusEditRequest,
    },
    services::AppState,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Lists tasks across all users, one page at a time.
///
/// ## Query Parameters:
/// - `author_id`, `executor_id` (optional): filter by user id.
/// - `status` (optional): `PENDING`, `IN_PROGRESS` or `COMPLETED`.
/// - `priority` (optional): `LOW`, `MEDIUM` or `HIGH`.
/// - `page` (default 0), `size` (default 10, at most 100).
///
/// ## Responses:
/// - `200 OK`: a `Page<Task>` ordered by id.
/// - `400 Bad Request`: unknown enum value or page size out of range.
/// - `401 Unauthorized`: missing or rejected token.
#[get("")]
pub async fn get_tasks(
    _caller: AuthenticatedUser,
    state: web::Data<AppState>,
    filter: web::Query<TaskFilter>,
    page: web::Query<PageRequest>,
) -> Result<impl Responder, AppError> {
    page.validate()?;

    let tasks = state.tasks.list(&filter, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task authored by the caller.
///
/// Status starts as `PENDING`; priority defaults to `MEDIUM` when omitted.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: blank title, title over 200 or description over 1000 characters.
/// - `401 Unauthorized`: missing or rejected token.
#[post("")]
pub async fn create_task(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_data: web::Json<TaskCreateEditRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state
        .tasks
        .create(task_data.into_inner(), caller.user_id())
        .await?;
    Ok(HttpResponse::Created().json(task))
}

/// Any authenticated user may read any task.
#[get("/{id}")]
pub async fn get_task(
    _caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get_by_id(task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces title and description of a task the caller authored.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `403 Forbidden`: the caller is not the author.
/// - `404 Not Found`: no such task.
#[put("/{id}")]
pub async fn update_task(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskCreateEditRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state
        .tasks
        .edit_body(task_id.into_inner(), task_data.into_inner(), caller.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Moves a task to a new status. Allowed for the author and the executor.
#[patch("/{id}/status")]
pub async fn update_status(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    status_data: web::Json<TaskStatusEditRequest>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .edit_status(task_id.into_inner(), status_data.into_inner(), caller.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Assigns the task to another user. Author only.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `403 Forbidden`: the caller is not the author.
/// - `404 Not Found`: no such task, or no such executor.
#[patch("/{id}/executor")]
pub async fn update_executor(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    executor_data: web::Json<TaskExecutorEditRequest>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .edit_executor(
            task_id.into_inner(),
            executor_data.into_inner(),
            caller.user_id(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task and its comments. Author only.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `403 Forbidden`: the caller is not the author.
/// - `404 Not Found`: no such task.
#[delete("/{id}")]
pub async fn delete_task(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state
        .tasks
        .delete(task_id.into_inner(), caller.user_id())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
