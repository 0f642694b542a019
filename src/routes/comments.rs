use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CommentCreateRequest, CommentFilter, PageRequest},
    services::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Adds a comment to a task on behalf of the caller.
///
/// ## Responses:
/// - `201 Created`: the stored `Comment`.
/// - `400 Bad Request`: blank text or longer than 255 characters.
/// - `404 Not Found`: the task does not exist.
#[post("/{id}/comments")]
pub async fn add_comment(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    comment_data: web::Json<CommentCreateRequest>,
) -> Result<impl Responder, AppError> {
    comment_data.validate()?;

    let comment = state
        .comments
        .add(task_id.into_inner(), comment_data.into_inner(), caller.user_id())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Lists a task's comments, optionally narrowed to one author.
///
/// ## Query Parameters:
/// - `author_id` (optional)
/// - `page` (default 0), `size` (default 10, at most 100)
#[get("/{id}/comments")]
pub async fn list_comments(
    _caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    filter: web::Query<CommentFilter>,
    page: web::Query<PageRequest>,
) -> Result<impl Responder, AppError> {
    page.validate()?;

    let comments = state
        .comments
        .list(task_id.into_inner(), &filter, page.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}
