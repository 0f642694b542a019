use crate::{
    auth::{AuthenticatedUser, RegisterRequest},
    error::AppError,
    models::UserResponse,
    services::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Registers a new account. Does not log the user in.
///
/// ## Responses:
/// - `201 Created`: the new `UserResponse`.
/// - `400 Bad Request`: invalid email or password length.
/// - `409 Conflict`: the email is already registered.
#[post("")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = state.users.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Returns the account behind the presented token.
#[get("/me")]
pub async fn me(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user = state.users.find_by_id(caller.user_id()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
