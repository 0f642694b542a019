use crate::{
    auth::{AuthResponse, LoginRequest},
    error::AppError,
    services::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Exchanges credentials for a bearer token.
///
/// ## Responses:
/// - `200 OK`: `AuthResponse` with the token.
/// - `400 Bad Request`: malformed email or short password.
/// - `403 Forbidden`: the password does not match.
/// - `404 Not Found`: no user with that email.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let (identity, token) = state
        .auth
        .authenticate(&login_data.email, &login_data.password)
        .await?;

    log::info!("user {} logged in", identity.user_id);
    Ok(HttpResponse::Ok().json(AuthResponse {
        user_id: identity.user_id,
        email: identity.email,
        token,
    }))
}
