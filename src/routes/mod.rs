pub mod auth;
pub mod comments;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{error, web, HttpRequest};

use crate::error::AppError;

fn bad_request(err: impl std::fmt::Display, _req: &HttpRequest) -> error::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Mounts every `/api` route. The caller wraps the scope in `AuthMiddleware`.
///
/// Protected handlers take `AuthenticatedUser` as their first argument:
/// extractors run in order, so a missing identity is reported before any
/// body, path or query error.
pub fn config(cfg: &mut web::ServiceConfig) {
    // Extractor failures answer with the same JSON body as `AppError`.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| bad_request(err, req)))
        .app_data(web::QueryConfig::default().error_handler(|err, req| bad_request(err, req)))
        .app_data(web::PathConfig::default().error_handler(|err, req| bad_request(err, req)))
        .service(web::scope("/auth").service(auth::login))
        .service(
            web::scope("/users")
                .service(users::register)
                .service(users::me),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::update_status)
                .service(tasks::update_executor)
                .service(tasks::delete_task)
                .service(comments::add_comment)
                .service(comments::list_comments),
        );
}
