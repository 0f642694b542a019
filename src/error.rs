//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure the core can produce (missing users or tasks, failed ownership checks,
//! rejected credentials, invalid tokens, duplicate registrations) is a variant here, so
//! services return them through `Result` and the HTTP boundary turns them into responses.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application errors
//! into HTTP responses with JSON bodies. It also provides `From` implementations for
//! `sqlx::Error`, `validator::ValidationErrors`, `bcrypt::BcryptError` and the token
//! codec's `TokenError`, allowing for easy conversion using the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// No usable identity on a request that requires one (HTTP 401).
    Unauthorized(String),
    /// A bearer token was presented but could not be decoded (HTTP 401).
    Token(TokenError),
    /// The caller is authenticated but does not own the resource (HTTP 403).
    Forbidden(String),
    /// The supplied password does not match the stored hash (HTTP 403).
    InvalidPassword,
    /// A referenced user does not exist (HTTP 404).
    UserNotFound(String),
    /// A referenced task does not exist (HTTP 404).
    TaskNotFound(i64),
    /// Any other missing record (HTTP 404).
    NotFound(String),
    /// A unique resource already exists, e.g. a registered email (HTTP 409).
    AlreadyExists(String),
    /// Represents a client-side error due to a malformed request (HTTP 400).
    BadRequest(String),
    /// Represents an error due to failed input validation (HTTP 400).
    /// Wraps errors from the `validator` crate.
    ValidationError(String),
    /// Represents an error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl AppError {
    /// Short machine-readable name of the failure, sent as the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Token(TokenError::Expired) => "expired",
            AppError::Token(TokenError::InvalidSignature) => "invalid_signature",
            AppError::Token(TokenError::MalformedClaims(_)) => "malformed_claims",
            AppError::Forbidden(_) => "forbidden",
            AppError::InvalidPassword => "invalid_password",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::TaskNotFound(_) => "task_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::BadRequest(_) => "bad_request",
            AppError::ValidationError(_) => "validation_error",
            AppError::DatabaseError(_) => "database_error",
            AppError::InternalServerError(_) => "internal_server_error",
        }
    }

    pub fn user_not_found_by_id(user_id: i64) -> Self {
        AppError::UserNotFound(format!("User with id: {} not found", user_id))
    }

    pub fn user_not_found_by_email(email: &str) -> Self {
        AppError::UserNotFound(format!("User with email: {} not found", email))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Token(err) => write!(f, "Unauthorized: {}", err),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::InvalidPassword => write!(f, "Forbidden: invalid password"),
            AppError::UserNotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::TaskNotFound(id) => write!(f, "Not Found: Task with id: {} not found", id),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::AlreadyExists(msg) => write!(f, "Conflict: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Every response carries `{"error": <kind>, "message": <description>}`.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::InvalidPassword => StatusCode::FORBIDDEN,
            AppError::UserNotFound(_) | AppError::TaskNotFound(_) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Database details stay in the logs, not in the response.
            AppError::DatabaseError(msg) => {
                log::error!("database error: {}", msg);
                "Database error".to_string()
            }
            AppError::InternalServerError(msg) => {
                log::error!("internal error: {}", msg);
                "Server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": message
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` and foreign-key violations become `AppError::NotFound`, unique-constraint
/// violations become `AppError::AlreadyExists`; everything else is an `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::AlreadyExists(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::NotFound("Referenced record not found".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        AppError::Token(error)
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
