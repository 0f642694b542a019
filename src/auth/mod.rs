pub mod extractors;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub use extractors::{AuthFailure, AuthenticatedUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenCodec, TokenError};

/// Longest password bcrypt takes into account.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// The authenticated caller for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
}

/// `POST /api/auth/login` body.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email is incorrect"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// `POST /api/users` body.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Email is incorrect"))]
    pub email: String,
    /// bcrypt only reads the first 72 bytes, so longer passwords are refused.
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters"),
        custom(function = "validate_bcrypt_length", message = "Password must be at most 72 bytes")
    )]
    pub password: String,
}

/// Byte length, not character count: multi-byte characters use up bcrypt's input faster.
fn validate_bcrypt_length(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("too_long"));
    }
    Ok(())
}

/// Successful login: the identity and the bearer token issued for it.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: i64,
    pub email: String,
    pub token: String,
}
