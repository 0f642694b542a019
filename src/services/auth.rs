use std::sync::Arc;

use crate::auth::{verify_password, Identity, TokenCodec};
use crate::error::AppError;
use crate::repository::Repository;

/// Turns an email and password into an identity token.
#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn Repository>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn Repository>, codec: Arc<TokenCodec>) -> Self {
        Self { repo, codec }
    }

    /// Looks the user up by email, checks the password and mints a token.
    ///
    /// Read-only: nothing is written on success or failure.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Identity, String), AppError> {
        let user = self
            .repo
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::user_not_found_by_email(email))?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
                .await
                .map_err(|e| {
                    AppError::InternalServerError(format!("verification task failed: {}", e))
                })?;
        if !matches {
            log::debug!("password mismatch for user {}", user.id);
            return Err(AppError::InvalidPassword);
        }

        let identity = Identity {
            user_id: user.id,
            email: user.email,
        };
        let token = self.codec.encode(&identity)?;
        Ok((identity, token))
    }
}
