use std::sync::Arc;

use crate::auth::{hash_password, RegisterRequest};
use crate::error::AppError;
use crate::models::{NewUser, User, UserResponse};
use crate::repository::Repository;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn Repository>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repo: Arc<dyn Repository>, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    /// Creates an account. A taken email is rejected before any hashing work.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AppError> {
        if self.repo.exists_by_email(&request.email).await? {
            return Err(AppError::AlreadyExists(format!(
                "User with email: {} already exists",
                request.email
            )));
        }

        let cost = self.bcrypt_cost;
        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {}", e)))??;

        let user = self
            .repo
            .save_user(NewUser {
                email: request.email,
                password_hash,
            })
            .await?;

        log::info!("registered user {}", user.id);
        Ok(user.into())
    }

    /// Backs `GET /api/users/me`; the account may be gone while its token is still valid.
    pub async fn find_by_id(&self, user_id: i64) -> Result<User, AppError> {
        self.repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found_by_id(user_id))
    }
}
