//! Application services. Each one is composed explicitly from the repository
//! and the auth primitives it needs, and takes the caller's id as a parameter.

pub mod auth;
pub mod comments;
pub mod tasks;
pub mod users;

use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::config::SecurityConfig;
use crate::repository::Repository;

pub use auth::AuthService;
pub use comments::CommentService;
pub use tasks::TaskService;
pub use users::UserService;

/// Everything the HTTP handlers need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub tasks: TaskService,
    pub comments: CommentService,
    pub codec: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>, security: &SecurityConfig) -> Self {
        let codec = Arc::new(TokenCodec::from_config(security));
        let users = UserService::new(Arc::clone(&repo), security.bcrypt_cost);
        Self {
            auth: AuthService::new(Arc::clone(&repo), Arc::clone(&codec)),
            tasks: TaskService::new(Arc::clone(&repo)),
            comments: CommentService::new(repo),
            users,
            codec,
        }
    }
}
