#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "Task tracking behind bearer-token authentication: users register and log in,"]
#![doc = "create tasks, hand them to executors, move them through statuses and comment"]
#![doc = "on them. Ownership rules live in `auth::permissions` and are enforced by the"]
#![doc = "services; storage sits behind the `repository::Repository` trait."]
#![doc = "The binary (`main.rs`) wires configuration, Postgres and the HTTP server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use crate::error::AppError;
pub use crate::services::AppState;
