#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use serde_json::{json, Value};

use taskgate::auth::AuthMiddleware;
use taskgate::config::SecurityConfig;
use taskgate::repository::MemoryRepository;
use taskgate::routes::{self, health};
use taskgate::services::AppState;

pub const PASSWORD: &str = "Password123!";

pub fn security() -> SecurityConfig {
    SecurityConfig {
        jwt_secret: "integration-test-secret-that-is-long-enough".to_string(),
        token_ttl_days: 1,
        bcrypt_cost: 4,
    }
}

/// The production route tree over an in-memory repository.
pub async fn spawn_app() -> (
    impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    AppState,
) {
    let state = AppState::new(Arc::new(MemoryRepository::new()), &security());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(state.codec.clone()))
                    .configure(routes::config),
            ),
    )
    .await;
    (app, state)
}

pub async fn register<S, B>(app: &S, email: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", email);
    test::read_body_json(resp).await
}

/// Registers `email`, logs in and returns `(user_id, token)`.
pub async fn login<S, B>(app: &S, email: &str) -> (i64, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    register(app, email).await;
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login of {} failed", email);
    let body: Value = test::read_body_json(resp).await;
    (
        body["user_id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
