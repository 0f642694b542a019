use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthFailure;
use crate::auth::token::TokenCodec;

/// Resolves the caller's identity from an `Authorization: Bearer` header.
///
/// The middleware never rejects a request. A valid token puts an `Identity` in
/// the request extensions; an invalid one puts an `AuthFailure` there instead.
/// Handlers that need a caller take the `AuthenticatedUser` extractor, which
/// turns a missing identity into a 401. Handlers that don't are unaffected.
#[derive(Clone)]
pub struct AuthMiddleware {
    codec: Arc<TokenCodec>,
}

impl AuthMiddleware {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            codec: Arc::clone(&self.codec),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decoded = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| self.codec.decode(token.trim()));

        match decoded {
            Some(Ok(identity)) => {
                req.extensions_mut().insert(identity);
            }
            Some(Err(err)) => {
                log::debug!("rejected bearer token on {}: {}", req.path(), err);
                req.extensions_mut().insert(AuthFailure(err));
            }
            None => {}
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Identity};
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use chrono::{Duration, Utc};

    const SECRET: &str = "middleware-test-secret-0123456789";

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().json(user.0)
    }

    async fn public() -> HttpResponse {
        HttpResponse::Ok().body("public")
    }

    fn identity() -> Identity {
        Identity {
            user_id: 9,
            email: "nine@example.com".to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_valid_token_attaches_identity() {
        let codec = Arc::new(TokenCodec::new(SECRET, 1));
        let token = codec.encode(&identity()).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(codec))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let body: Identity = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, identity());
    }

    #[actix_rt::test]
    async fn test_missing_and_expired_tokens_are_unauthorized() {
        let codec = Arc::new(TokenCodec::new(SECRET, 1));
        let expired = codec
            .encode_at(&identity(), Utc::now() - Duration::days(3))
            .unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(codec))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", expired)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "expired");
    }

    #[actix_rt::test]
    async fn test_bad_token_does_not_block_public_route() {
        let codec = Arc::new(TokenCodec::new(SECRET, 1));
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(codec))
                .route("/public", web::get().to(public)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/public")
            .insert_header((header::AUTHORIZATION, "Bearer garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
