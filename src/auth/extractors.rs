use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::TokenError;
use crate::auth::Identity;
use crate::error::AppError;

/// Why `AuthMiddleware` could not resolve an identity from the presented token.
#[derive(Debug, Clone)]
pub struct AuthFailure(pub TokenError);

/// Extracts the authenticated caller from request extensions.
///
/// `AuthMiddleware` decodes the bearer token and stores either the `Identity`
/// or the `AuthFailure`. This extractor hands the identity to the handler, or
/// rejects with the recorded token failure, or with `AppError::Unauthorized`
/// when no token was presented at all.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    pub fn user_id(&self) -> i64 {
        self.0.user_id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        if let Some(identity) = extensions.get::<Identity>() {
            return ready(Ok(AuthenticatedUser(identity.clone())));
        }

        let err = match extensions.get::<AuthFailure>() {
            Some(AuthFailure(reason)) => AppError::Token(reason.clone()),
            None => AppError::Unauthorized("You need to log in or reauthorize".to_string()),
        };
        ready(Err(err.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(Identity {
            user_id: 123,
            email: "user@example.com".to_string(),
        });

        let mut payload = Payload::None;
        let extracted = AuthenticatedUser::from_request(&req, &mut payload).await;
        let user = extracted.unwrap();
        assert_eq!(user.user_id(), 123);
        assert_eq!(user.0.email, "user@example.com");
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_extractor_reports_recorded_token_failure() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut()
            .insert(AuthFailure(TokenError::InvalidSignature));

        let mut payload = Payload::None;
        let err = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        let app_err = err.as_error::<AppError>().unwrap();
        assert_eq!(app_err.kind(), "invalid_signature");
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
