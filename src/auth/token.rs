use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::config::SecurityConfig;
use crate::error::AppError;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id rendered as a decimal string.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// The user's email. A token without it is rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Reasons a bearer token can be refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The signature does not verify against the configured secret, or the token
    /// is not a well-formed JWT at all.
    InvalidSignature,
    /// The token's `exp` instant has passed.
    Expired,
    /// The signature is valid but the claims are unusable.
    MalformedClaims(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::MalformedClaims(msg) => write!(f, "malformed token claims: {}", msg),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::MissingRequiredClaim(claim) => {
                TokenError::MalformedClaims(format!("{} is missing", claim))
            }
            ErrorKind::Json(err) => TokenError::MalformedClaims(err.to_string()),
            _ => TokenError::InvalidSignature,
        }
    }
}

/// Issues and verifies identity tokens with a shared HS256 secret.
///
/// Built once at startup from the security configuration. The secret's minimum
/// length is checked when the configuration is loaded, so any secret handed in
/// here is assumed usable.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// `ttl_days` must fit a `chrono::Duration`; `Config` rejects values that don't.
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_days)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generates a token for `identity`, valid from now for the configured TTL.
    pub fn encode(&self, identity: &Identity) -> Result<String, AppError> {
        self.encode_at(identity, Utc::now())
    }

    /// Generates a token as if issued at `issued_at`.
    ///
    /// Given the same identity, instant and secret the output is identical.
    pub fn encode_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("token expiry out of range".into()))?;

        let claims = Claims {
            sub: identity.user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            username: Some(identity.email.clone()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token string and resolves the identity it carries.
    pub fn decode(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        let user_id = claims.sub.parse::<i64>().map_err(|_| {
            TokenError::MalformedClaims(format!("subject {:?} is not a user id", claims.sub))
        })?;
        let email = claims
            .username
            .ok_or_else(|| TokenError::MalformedClaims("username is missing".into()))?;

        Ok(Identity { user_id, email })
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_days", &self.ttl.num_days())
            .finish_non_exhaustive()
    }
}
