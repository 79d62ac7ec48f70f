use actix_web::http::header;
use actix_web::HttpRequest;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while resolving the caller identity
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token carries no subject")]
    MissingSubject,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies the opaque identity token issued upstream and extracts the
/// caller's user id. Every caller-scoped operation requires this to
/// succeed; there is no anonymous feed.
pub struct IdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Resolve the verified caller id from the request's bearer token.
    pub fn caller_uid(&self, req: &HttpRequest) -> Result<String, IdentityError> {
        let header_value = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(IdentityError::MissingToken)?;
        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(IdentityError::MissingToken)?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(IdentityError::MissingSubject);
        }
        Ok(data.claims.sub)
    }
}
