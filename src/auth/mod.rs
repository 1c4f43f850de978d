use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Signed-in user, e.g. an email address
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// The user a verified session belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub user: String,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self { user: claims.sub }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session secret not configured")]
    MissingSecret,

    #[error("No session token on request")]
    MissingToken,

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 session tokens
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    cookie_name: String,
    expiry_hours: u64,
}

impl SessionKeys {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            cookie_name: config.session_cookie.clone(),
            expiry_hours: config.session_expiry_hours,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn issue(&self, user: &str) -> Result<String, SessionError> {
        self.issue_with_lifetime(user, Duration::hours(self.expiry_hours as i64))
    }

    fn issue_with_lifetime(&self, user: &str, lifetime: Duration) -> Result<String, SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::MissingSecret);
        }

        let now = Utc::now();
        let claims = Claims {
            sub: user.to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        };

        let key = EncodingKey::from_secret(self.secret.as_bytes());
        Ok(encode(&Header::default(), &claims, &key)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::MissingSecret);
        }

        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let data = decode::<Claims>(token, &key, &Validation::default())?;
        Ok(data.claims)
    }

    /// Verify the session carried by a request. The session cookie is tried
    /// first; an `Authorization: Bearer` token is used when the cookie is
    /// absent or does not verify.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<SessionUser, SessionError> {
        let mut result = Err(SessionError::MissingToken);
        for token in [self.cookie_token(headers), bearer_token(headers)].into_iter().flatten() {
            result = self.verify(&token).map(SessionUser::from);
            if result.is_ok() {
                break;
            }
        }
        result
    }

    fn cookie_token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|t| !t.is_empty())
}
