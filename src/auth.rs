use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{Account, Role},
    password::{PasswordError, dummy_hash, verify_password},
    repository::{Repository, RepositoryError},
};

/// Cookie carrying the session token for browser navigation.
pub const SESSION_COOKIE: &str = "session_token";

/// Claims
///
/// Payload of a session token. The role is copied from the account when the token
/// is minted and is never re-read from the store while the token is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account id.
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// IssuedToken
///
/// A freshly signed token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Why a token could not be minted.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// TokenKeys
///
/// Signing material and lifetime policy for session tokens, built once at startup.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenKeys {
    /// A `ttl_secs` beyond what a `Duration` can hold saturates; `issue` then fails
    /// instead of minting a token.
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::default();
        // Expired tokens must always be rejected.
        validation.validate_exp = true;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: i64::try_from(ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.auth_secret, config.session_ttl_secs)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a token for `account`, embedding its current role.
    pub fn issue(&self, account: &Account) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            role: account.role,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(IssuedToken { token, claims })
    }

    /// Verifies signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

/// LoginError
///
/// Why a credential check failed. The first two are collapsed into one generic
/// response at the HTTP boundary (see `AppError`).
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("no account with that email")]
    UnknownIdentity,
    #[error("password does not match")]
    SecretMismatch,
    #[error(transparent)]
    Store(#[from] RepositoryError),
    #[error(transparent)]
    Hashing(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// login
///
/// The session issuer: looks the account up by email, compares the password against
/// the stored hash and, on success, mints a token carrying `{sub, role}`.
/// Read-only with respect to the store.
pub async fn login(
    repo: &dyn Repository,
    keys: &TokenKeys,
    email: &str,
    password: &str,
) -> Result<IssuedToken, LoginError> {
    let Some(account) = repo.find_account_by_email(email).await? else {
        // Burn the same bcrypt work as a real check so response time does not reveal
        // whether the email is registered.
        verify_password(password, dummy_hash().await?).await?;
        return Err(LoginError::UnknownIdentity);
    };

    if !verify_password(password, &account.password_hash).await? {
        tracing::info!(account_id = %account.id, "login rejected: password mismatch");
        return Err(LoginError::SecretMismatch);
    }

    let issued = keys.issue(&account)?;
    tracing::info!(account_id = %account.id, role = %account.role, "session issued");
    Ok(issued)
}

// --- Token transport ---

/// Finds the caller's token: `Authorization: Bearer` first, then the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    match bearer {
        Some(token) => Some(token.to_string()),
        None => parse_cookie(headers, SESSION_COOKIE),
    }
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for a freshly issued token. `Secure` is dropped locally so
/// plain-http development servers keep the cookie.
pub fn session_cookie(token: &str, ttl: Duration, env: &Env) -> Option<HeaderValue> {
    let secure = if *env == Env::Production { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; Max-Age={}; HttpOnly; SameSite=Lax; Path=/{secure}",
        ttl.num_seconds()
    ))
    .ok()
}

pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("session_token=; Max-Age=0; HttpOnly; SameSite=Lax; Path=/")
}

// --- Session extractor ---

/// AuthSession
///
/// The caller's identity as stated by their token. Handlers receive it explicitly as
/// an argument; nothing reads identity from ambient state.
///
/// The claims are placed on the request by the route guard, which decodes the token of
/// every request. Extraction fails with 401 when the caller has no valid token.
/// The role is whatever the token says: authorization has already been decided by the
/// guard before a handler runs.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl From<&Claims> for AuthSession {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
            role: claims.role,
            expires_at: claims.expires_at(),
        }
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .map(AuthSession::from)
            .ok_or(AppError::Unauthenticated)
    }
}
