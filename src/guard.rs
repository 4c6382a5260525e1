//! Route guard.
//!
//! Runs in front of the router for every request. It decodes the caller's token
//! (if any), matches the request path against the static privileged-prefix table,
//! and either lets the request through with the claims attached or terminates it.
//! This is the only place access to privileged paths is decided.

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::{Claims, extract_token},
    error::AppError,
    models::Role,
};

pub const SIGN_IN_PAGE: &str = "/sign-in";
pub const UNAUTHORIZED_PAGE: &str = "/unauthorized";

/// One protected prefix and the role it demands.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRule {
    pub prefix: String,
    pub required: Role,
}

impl PathRule {
    pub fn privileged(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            required: Role::Privileged,
        }
    }

    /// Case-sensitive prefix match.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    fn admits(&self, role: Role) -> bool {
        match self.required {
            Role::Standard => true,
            Role::Privileged => role == Role::Privileged,
        }
    }
}

/// Why a request was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Protected path, no valid token.
    Unauthenticated,
    /// Protected path, token role insufficient.
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Rejection),
}

/// GuardRules
///
/// The protected-path table. Built once from configuration and read-only afterwards,
/// so it is shared between requests without synchronization.
#[derive(Debug, Clone, Default)]
pub struct GuardRules {
    rules: Vec<PathRule>,
}

impl GuardRules {
    pub fn new(rules: Vec<PathRule>) -> Self {
        Self { rules }
    }

    /// Every prefix requires the privileged role.
    pub fn privileged<I, P>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::new(prefixes.into_iter().map(PathRule::privileged).collect())
    }

    /// evaluate
    ///
    /// Pure decision for one request. First matching rule wins; unmatched paths are
    /// always allowed whatever the token says.
    pub fn evaluate(&self, path: &str, claims: Option<&Claims>) -> Decision {
        let Some(rule) = self.rules.iter().find(|r| r.matches(path)) else {
            return Decision::Allow;
        };
        match claims {
            None => Decision::Deny(Rejection::Unauthenticated),
            Some(c) if !rule.admits(c.role) => Decision::Deny(Rejection::Forbidden),
            Some(_) => Decision::Allow,
        }
    }
}

/// API-shaped paths get JSON rejections; everything else is a page and gets redirected.
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Builds the terminal response for a rejected request.
pub fn reject(uri: &Uri, rejection: Rejection) -> Response {
    let path = uri.path();
    if is_api_path(path) {
        let error = match rejection {
            Rejection::Unauthenticated => AppError::Unauthenticated,
            Rejection::Forbidden => AppError::Forbidden,
        };
        return error.into_response();
    }
    match rejection {
        Rejection::Unauthenticated => {
            let back_to = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or(path);
            let target = format!("{SIGN_IN_PAGE}?callbackUrl={}", urlencoding::encode(back_to));
            Redirect::to(&target).into_response()
        }
        Rejection::Forbidden => Redirect::to(UNAUTHORIZED_PAGE).into_response(),
    }
}

/// route_guard
///
/// Axum middleware wrapping the whole router. An unreadable, forged or expired token
/// is treated exactly like no token. Valid claims are attached to the request so
/// handlers can take an `AuthSession` argument.
pub async fn route_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let claims = extract_token(request.headers()).and_then(|token| match state.keys.decode(&token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session token");
            None
        }
    });

    match state.guard.evaluate(request.uri().path(), claims.as_ref()) {
        Decision::Allow => {
            if let Some(claims) = claims {
                request.extensions_mut().insert(claims);
            }
            next.run(request).await
        }
        Decision::Deny(rejection) => {
            tracing::info!(
                path = %request.uri().path(),
                ?rejection,
                role = ?claims.as_ref().map(|c| c.role),
                "request rejected by route guard"
            );
            reject(request.uri(), rejection)
        }
    }
}
