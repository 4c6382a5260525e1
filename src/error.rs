use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{auth::LoginError, models::MessageResponse, repository::RepositoryError};

pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const MSG_UNAUTHENTICATED: &str = "Not Authenticated: Please log in.";
pub const MSG_FORBIDDEN: &str = "Forbidden: Admin access required";

/// AppError
///
/// Every failure a handler can surface. Rendered as a `{message}` JSON body.
/// Internal causes are logged here and replaced by a generic message on the wire.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not authenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::InvalidCredentials => MSG_INVALID_CREDENTIALS.to_string(),
            AppError::Unauthenticated => MSG_UNAUTHENTICATED.to_string(),
            AppError::Forbidden => MSG_FORBIDDEN.to_string(),
            AppError::Validation(msg) | AppError::Conflict(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::Internal(_) => "Internal Server Error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(cause) = &self {
            tracing::error!(%cause, "request failed");
        }
        (self.status(), Json(MessageResponse::new(self.public_message()))).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<LoginError> for AppError {
    /// Both credential failures collapse into one response so callers cannot
    /// probe which emails are registered.
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::UnknownIdentity | LoginError::SecretMismatch => {
                AppError::InvalidCredentials
            }
            LoginError::Store(e) => AppError::from(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}
