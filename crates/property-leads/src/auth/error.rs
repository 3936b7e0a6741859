use axum::http::StatusCode;

use crate::repository::RepositoryError;

/// Authentication failures. Display strings are the messages shown to clients.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is not active")]
    AccountInactive,

    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::AccountInactive => StatusCode::FORBIDDEN,
            AuthError::Crypto(_) | AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller; internal failures stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Crypto(_) | AuthError::Repository(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
