//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identity not found
    #[error("Identity not found")]
    IdentityNotFound,

    /// Email already registered (case-insensitive)
    #[error("Email is already registered")]
    EmailTaken,

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account is disabled
    #[error("Account is disabled")]
    AccountDisabled,

    /// Malformed, forged, expired or wrong-kind session token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Operation requires an authenticated caller
    #[error("Authentication required")]
    Unauthenticated,

    /// Authenticated caller lacks the role or ownership
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Reset token does not exist
    #[error("Reset token not found")]
    ResetTokenNotFound,

    /// Reset token exists but is expired or consumed
    #[error("Reset token is expired or already used")]
    ResetTokenUnusable,

    /// Input validation error
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::IdentityNotFound | AuthError::ResetTokenNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::ResetTokenUnusable => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::AccountDisabled | AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Configuration(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Configuration(msg) => {
                tracing::error!(message = %msg, "Auth configuration error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Forbidden(reason) => {
                tracing::warn!(reason = %reason, "Forbidden operation attempted");
            }
            AuthError::ResetTokenUnusable => {
                tracing::warn!("Unusable reset token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }

    fn action(&self) -> Option<&'static str> {
        match self {
            AuthError::EmailTaken => Some("Sign in or use a different email address"),
            AuthError::InvalidCredentials => Some("Check your email and password"),
            AuthError::InvalidToken | AuthError::Unauthenticated => Some("Sign in again"),
            AuthError::ResetTokenUnusable | AuthError::ResetTokenNotFound => {
                Some("Request a new password reset")
            }
            _ => None,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.log();
        let action = err.action();
        let app_error = match err {
            AuthError::Database(e) => {
                AppError::internal("Storage operation failed").with_source(e)
            }
            other => AppError::new(other.kind(), other.to_string()),
        };
        match action {
            Some(action) => app_error.with_action(action),
            None => app_error,
        }
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(AuthError::IdentityNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(AuthError::EmailTaken.kind(), ErrorKind::Conflict);
        assert_eq!(AuthError::ResetTokenUnusable.kind(), ErrorKind::Conflict);
        assert_eq!(AuthError::InvalidToken.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::Unauthenticated.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            AuthError::Forbidden("x".into()).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            AuthError::Validation("x".into()).kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn test_into_app_error_hides_storage_detail() {
        let err: AppError = AuthError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.code(), "TECHNICAL_ERROR");
        assert!(!err.message().contains("pool"));
        assert_eq!(err.public_message(), "An internal error occurred");
    }

    #[test]
    fn test_into_app_error_keeps_business_message() {
        let err: AppError = AuthError::ResetTokenUnusable.into();
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(err.message(), "Reset token is expired or already used");
        assert_eq!(err.action(), Some("Request a new password reset"));
    }

    #[test]
    fn test_policy_error_becomes_validation() {
        let err: AuthError = PasswordPolicyError::CommonPattern.into();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
