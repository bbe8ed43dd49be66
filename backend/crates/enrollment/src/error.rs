//! Enrollment Error Types
//!
//! Enrollment-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Guard and identity failures arrive
//! as [`AuthError`] and keep their kind.

use auth::AuthError;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Enrollment-specific result type alias
pub type EnrollmentResult<T> = Result<T, EnrollmentError>;

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("Course not found")]
    CourseNotFound,

    #[error("Enrollment not found")]
    EnrollmentNotFound,

    #[error("Student not found")]
    StudentNotFound,

    /// Target identity of an enrollment request is not a student
    #[error("Only students can enroll in courses")]
    NotAStudent,

    #[error("Course is not published")]
    CourseNotPublished,

    #[error("Student is already enrolled in this course")]
    AlreadyEnrolled,

    #[error("Only pending requests may be cancelled")]
    NotPending,

    #[error("Enrollment has not been approved")]
    NotApproved,

    /// Optimistic version check failed
    #[error("Enrollment was modified concurrently")]
    ConcurrentModification,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EnrollmentError {
    pub fn kind(&self) -> ErrorKind {
        use EnrollmentError::*;
        match self {
            CourseNotFound | EnrollmentNotFound | StudentNotFound => ErrorKind::NotFound,
            NotAStudent => ErrorKind::Forbidden,
            CourseNotPublished | AlreadyEnrolled | NotPending | NotApproved
            | ConcurrentModification => ErrorKind::Conflict,
            Validation(_) => ErrorKind::BadRequest,
            Auth(e) => e.kind(),
            Database(_) | Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            EnrollmentError::Auth(e) => e.log(),
            EnrollmentError::Database(e) => {
                tracing::error!(error = %e, "Enrollment database error");
            }
            EnrollmentError::Internal(msg) => {
                tracing::error!(message = %msg, "Enrollment internal error");
            }
            EnrollmentError::ConcurrentModification => {
                tracing::warn!("Concurrent enrollment update rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Enrollment error");
            }
        }
    }
}

impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::Auth(e) => e.into(),
            EnrollmentError::Database(e) => {
                tracing::error!(error = %e, "Enrollment database error");
                AppError::internal("Storage operation failed").with_source(e)
            }
            EnrollmentError::ConcurrentModification => {
                err.log();
                AppError::conflict(err.to_string()).with_action("Reload the enrollment and retry")
            }
            other => {
                other.log();
                AppError::new(other.kind(), other.to_string())
            }
        }
    }
}
