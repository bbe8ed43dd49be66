//! Application Layer
//!
//! Enrollment use cases. Every operation receives the caller explicitly.

pub mod decide_enrollment;
pub mod list_enrollments;
mod notify;
pub mod request_enrollment;
pub mod track_progress;
pub mod withdraw_enrollment;

// Re-exports
pub use decide_enrollment::{DecideEnrollmentUseCase, DecisionInput};
pub use list_enrollments::ListEnrollmentsUseCase;
pub use request_enrollment::RequestEnrollmentUseCase;
pub use track_progress::TrackProgressUseCase;
pub use withdraw_enrollment::WithdrawEnrollmentUseCase;
