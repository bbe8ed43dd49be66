//! Domain Layer
//!
//! Course and enrollment entities, their value objects and repository traits.
//! Authorization decisions come from `auth::domain::guard`.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{course::Course, enrollment::Enrollment};
pub use repository::{CourseRepository, EnrollmentRepository};
