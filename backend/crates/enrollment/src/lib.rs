//! Enrollment Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Course and enrollment entities, value objects, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL and in-memory implementations
//!
//! ## Lifecycle
//! `PENDING` → `APPROVED` | `REJECTED`, then progress tracking until
//! completed. Identities, roles and the authorization guard come from the
//! `auth` crate.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;


// Re-exports for convenience
pub use error::{EnrollmentError, EnrollmentResult};
pub use infra::{memory::MemoryEnrollmentRepository, postgres::PgEnrollmentRepository};

pub mod models {
    pub use crate::domain::entity::{course::*, enrollment::*};
    pub use crate::domain::value_object::{progress::*, status::*};
}
