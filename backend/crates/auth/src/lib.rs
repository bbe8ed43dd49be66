//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, authorization guard, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and in-memory implementations
//!
//! ## Features
//! - Registration with email + password, role-specific profile
//! - Stateless signed access / refresh tokens
//! - Single-use, expiring password reset tokens
//! - Guard over three fixed roles (Student, Teacher, Admin)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Tokens are HMAC-SHA256 signed and re-resolved against live identities
//! - Only SHA-256 digests of reset tokens are stored
//! - Every operation receives the caller explicitly

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::guard::{Caller, Principal};
pub use error::{AuthError, AuthResult};
pub use infra::{memory::MemoryAuthRepository, postgres::PgAuthRepository};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::{identity::*, reset_token::*};
    pub use crate::domain::value_object::{
        credential::*, email::*, identity_role::*, public_id::*, reset_token_value::*,
        role_profile::*,
    };
}
