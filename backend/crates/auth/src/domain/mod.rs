//! Domain Layer
//!
//! Contains entities, value objects, the authorization guard and repository
//! traits.

pub mod entity;
pub mod guard;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{identity::Identity, reset_token::ResetToken};
pub use guard::{Caller, Principal, authorize, can_act};
pub use repository::{IdentityRepository, ResetTokenRepository};
