//! Sign Out Use Case
//!
//! Sessions are stateless, so signing out is the client discarding its
//! tokens. This records the event and rejects anonymous callers.

use crate::domain::guard::Caller;
use crate::error::{AuthError, AuthResult};

/// Sign out use case
#[derive(Debug, Clone, Copy, Default)]
pub struct SignOutUseCase;

impl SignOutUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, caller: &Caller) -> AuthResult<()> {
        let principal = caller.principal().ok_or(AuthError::Unauthenticated)?;
        tracing::info!(
            identity_id = %principal.identity_id,
            public_id = %principal.public_id,
            "Identity signed out"
        );
        Ok(())
    }
}
