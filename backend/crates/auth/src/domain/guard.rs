//! Authorization Guard
//!
//! Pure decision over an explicit caller. Rules:
//! - ADMIN always passes
//! - otherwise the caller must be authenticated
//! - and hold `required_role` if one is given
//! - and be `resource_owner` if one is given

use kernel::id::IdentityId;

use crate::domain::value_object::{identity_role::IdentityRole, public_id::PublicId};
use crate::error::{AuthError, AuthResult};

/// An authenticated, live identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub identity_id: IdentityId,
    pub public_id: PublicId,
    pub role: IdentityRole,
}

/// Who is performing an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Principal),
}

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(principal) => Some(principal),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.principal().is_some_and(|p| p.role.is_admin())
    }
}

impl From<Principal> for Caller {
    fn from(principal: Principal) -> Self {
        Caller::Authenticated(principal)
    }
}

pub fn can_act(
    caller: &Caller,
    resource_owner: Option<IdentityId>,
    required_role: Option<IdentityRole>,
) -> bool {
    let Some(principal) = caller.principal() else {
        return false;
    };
    if principal.role.is_admin() {
        return true;
    }
    required_role.is_none_or(|role| principal.role == role)
        && resource_owner.is_none_or(|owner| principal.identity_id == owner)
}

/// [`can_act`] as a `Result`
///
/// ## Errors
/// - `AuthError::Unauthenticated` for an anonymous caller
/// - `AuthError::Forbidden` for a role or ownership mismatch
pub fn authorize(
    caller: &Caller,
    resource_owner: Option<IdentityId>,
    required_role: Option<IdentityRole>,
) -> AuthResult<&Principal> {
    let principal = caller.principal().ok_or(AuthError::Unauthenticated)?;
    if can_act(caller, resource_owner, required_role) {
        return Ok(principal);
    }

    let reason = match required_role {
        Some(role) if principal.role != role => format!("requires role {role}"),
        _ => "not the owner of this resource".to_string(),
    };
    Err(AuthError::Forbidden(reason))
}
