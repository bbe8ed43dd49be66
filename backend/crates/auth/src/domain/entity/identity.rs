//! Identity Entity
//!
//! One record per person regardless of role. Role-specific attributes live in
//! [`RoleProfile`]; the role itself never changes after registration.

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;

use crate::domain::value_object::{
    credential::StoredCredential, email::Email, identity_role::IdentityRole,
    public_id::PublicId, role_profile::RoleProfile,
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone)]
pub struct Identity {
    /// Internal UUID identifier
    pub id: IdentityId,
    /// Public-facing nanoid identifier, used as the token subject
    pub public_id: PublicId,
    /// Unique, case-insensitive
    pub email: Email,
    pub credential: StoredCredential,
    pub profile: RoleProfile,
    /// Disabled identities cannot sign in and fail token re-resolution
    pub active: bool,
    pub verified: bool,
    pub registered_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(
        email: Email,
        credential: StoredCredential,
        profile: RoleProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: IdentityId::new(),
            public_id: PublicId::new(),
            email,
            credential,
            profile,
            active: true,
            verified: false,
            registered_at: now,
            last_login_at: None,
            updated_at: now,
        }
    }

    #[inline]
    pub fn role(&self) -> IdentityRole {
        self.profile.role()
    }

    #[inline]
    pub fn can_sign_in(&self) -> bool {
        self.active
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn change_credential(&mut self, credential: StoredCredential, now: DateTime<Utc>) {
        self.credential = credential;
        self.updated_at = now;
    }

    /// Replace role-specific attributes
    ///
    /// ## Errors
    /// `AuthError::Validation` if the new profile belongs to another role
    pub fn update_profile(&mut self, profile: RoleProfile, now: DateTime<Utc>) -> AuthResult<()> {
        if profile.role() != self.role() {
            return Err(AuthError::Validation(format!(
                "Role is immutable (current {}, requested {})",
                self.role(),
                profile.role()
            )));
        }
        self.profile = profile;
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_verified(&mut self, now: DateTime<Utc>) {
        self.verified = true;
        self.updated_at = now;
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Syntactically valid PHC string; never verified against.
    const PHC: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$RdescudvJCsgt3ub+b+dWRWJTmaaJObG";

    fn identity(profile: RoleProfile) -> Identity {
        Identity::new(
            Email::new("grace@example.edu").unwrap(),
            StoredCredential::from_phc_string(PHC).unwrap(),
            profile,
            Utc::now(),
        )
    }

    #[test]
    fn test_new_identity_defaults() {
        let identity = identity(RoleProfile::student());
        assert_eq!(identity.role(), IdentityRole::Student);
        assert!(identity.active);
        assert!(!identity.verified);
        assert!(identity.last_login_at.is_none());
        assert_eq!(identity.registered_at, identity.updated_at);
    }

    #[test]
    fn test_update_profile_same_role() {
        let mut identity = identity(RoleProfile::teacher());
        let profile = RoleProfile::Teacher {
            grade: Some("Professor".into()),
            subjects: vec!["Physics".into()],
        };
        identity.update_profile(profile.clone(), Utc::now()).unwrap();
        assert_eq!(identity.profile, profile);
    }

    #[test]
    fn test_update_profile_cannot_change_role() {
        let mut identity = identity(RoleProfile::student());
        let result = identity.update_profile(RoleProfile::Admin, Utc::now());
        assert!(matches!(result, Err(AuthError::Validation(_))));
        assert_eq!(identity.role(), IdentityRole::Student);
    }

    #[test]
    fn test_deactivate_blocks_sign_in() {
        let mut identity = identity(RoleProfile::student());
        assert!(identity.can_sign_in());
        identity.deactivate(Utc::now());
        assert!(!identity.can_sign_in());
    }
}
