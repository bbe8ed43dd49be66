//! Credential Value Objects
//!
//! Domain wrappers over `platform::password`.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::credential::{RawPassword, StoredCredential};
//!
//! let raw = RawPassword::new("MySecurePass123!".to_string()).unwrap();
//! let stored = StoredCredential::from_raw(&raw, None).unwrap();
//! assert!(stored.verify(&raw, None));
//! ```

use platform::password::{ClearTextPassword, HashedPassword};
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Password as typed by the user
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Password that is about to be stored; the policy applies
    ///
    /// ## Errors
    /// `AuthError::Validation` describing the violated rule
    pub fn new(raw: String) -> AuthResult<Self> {
        Ok(Self(ClearTextPassword::new(raw)?))
    }

    /// Password presented at sign-in; only normalized
    pub fn for_verification(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    /// Require `confirmation` to equal this password
    pub fn confirm(&self, confirmation: String) -> AuthResult<()> {
        let confirmation = ClearTextPassword::for_verification(confirmation);
        if self.0.matches(&confirmation) {
            Ok(())
        } else {
            Err(AuthError::Validation(
                "Password confirmation does not match".into(),
            ))
        }
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

/// Hashed credential as persisted (Argon2id PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCredential(HashedPassword);

impl StoredCredential {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<Self> {
        Ok(Self(raw.0.hash(pepper)?))
    }

    /// Load from the database
    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AuthError::Internal("Invalid password hash in database".into()))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(&raw.0, pepper)
    }

    pub fn needs_rehash(&self) -> bool {
        self.0.needs_rehash()
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoredCredential").field(&"[HASH]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_violations_are_validation_errors() {
        for weak in ["", "short", "password123", "11111111"] {
            assert!(
                matches!(
                    RawPassword::new(weak.to_string()),
                    Err(AuthError::Validation(_))
                ),
                "{weak:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_confirm() {
        let raw = RawPassword::new("Orchard-Lantern-42".to_string()).unwrap();
        assert!(raw.confirm("Orchard-Lantern-42".to_string()).is_ok());
        assert!(matches!(
            raw.confirm("Orchard-Lantern-43".to_string()),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("Orchard-Lantern-42".to_string()).unwrap();
        let stored = StoredCredential::from_raw(&raw, Some(b"pepper")).unwrap();

        assert!(stored.verify(&raw, Some(b"pepper")));
        assert!(!stored.verify(&raw, None));
        assert!(!stored.verify(
            &RawPassword::for_verification("orchard-lantern-42".to_string()),
            Some(b"pepper")
        ));

        let restored = StoredCredential::from_phc_string(stored.as_phc_string()).unwrap();
        assert_eq!(restored, stored);
    }

    #[test]
    fn test_corrupt_hash_is_internal() {
        assert!(matches!(
            StoredCredential::from_phc_string("plaintext"),
            Err(AuthError::Internal(_))
        ));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::for_verification("Secret-Value-1".to_string());
        assert!(!format!("{raw:?}").contains("Secret"));
    }
}
