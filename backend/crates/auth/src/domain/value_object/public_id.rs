//! Public identifier of an identity
//!
//! A 21-character nanoid. It is the subject of every session token, so the
//! internal UUID of an identity never leaves the service.

use std::fmt;
use std::str::FromStr;

use nid::Nanoid;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicId(Nanoid);

impl PublicId {
    pub fn new() -> Self {
        Self(Nanoid::new())
    }

    pub fn parse_str(s: &str) -> AuthResult<Self> {
        s.parse::<Nanoid>()
            .map(Self)
            .map_err(|e| AuthError::Validation(format!("Malformed public id: {e}")))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for PublicId {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        Self::parse_str(s)
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct_nanoids() {
        let a = PublicId::new();
        let b = PublicId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 21);
        assert_eq!(PublicId::parse_str(a.as_str()).unwrap(), a);
    }

    #[test]
    fn test_malformed_ids_rejected() {
        for bad in ["", "short", "0123456789abcdefghi01-extra", "bad id with spaces!!"] {
            assert!(matches!(
                bad.parse::<PublicId>(),
                Err(AuthError::Validation(_))
            ));
        }
    }
}
