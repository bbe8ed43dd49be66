//! Opaque password-reset token value
//!
//! 256 random bits, base64url encoded. Only the SHA-256 digest is persisted.

use platform::crypto;
use std::fmt;

/// Number of random bytes in a reset token
pub const RESET_TOKEN_BYTES: usize = 32;

pub struct ResetTokenValue(String);

impl ResetTokenValue {
    pub fn generate() -> Self {
        Self(crypto::to_base64_url(&crypto::random_bytes(
            RESET_TOKEN_BYTES,
        )))
    }

    /// Value as presented by a user (not validated; unknown values simply miss)
    pub fn presented(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn digest(&self) -> [u8; 32] {
        crypto::sha256(self.0.as_bytes())
    }

    /// Value for delivery to the owner. Never log this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResetTokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResetTokenValue")
            .field(&"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_value_shape() {
        let value = ResetTokenValue::generate();
        // 32 bytes -> 43 base64url characters without padding
        assert_eq!(value.expose().len(), 43);
        assert_eq!(
            crypto::from_base64_url(value.expose()).unwrap().len(),
            RESET_TOKEN_BYTES
        );
    }

    #[test]
    fn test_digest_matches_presented_copy() {
        let value = ResetTokenValue::generate();
        let presented = ResetTokenValue::presented(format!(" {} ", value.expose()));
        assert_eq!(value.digest(), presented.digest());
        assert_ne!(value.digest(), ResetTokenValue::generate().digest());
    }

    #[test]
    fn test_debug_redaction() {
        let value = ResetTokenValue::generate();
        assert!(!format!("{value:?}").contains(value.expose()));
    }
}
