//! Reset Token Entity
//!
//! Single-use, expiring authorization to replace an identity's credential.
//! `used` only ever goes from false to true.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{IdentityId, ResetTokenId};

use crate::domain::value_object::reset_token_value::ResetTokenValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub id: ResetTokenId,
    pub identity_id: IdentityId,
    /// SHA-256 of the opaque value
    pub token_digest: [u8; 32],
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl ResetToken {
    pub fn issue(
        identity_id: IdentityId,
        value: &ResetTokenValue,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: ResetTokenId::new(),
            identity_id,
            token_digest: value.digest(),
            created_at: now,
            expires_at: now + ttl,
            used: false,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    #[inline]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired(now)
    }

    pub fn mark_used(&mut self) {
        self.used = true;
    }
}
