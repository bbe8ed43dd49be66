//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;

use crate::domain::entity::{identity::Identity, reset_token::ResetToken};
use crate::domain::value_object::{
    credential::StoredCredential, email::Email, identity_role::IdentityRole,
    public_id::PublicId,
};
use crate::error::AuthResult;

/// Identity repository trait
#[trait_variant::make(IdentityRepository: Send)]
pub trait LocalIdentityRepository {
    /// Create a new identity
    ///
    /// Fails with `AuthError::EmailTaken` if the email is registered already,
    /// whatever the role.
    async fn create(&self, identity: &Identity) -> AuthResult<()>;

    /// Update identity
    ///
    /// The stored credential is left alone; only `ResetTokenRepository::redeem`
    /// replaces it.
    async fn update(&self, identity: &Identity) -> AuthResult<()>;

    /// Stamp a successful sign-in without touching any other column
    async fn record_login(&self, id: &IdentityId, at: DateTime<Utc>) -> AuthResult<()>;

    async fn find_by_id(&self, id: &IdentityId) -> AuthResult<Option<Identity>>;

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Identity>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn count_by_role(&self, role: IdentityRole) -> AuthResult<u64>;
}

/// Reset token repository trait
///
/// `issue` and `redeem` are each one atomic unit of work.
#[trait_variant::make(ResetTokenRepository: Send)]
pub trait LocalResetTokenRepository {
    /// Find a token by the SHA-256 digest of its value
    async fn find_by_value(&self, digest: &[u8; 32]) -> AuthResult<Option<ResetToken>>;

    /// Invalidate every outstanding token of the owner, then save `token`
    ///
    /// Returns the number of tokens invalidated.
    async fn issue(&self, token: &ResetToken) -> AuthResult<u64>;

    /// Consume `token`, store `credential` on its owner and invalidate the
    /// owner's other tokens
    ///
    /// Returns `false` without changing anything if the stored token is no
    /// longer usable at `now` (lost a race, or expired meanwhile).
    async fn redeem(
        &self,
        token: &ResetToken,
        credential: &StoredCredential,
        now: DateTime<Utc>,
    ) -> AuthResult<bool>;

    async fn invalidate_all_for_identity(&self, identity_id: &IdentityId) -> AuthResult<u64>;

    /// Delete tokens that expired before `cutoff`
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64>;
}
