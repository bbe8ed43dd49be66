//! In-memory Repository Implementations
//!
//! One lock guards identities and tokens together, which makes `issue` and
//! `redeem` atomic the same way a transaction does for PostgreSQL.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, ResetTokenId};
use tokio::sync::Mutex;

use crate::domain::entity::{identity::Identity, reset_token::ResetToken};
use crate::domain::repository::{IdentityRepository, ResetTokenRepository};
use crate::domain::value_object::{
    credential::StoredCredential, email::Email, identity_role::IdentityRole,
    public_id::PublicId,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    identities: HashMap<IdentityId, Identity>,
    reset_tokens: HashMap<ResetTokenId, ResetToken>,
}

/// In-memory auth repository
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityRepository for MemoryAuthRepository {
    async fn create(&self, identity: &Identity) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        if state.identities.values().any(|i| i.email == identity.email) {
            return Err(AuthError::EmailTaken);
        }
        if state
            .identities
            .values()
            .any(|i| i.id == identity.id || i.public_id == identity.public_id)
        {
            return Err(AuthError::Internal("Duplicate identity key".into()));
        }
        state.identities.insert(identity.id, identity.clone());
        Ok(())
    }

    async fn update(&self, identity: &Identity) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        if state
            .identities
            .values()
            .any(|i| i.id != identity.id && i.email == identity.email)
        {
            return Err(AuthError::EmailTaken);
        }
        match state.identities.get_mut(&identity.id) {
            Some(stored) => {
                let credential = stored.credential.clone();
                *stored = Identity {
                    credential,
                    ..identity.clone()
                };
                Ok(())
            }
            None => Err(AuthError::IdentityNotFound),
        }
    }

    async fn record_login(&self, id: &IdentityId, at: DateTime<Utc>) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        let identity = state
            .identities
            .get_mut(id)
            .ok_or(AuthError::IdentityNotFound)?;
        identity.record_login(at);
        Ok(())
    }

    async fn find_by_id(&self, id: &IdentityId) -> AuthResult<Option<Identity>> {
        Ok(self.state.lock().await.identities.get(id).cloned())
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Identity>> {
        let state = self.state.lock().await;
        Ok(state
            .identities
            .values()
            .find(|i| &i.public_id == public_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
        let state = self.state.lock().await;
        Ok(state
            .identities
            .values()
            .find(|i| &i.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let state = self.state.lock().await;
        Ok(state.identities.values().any(|i| &i.email == email))
    }

    async fn count_by_role(&self, role: IdentityRole) -> AuthResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .identities
            .values()
            .filter(|i| i.role() == role)
            .count() as u64)
    }
}

impl ResetTokenRepository for MemoryAuthRepository {
    async fn find_by_value(&self, digest: &[u8; 32]) -> AuthResult<Option<ResetToken>> {
        let state = self.state.lock().await;
        Ok(state
            .reset_tokens
            .values()
            .find(|t| &t.token_digest == digest)
            .cloned())
    }

    async fn issue(&self, token: &ResetToken) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        if !state.identities.contains_key(&token.identity_id) {
            return Err(AuthError::IdentityNotFound);
        }
        let invalidated = invalidate_outstanding(&mut state, &token.identity_id);
        state.reset_tokens.insert(token.id, token.clone());
        Ok(invalidated)
    }

    async fn redeem(
        &self,
        token: &ResetToken,
        credential: &StoredCredential,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut state = self.state.lock().await;

        let usable = state
            .reset_tokens
            .get(&token.id)
            .is_some_and(|stored| stored.is_usable(now));
        if !usable {
            return Ok(false);
        }

        let identity = state
            .identities
            .get_mut(&token.identity_id)
            .ok_or(AuthError::IdentityNotFound)?;
        identity.change_credential(credential.clone(), now);

        // Marks the redeemed token used along with the owner's others
        invalidate_outstanding(&mut state, &token.identity_id);
        Ok(true)
    }

    async fn invalidate_all_for_identity(&self, identity_id: &IdentityId) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        Ok(invalidate_outstanding(&mut state, identity_id))
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.reset_tokens.len();
        state.reset_tokens.retain(|_, t| t.expires_at >= cutoff);
        Ok((before - state.reset_tokens.len()) as u64)
    }
}

fn invalidate_outstanding(state: &mut State, identity_id: &IdentityId) -> u64 {
    let mut count = 0;
    for token in state
        .reset_tokens
        .values_mut()
        .filter(|t| &t.identity_id == identity_id && !t.used)
    {
        token.mark_used();
        count += 1;
    }
    count
}
