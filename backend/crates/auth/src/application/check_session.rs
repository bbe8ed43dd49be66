//! Check Session Use Case
//!
//! Turns a presented access token into an explicit [`Caller`]. A token is
//! only honored while its subject still resolves to an existing, active
//! identity.

use std::sync::Arc;

use crate::application::token_service::{TokenKind, TokenService};
use crate::domain::entity::identity::Identity;
use crate::domain::guard::{Caller, Principal};
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::public_id::PublicId;
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<I>
where
    I: IdentityRepository,
{
    identity_repo: Arc<I>,
    tokens: TokenService,
}

impl<I> CheckSessionUseCase<I>
where
    I: IdentityRepository,
{
    pub fn new(identity_repo: Arc<I>, tokens: TokenService) -> Self {
        Self {
            identity_repo,
            tokens,
        }
    }

    /// Validate an access token and re-resolve its subject
    pub async fn authenticate(&self, access_token: &str) -> AuthResult<Principal> {
        let verified = self.tokens.validate(access_token, TokenKind::Access)?;
        let identity = resolve_live(&self.identity_repo, &verified.subject).await?;

        Ok(Principal {
            identity_id: identity.id,
            public_id: identity.public_id,
            role: identity.role(),
        })
    }

    /// Like [`authenticate`](Self::authenticate), but fails closed
    ///
    /// Missing, invalid or stale tokens yield [`Caller::Anonymous`], which the
    /// guard rejects for every non-public operation.
    pub async fn resolve_caller(&self, access_token: Option<&str>) -> Caller {
        let Some(token) = access_token else {
            return Caller::Anonymous;
        };
        match self.authenticate(token).await {
            Ok(principal) => Caller::Authenticated(principal),
            Err(e) => {
                if e.kind().is_server_error() {
                    e.log();
                } else {
                    tracing::debug!(error = %e, "Treating caller as anonymous");
                }
                Caller::Anonymous
            }
        }
    }
}

/// Load the identity behind a token subject, requiring it to be active
pub(crate) async fn resolve_live<I>(identity_repo: &Arc<I>, subject: &PublicId) -> AuthResult<Identity>
where
    I: IdentityRepository,
{
    let identity = identity_repo
        .find_by_public_id(subject)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if !identity.can_sign_in() {
        tracing::debug!(identity_id = %identity.id, "Token subject is disabled");
        return Err(AuthError::InvalidToken);
    }
    Ok(identity)
}
