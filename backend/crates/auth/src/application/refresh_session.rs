//! Refresh Session Use Case
//!
//! Exchanges a refresh token for a new token pair. Tokens are stateless, so
//! the presented refresh token stays valid until its own expiry.

use std::sync::Arc;

use crate::application::check_session::resolve_live;
use crate::application::sign_in::SessionTokens;
use crate::application::token_service::{TokenKind, TokenService};
use crate::domain::guard::Principal;
use crate::domain::repository::IdentityRepository;
use crate::error::AuthResult;

pub struct RefreshSessionUseCase<I>
where
    I: IdentityRepository,
{
    identity_repo: Arc<I>,
    tokens: TokenService,
}

impl<I> RefreshSessionUseCase<I>
where
    I: IdentityRepository,
{
    pub fn new(identity_repo: Arc<I>, tokens: TokenService) -> Self {
        Self {
            identity_repo,
            tokens,
        }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<SessionTokens> {
        let verified = self.tokens.validate(refresh_token, TokenKind::Refresh)?;
        let identity = resolve_live(&self.identity_repo, &verified.subject).await?;

        let access = self.tokens.issue_access(&identity)?;
        let refresh = self.tokens.issue_refresh(&identity)?;

        tracing::debug!(identity_id = %identity.id, "Session refreshed");

        Ok(SessionTokens {
            principal: Principal {
                identity_id: identity.id,
                public_id: identity.public_id,
                role: identity.role(),
            },
            access,
            refresh,
        })
    }
}
