//! Sign In Use Case
//!
//! Authenticates an identity by email and password and issues an access and
//! a refresh token.

use std::sync::Arc;

use kernel::clock::Clock;

use crate::application::config::AuthConfig;
use crate::application::token_service::{IssuedToken, TokenService};
use crate::domain::guard::Principal;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{credential::RawPassword, email::Email};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Token pair handed to a client
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub principal: Principal,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Sign in use case
pub struct SignInUseCase<I>
where
    I: IdentityRepository,
{
    identity_repo: Arc<I>,
    tokens: TokenService,
    clock: Arc<dyn Clock>,
    config: Arc<AuthConfig>,
}

impl<I> SignInUseCase<I>
where
    I: IdentityRepository,
{
    pub fn new(
        identity_repo: Arc<I>,
        tokens: TokenService,
        clock: Arc<dyn Clock>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            identity_repo,
            tokens,
            clock,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SessionTokens> {
        // Unknown and malformed emails look the same as a wrong password
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;
        let mut identity = self
            .identity_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // No policy check here: only stored passwords have to satisfy it
        let raw_password = RawPassword::for_verification(input.password);
        if !identity
            .credential
            .verify(&raw_password, self.config.pepper())
        {
            return Err(AuthError::InvalidCredentials);
        }

        // Checked after the password so account state is not probeable
        if !identity.can_sign_in() {
            return Err(AuthError::AccountDisabled);
        }

        // Targeted write so a reset committed meanwhile keeps its credential
        let now = self.clock.now();
        self.identity_repo.record_login(&identity.id, now).await?;
        identity.record_login(now);

        let access = self.tokens.issue_access(&identity)?;
        let refresh = self.tokens.issue_refresh(&identity)?;

        tracing::info!(
            identity_id = %identity.id,
            public_id = %identity.public_id,
            "Identity signed in"
        );

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
