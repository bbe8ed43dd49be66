//! Password Reset Use Case
//!
//! Request: issue a single-use token for the identity behind an email and
//! deliver it through the notifier.
//! Confirm: redeem the token for a new credential.
//!
//! Both token writes are atomic in the repository: issuing invalidates the
//! owner's outstanding tokens; redeeming marks the token used, stores the
//! credential and invalidates the owner's other tokens. Two concurrent
//! redemptions of one token cannot both succeed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kernel::clock::Clock;
use kernel::id::IdentityId;
use platform::notify::{Notification, NotificationEvent, Notifier, dispatch_detached};

use crate::application::config::AuthConfig;
use crate::domain::entity::{identity::Identity, reset_token::ResetToken};
use crate::domain::repository::{IdentityRepository, ResetTokenRepository};
use crate::domain::value_object::{
    credential::{RawPassword, StoredCredential},
    email::Email,
    reset_token_value::ResetTokenValue,
};
use crate::error::{AuthError, AuthResult};

/// A reset token as handed to its owner
#[derive(Debug)]
pub struct IssuedResetToken {
    pub value: ResetTokenValue,
    pub identity_id: IdentityId,
    pub expires_at: DateTime<Utc>,
}

pub struct ConfirmResetInput {
    pub token: String,
    pub new_password: String,
    pub password_confirmation: String,
}

pub struct ResetPasswordUseCase<I, R, N>
where
    I: IdentityRepository,
    R: ResetTokenRepository,
    N: Notifier + Send + Sync + 'static,
{
    identity_repo: Arc<I>,
    token_repo: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    config: Arc<AuthConfig>,
}

impl<I, R, N> ResetPasswordUseCase<I, R, N>
where
    I: IdentityRepository,
    R: ResetTokenRepository,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(
        identity_repo: Arc<I>,
        token_repo: Arc<R>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            identity_repo,
            token_repo,
            notifier,
            clock,
            config,
        }
    }

    /// Start a reset for the identity registered under `email`
    ///
    /// ## Errors
    /// - `AuthError::IdentityNotFound` if no identity has that email
    /// - `AuthError::AccountDisabled` if the identity is disabled
    pub async fn request(&self, email: &str) -> AuthResult<IssuedResetToken> {
        let email = Email::new(email)?;
        let identity = self
            .identity_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        if !identity.can_sign_in() {
            return Err(AuthError::AccountDisabled);
        }

        let issued = self.issue_for(&identity).await?;

        dispatch_detached(
            self.notifier.clone(),
            Notification::new(
                NotificationEvent::PasswordResetRequested,
                identity.id.into_uuid(),
                identity.email.as_str(),
                serde_json::json!({
                    "token": issued.value.expose(),
                    "expires_at": issued.expires_at,
                }),
            ),
        );

        Ok(issued)
    }

    /// Issue a fresh token for `identity`, invalidating its outstanding ones
    pub async fn issue_for(&self, identity: &Identity) -> AuthResult<IssuedResetToken> {
        let value = ResetTokenValue::generate();
        let ttl = Duration::milliseconds(self.config.reset_token_ttl_ms());
        let token = ResetToken::issue(identity.id, &value, self.clock.now(), ttl);

        let invalidated = self.token_repo.issue(&token).await?;

        tracing::info!(
            identity_id = %identity.id,
            token_id = %token.id,
            invalidated,
            expires_at = %token.expires_at,
            "Password reset token issued"
        );

        Ok(IssuedResetToken {
            value,
            identity_id: identity.id,
            expires_at: token.expires_at,
        })
    }

    /// Replace the owner's credential using a reset token
    ///
    /// Token state is checked before the new password, so an expired or used
    /// token reports a conflict whatever password accompanies it.
    ///
    /// ## Errors
    /// - `AuthError::ResetTokenNotFound` for an unknown value
    /// - `AuthError::ResetTokenUnusable` if expired or already used
    /// - `AuthError::Validation` for a confirmation mismatch or policy violation
    pub async fn confirm(&self, input: ConfirmResetInput) -> AuthResult<()> {
        let value = ResetTokenValue::presented(input.token);
        let token = self
            .token_repo
            .find_by_value(&value.digest())
            .await?
            .ok_or(AuthError::ResetTokenNotFound)?;

        let now = self.clock.now();
        if !token.is_usable(now) {
            return Err(AuthError::ResetTokenUnusable);
        }

        let raw_password = RawPassword::new(input.new_password)?;
        raw_password.confirm(input.password_confirmation)?;
        let credential = StoredCredential::from_raw(&raw_password, self.config.pepper())?;

        // Hashing takes a while; the repository re-checks usability atomically
        if !self.token_repo.redeem(&token, &credential, now).await? {
            tracing::warn!(token_id = %token.id, "Reset token consumed concurrently");
            return Err(AuthError::ResetTokenUnusable);
        }

        tracing::info!(
            identity_id = %token.identity_id,
            token_id = %token.id,
            "Password reset completed"
        );

        match self.identity_repo.find_by_id(&token.identity_id).await {
            Ok(Some(identity)) => dispatch_detached(
                self.notifier.clone(),
                Notification::new(
                    NotificationEvent::PasswordChanged,
                    identity.id.into_uuid(),
                    identity.email.as_str(),
                    serde_json::json!({ "changed_at": now }),
                ),
            ),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Skipping password change notification");
            }
        }

        Ok(())
    }

    /// Delete tokens whose expiry lies in the past
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let deleted = self
            .token_repo
            .delete_expired_before(self.clock.now())
            .await?;
        tracing::info!(deleted, "Purged expired reset tokens");
        Ok(deleted)
    }
}
