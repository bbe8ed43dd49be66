//! Sign Up Use Case
//!
//! Registers a new identity. Students and teachers may self-register; an
//! ADMIN can only be created by another admin, or as the very first admin.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::id::IdentityId;
use platform::notify::{Notification, NotificationEvent, Notifier, dispatch_detached};

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::Identity;
use crate::domain::guard::Caller;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{
    credential::{RawPassword, StoredCredential},
    email::Email,
    identity_role::IdentityRole,
    public_id::PublicId,
    role_profile::RoleProfile,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub profile: RoleProfile,
}

/// Sign up output
#[derive(Debug, Clone)]
pub struct SignUpOutput {
    pub identity_id: IdentityId,
    pub public_id: PublicId,
    pub role: IdentityRole,
}

/// Sign up use case
pub struct SignUpUseCase<I, N>
where
    I: IdentityRepository,
    N: Notifier + Send + Sync + 'static,
{
    identity_repo: Arc<I>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    config: Arc<AuthConfig>,
}

impl<I, N> SignUpUseCase<I, N>
where
    I: IdentityRepository,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(
        identity_repo: Arc<I>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            identity_repo,
            notifier,
            clock,
            config,
        }
    }

    pub async fn execute(&self, caller: &Caller, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let email = Email::new(input.email)?;

        // Validate password before touching storage
        let raw_password = RawPassword::new(input.password)?;
        raw_password.confirm(input.password_confirmation)?;

        // Fast path; the store's unique index still decides under races
        if self.identity_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        if input.profile.role().is_admin() && !caller.is_admin() {
            let admins = self.identity_repo.count_by_role(IdentityRole::Admin).await?;
            if admins > 0 {
                return Err(AuthError::Forbidden(
                    "only an admin can register another admin".into(),
                ));
            }
            tracing::info!("Bootstrapping first admin identity");
        }

        let credential = StoredCredential::from_raw(&raw_password, self.config.pepper())?;
        let identity = Identity::new(email, credential, input.profile, self.clock.now());
        self.identity_repo.create(&identity).await?;

        tracing::info!(
            identity_id = %identity.id,
            public_id = %identity.public_id,
            role = %identity.role(),
            "Identity registered"
        );

        dispatch_detached(
            self.notifier.clone(),
            Notification::new(
                NotificationEvent::IdentityRegistered,
                identity.id.into_uuid(),
                identity.email.as_str(),
                serde_json::json!({ "role": identity.role() }),
            ),
        );

        Ok(SignUpOutput {
            identity_id: identity.id,
            public_id: identity.public_id,
            role: identity.role(),
        })
    }
}
