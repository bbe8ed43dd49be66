//! Flow tests for the auth crate
//!
//! Everything runs against the in-memory repository, a manual clock and a
//! recording notifier.

#[cfg(test)]
mod harness {
    use std::sync::Arc;

    use chrono::Duration;
    use kernel::clock::{Clock, ManualClock};
    use platform::notify::MemoryNotifier;

    use crate::application::*;
    use crate::domain::guard::Caller;
    use crate::domain::repository::IdentityRepository;
    use crate::domain::value_object::{email::Email, role_profile::RoleProfile};
    use crate::infra::memory::MemoryAuthRepository;

    pub const PASSWORD: &str = "Violet-Harbor-1987";

    pub struct Harness {
        pub repo: Arc<MemoryAuthRepository>,
        pub clock: Arc<ManualClock>,
        pub notifier: MemoryNotifier,
        pub config: Arc<AuthConfig>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                repo: Arc::new(MemoryAuthRepository::new()),
                clock: Arc::new(ManualClock::starting_now()),
                notifier: MemoryNotifier::new(),
                config: Arc::new(AuthConfig::with_random_secret()),
            }
        }

        pub fn clock(&self) -> Arc<dyn Clock> {
            self.clock.clone()
        }

        pub fn advance(&self, by: Duration) {
            self.clock.advance(by);
        }

        pub fn tokens(&self) -> TokenService {
            TokenService::new(self.config.clone(), self.clock())
        }

        pub fn sign_up(&self) -> SignUpUseCase<MemoryAuthRepository, MemoryNotifier> {
            SignUpUseCase::new(
                self.repo.clone(),
                Arc::new(self.notifier.clone()),
                self.clock(),
                self.config.clone(),
            )
        }

        pub fn sign_in(&self) -> SignInUseCase<MemoryAuthRepository> {
            SignInUseCase::new(
                self.repo.clone(),
                self.tokens(),
                self.clock(),
                self.config.clone(),
            )
        }

        pub fn check_session(&self) -> CheckSessionUseCase<MemoryAuthRepository> {
            CheckSessionUseCase::new(self.repo.clone(), self.tokens())
        }

        pub fn refresh(&self) -> RefreshSessionUseCase<MemoryAuthRepository> {
            RefreshSessionUseCase::new(self.repo.clone(), self.tokens())
        }

        pub fn reset(
            &self,
        ) -> ResetPasswordUseCase<MemoryAuthRepository, MemoryAuthRepository, MemoryNotifier>
        {
            ResetPasswordUseCase::new(
                self.repo.clone(),
                self.repo.clone(),
                Arc::new(self.notifier.clone()),
                self.clock(),
                self.config.clone(),
            )
        }

        pub async fn register(&self, email: &str, profile: RoleProfile) -> SignUpOutput {
            self.sign_up()
                .execute(
                    &Caller::Anonymous,
                    SignUpInput {
                        email: email.to_string(),
                        password: PASSWORD.to_string(),
                        password_confirmation: PASSWORD.to_string(),
                        profile,
                    },
                )
                .await
                .unwrap()
        }

        pub async fn deactivate(&self, email: &str) {
            let mut identity = self
                .repo
                .find_by_email(&Email::new(email).unwrap())
                .await
                .unwrap()
                .unwrap();
            identity.deactivate(self.clock.now());
            self.repo.update(&identity).await.unwrap();
        }
    }
}

#[cfg(test)]
mod sign_up_tests {
    use std::time::Duration;

    use platform::notify::NotificationEvent;

    use super::harness::*;
    use crate::application::SignUpInput;
    use crate::domain::guard::{Caller, Principal};
    use crate::domain::repository::IdentityRepository;
    use crate::domain::value_object::{identity_role::IdentityRole, role_profile::RoleProfile};
    use crate::error::AuthError;

    fn input(email: &str, profile: RoleProfile) -> SignUpInput {
        SignUpInput {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            password_confirmation: PASSWORD.to_string(),
            profile,
        }
    }

    #[tokio::test]
    async fn test_register_student_notifies() {
        let h = Harness::new();
        let out = h.register("alice@example.edu", RoleProfile::student()).await;
        assert_eq!(out.role, IdentityRole::Student);
        assert_eq!(h.repo.count_by_role(IdentityRole::Student).await.unwrap(), 1);

        let sent = h.notifier.wait_for(1, Duration::from_secs(1)).await;
        assert_eq!(sent[0].event, NotificationEvent::IdentityRegistered);
        assert_eq!(sent[0].recipient_id, out.identity_id.into_uuid());
    }

    #[tokio::test]
    async fn test_email_unique_across_roles_and_case() {
        let h = Harness::new();
        h.register("bob@example.edu", RoleProfile::student()).await;

        let result = h
            .sign_up()
            .execute(&Caller::Anonymous, input("BOB@Example.edu", RoleProfile::teacher()))
            .await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
        assert_eq!(h.repo.count_by_role(IdentityRole::Teacher).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_confirmation_mismatch() {
        let h = Harness::new();
        let mut input = input("carol@example.edu", RoleProfile::student());
        input.password_confirmation = "Violet-Harbor-1988".to_string();

        let result = h.sign_up().execute(&Caller::Anonymous, input).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let h = Harness::new();
        let mut input = input("dave@example.edu", RoleProfile::student());
        input.password = "password123".to_string();
        input.password_confirmation = "password123".to_string();

        let result = h.sign_up().execute(&Caller::Anonymous, input).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_admin_bootstrap_then_admin_only() {
        let h = Harness::new();
        let first = h.register("root@example.edu", RoleProfile::Admin).await;
        assert_eq!(first.role, IdentityRole::Admin);

        // A second anonymous admin registration is refused
        let result = h
            .sign_up()
            .execute(&Caller::Anonymous, input("eve@example.edu", RoleProfile::Admin))
            .await;
        assert!(matches!(result, Err(AuthError::Forbidden(_))));

        // An existing admin may create another
        let admin = Caller::Authenticated(Principal {
            identity_id: first.identity_id,
            public_id: first.public_id,
            role: IdentityRole::Admin,
        });
        let second = h
            .sign_up()
            .execute(&admin, input("ops@example.edu", RoleProfile::Admin))
            .await
            .unwrap();
        assert_eq!(second.role, IdentityRole::Admin);
        assert_eq!(h.repo.count_by_role(IdentityRole::Admin).await.unwrap(), 2);
    }
}

#[cfg(test)]
mod session_tests {
    use chrono::Duration;
    use kernel::clock::Clock;

    use super::harness::*;
    use crate::application::{SignInInput, SignOutUseCase, TokenKind};
    use crate::domain::guard::Caller;
    use crate::domain::repository::IdentityRepository;
    use crate::domain::value_object::{
        email::Email, identity_role::IdentityRole, role_profile::RoleProfile,
    };
    use crate::error::AuthError;

    fn credentials(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_and_authenticate() {
        let h = Harness::new();
        let registered = h.register("tess@example.edu", RoleProfile::teacher()).await;

        let session = h
            .sign_in()
            .execute(credentials("Tess@Example.edu", PASSWORD))
            .await
            .unwrap();
        assert_eq!(session.principal.identity_id, registered.identity_id);
        assert_eq!(session.principal.role, IdentityRole::Teacher);

        let stored = h
            .repo
            .find_by_id(&registered.identity_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.last_login_at, Some(h.clock.now()));

        let principal = h
            .check_session()
            .authenticate(&session.access.token)
            .await
            .unwrap();
        assert_eq!(principal, session.principal);
    }

    #[tokio::test]
    async fn test_bad_credentials_look_alike() {
        let h = Harness::new();
        h.register("ivan@example.edu", RoleProfile::student()).await;

        for (email, password) in [
            ("ivan@example.edu", "Violet-Harbor-1986"),
            ("nobody@example.edu", PASSWORD),
            ("not an email", PASSWORD),
        ] {
            let result = h.sign_in().execute(credentials(email, password)).await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn test_disabled_identity_cannot_sign_in() {
        let h = Harness::new();
        h.register("judy@example.edu", RoleProfile::student()).await;
        h.deactivate("judy@example.edu").await;

        let result = h
            .sign_in()
            .execute(credentials("judy@example.edu", PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::AccountDisabled)));
    }

    #[tokio::test]
    async fn test_expired_token_makes_caller_anonymous() {
        let h = Harness::new();
        h.register("kim@example.edu", RoleProfile::student()).await;
        let session = h
            .sign_in()
            .execute(credentials("kim@example.edu", PASSWORD))
            .await
            .unwrap();

        let check = h.check_session();
        assert!(matches!(
            check.resolve_caller(Some(session.access.token.as_str())).await,
            Caller::Authenticated(_)
        ));

        h.advance(Duration::minutes(15));
        assert_eq!(
            check.resolve_caller(Some(session.access.token.as_str())).await,
            Caller::Anonymous
        );
        assert_eq!(check.resolve_caller(None).await, Caller::Anonymous);
        assert_eq!(
            check.resolve_caller(Some("garbage")).await,
            Caller::Anonymous
        );
    }

    #[tokio::test]
    async fn test_token_of_disabled_identity_rejected() {
        let h = Harness::new();
        h.register("leo@example.edu", RoleProfile::student()).await;
        let session = h
            .sign_in()
            .execute(credentials("leo@example.edu", PASSWORD))
            .await
            .unwrap();
        h.deactivate("leo@example.edu").await;

        let result = h.check_session().authenticate(&session.access.token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
        let result = h.refresh().execute(&session.refresh.token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_refresh_issues_new_pair() {
        let h = Harness::new();
        h.register("mia@example.edu", RoleProfile::student()).await;
        let session = h
            .sign_in()
            .execute(credentials("mia@example.edu", PASSWORD))
            .await
            .unwrap();

        // Refresh tokens are not access tokens
        assert!(
            h.check_session()
                .authenticate(&session.refresh.token)
                .await
                .is_err()
        );

        h.advance(Duration::hours(1));
        let refreshed = h.refresh().execute(&session.refresh.token).await.unwrap();
        assert_eq!(refreshed.principal, session.principal);
        assert!(refreshed.access.expires_at_ms > session.access.expires_at_ms);
        assert_eq!(
            h.tokens()
                .validate(&refreshed.access.token, TokenKind::Access)
                .unwrap()
                .subject,
            session.principal.public_id
        );
    }

    #[tokio::test]
    async fn test_sign_out_requires_caller() {
        let h = Harness::new();
        h.register("ned@example.edu", RoleProfile::student()).await;
        let session = h
            .sign_in()
            .execute(credentials("ned@example.edu", PASSWORD))
            .await
            .unwrap();

        let sign_out = SignOutUseCase::new();
        assert!(matches!(
            sign_out.execute(&Caller::Anonymous),
            Err(AuthError::Unauthenticated)
        ));
        assert!(sign_out.execute(&Caller::from(session.principal)).is_ok());

        // Identity record is untouched by sign-out
        assert!(
            h.repo
                .exists_by_email(&Email::new("ned@example.edu").unwrap())
                .await
                .unwrap()
        );
    }
}

#[cfg(test)]
mod reset_tests {
    use std::time::Duration as StdDuration;

    use chrono::Duration;
    use kernel::clock::Clock;
    use platform::notify::NotificationEvent;

    use super::harness::*;
    use crate::application::{ConfirmResetInput, SignInInput};
    use crate::domain::repository::ResetTokenRepository;
    use crate::domain::value_object::role_profile::RoleProfile;
    use crate::error::AuthError;

    const NEW_PASSWORD: &str = "Copper-Meadow-2031";

    fn confirm(token: &str, password: &str) -> ConfirmResetInput {
        ConfirmResetInput {
            token: token.to_string(),
            new_password: password.to_string(),
            password_confirmation: password.to_string(),
        }
    }

    async fn can_sign_in(h: &Harness, email: &str, password: &str) -> bool {
        h.sign_in()
            .execute(SignInInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .is_ok()
    }

    #[tokio::test]
    async fn test_request_and_confirm() {
        let h = Harness::new();
        h.register("olga@example.edu", RoleProfile::student()).await;

        let issued = h.reset().request("olga@example.edu").await.unwrap();
        assert_eq!(issued.expires_at, h.clock.now() + Duration::hours(1));

        h.reset()
            .confirm(confirm(issued.value.expose(), NEW_PASSWORD))
            .await
            .unwrap();

        assert!(!can_sign_in(&h, "olga@example.edu", PASSWORD).await);
        assert!(can_sign_in(&h, "olga@example.edu", NEW_PASSWORD).await);

        let sent = h.notifier.wait_for(3, StdDuration::from_secs(1)).await;
        let reset_mail = sent
            .iter()
            .find(|n| n.event == NotificationEvent::PasswordResetRequested)
            .unwrap();
        assert_eq!(reset_mail.payload["token"], issued.value.expose());
        assert!(
            sent.iter()
                .any(|n| n.event == NotificationEvent::PasswordChanged)
        );
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        let h = Harness::new();
        h.register("pam@example.edu", RoleProfile::student()).await;
        let issued = h.reset().request("pam@example.edu").await.unwrap();

        h.reset()
            .confirm(confirm(issued.value.expose(), NEW_PASSWORD))
            .await
            .unwrap();
        let again = h
            .reset()
            .confirm(confirm(issued.value.expose(), "Another-Secret-77"))
            .await;
        assert!(matches!(again, Err(AuthError::ResetTokenUnusable)));
        assert!(can_sign_in(&h, "pam@example.edu", NEW_PASSWORD).await);
    }

    #[tokio::test]
    async fn test_expired_token_conflicts_before_password_validation() {
        // Token issued at T, used at T+2h with a password that would also
        // fail the policy: the expiry wins.
        let h = Harness::new();
        h.register("quinn@example.edu", RoleProfile::student()).await;
        let issued = h.reset().request("quinn@example.edu").await.unwrap();

        h.advance(Duration::hours(2));
        let result = h.reset().confirm(confirm(issued.value.expose(), "newpw")).await;
        assert!(matches!(result, Err(AuthError::ResetTokenUnusable)));
        assert!(can_sign_in(&h, "quinn@example.edu", PASSWORD).await);
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous() {
        let h = Harness::new();
        h.register("rita@example.edu", RoleProfile::student()).await;
        let first = h.reset().request("rita@example.edu").await.unwrap();
        let second = h.reset().request("rita@example.edu").await.unwrap();

        let result = h
            .reset()
            .confirm(confirm(first.value.expose(), NEW_PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::ResetTokenUnusable)));

        h.reset()
            .confirm(confirm(second.value.expose(), NEW_PASSWORD))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_consumption_has_one_winner() {
        let h = Harness::new();
        h.register("sam@example.edu", RoleProfile::student()).await;
        let issued = h.reset().request("sam@example.edu").await.unwrap();

        let reset_a = h.reset();
        let reset_b = h.reset();
        let (a, b) = tokio::join!(
            reset_a.confirm(confirm(issued.value.expose(), NEW_PASSWORD)),
            reset_b.confirm(confirm(issued.value.expose(), "Another-Secret-77")),
        );

        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .any(|r| matches!(r, Err(AuthError::ResetTokenUnusable)))
        );
    }

    #[tokio::test]
    async fn test_mismatched_confirmation_keeps_token_usable() {
        let h = Harness::new();
        h.register("tina@example.edu", RoleProfile::student()).await;
        let issued = h.reset().request("tina@example.edu").await.unwrap();

        let mut input = confirm(issued.value.expose(), NEW_PASSWORD);
        input.password_confirmation = "Copper-Meadow-2032".to_string();
        let result = h.reset().confirm(input).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));

        h.reset()
            .confirm(confirm(issued.value.expose(), NEW_PASSWORD))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_email_and_token() {
        let h = Harness::new();
        let result = h.reset().request("ghost@example.edu").await;
        assert!(matches!(result, Err(AuthError::IdentityNotFound)));

        let result = h
            .reset()
            .confirm(confirm("definitely-not-issued", NEW_PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::ResetTokenNotFound)));
    }

    #[tokio::test]
    async fn test_disabled_identity_cannot_request() {
        let h = Harness::new();
        h.register("uma@example.edu", RoleProfile::student()).await;
        h.deactivate("uma@example.edu").await;

        let result = h.reset().request("uma@example.edu").await;
        assert!(matches!(result, Err(AuthError::AccountDisabled)));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let h = Harness::new();
        let out = h.register("vera@example.edu", RoleProfile::student()).await;
        let issued = h.reset().request("vera@example.edu").await.unwrap();

        assert_eq!(h.reset().purge_expired().await.unwrap(), 0);
        h.advance(Duration::hours(1) + Duration::seconds(1));
        assert_eq!(h.reset().purge_expired().await.unwrap(), 1);

        assert!(
            h.repo
                .find_by_value(&issued.value.digest())
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            h.repo
                .invalidate_all_for_identity(&out.identity_id)
                .await
                .unwrap(),
            0
        );
    }
}

#[cfg(test)]
mod credential_write_tests {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use kernel::clock::Clock;
    use kernel::id::IdentityId;
    use tokio::sync::Mutex;

    use super::harness::*;
    use crate::application::{SignInInput, SignInUseCase};
    use crate::domain::entity::{identity::Identity, reset_token::ResetToken};
    use crate::domain::repository::{IdentityRepository, ResetTokenRepository};
    use crate::domain::value_object::{
        credential::{RawPassword, StoredCredential},
        email::Email,
        identity_role::IdentityRole,
        public_id::PublicId,
        role_profile::RoleProfile,
    };
    use crate::error::AuthResult;
    use crate::infra::memory::MemoryAuthRepository;

    const NEW_PASSWORD: &str = "Copper-Meadow-2031";

    /// Redeems a reset right after sign-in has loaded the identity
    struct ResetDuringSignIn {
        inner: Arc<MemoryAuthRepository>,
        pending: Mutex<Option<(ResetToken, StoredCredential, DateTime<Utc>)>>,
    }

    impl IdentityRepository for ResetDuringSignIn {
        async fn create(&self, identity: &Identity) -> AuthResult<()> {
            self.inner.create(identity).await
        }

        async fn update(&self, identity: &Identity) -> AuthResult<()> {
            self.inner.update(identity).await
        }

        async fn record_login(&self, id: &IdentityId, at: DateTime<Utc>) -> AuthResult<()> {
            self.inner.record_login(id, at).await
        }

        async fn find_by_id(&self, id: &IdentityId) -> AuthResult<Option<Identity>> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Identity>> {
            self.inner.find_by_public_id(public_id).await
        }

        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
            let found = self.inner.find_by_email(email).await?;
            if let Some((token, credential, now)) = self.pending.lock().await.take() {
                assert!(self.inner.redeem(&token, &credential, now).await?);
            }
            Ok(found)
        }

        async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
            self.inner.exists_by_email(email).await
        }

        async fn count_by_role(&self, role: IdentityRole) -> AuthResult<u64> {
            self.inner.count_by_role(role).await
        }
    }

    async fn signs_in(h: &Harness, email: &str, password: &str) -> bool {
        h.sign_in()
            .execute(SignInInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .is_ok()
    }

    #[tokio::test]
    async fn test_sign_in_keeps_reset_committed_meanwhile() {
        let h = Harness::new();
        h.register("ines@example.edu", RoleProfile::student()).await;
        let issued = h.reset().request("ines@example.edu").await.unwrap();
        let token = h
            .repo
            .find_by_value(&issued.value.digest())
            .await
            .unwrap()
            .unwrap();
        let raw = RawPassword::new(NEW_PASSWORD.to_string()).unwrap();
        let credential = StoredCredential::from_raw(&raw, h.config.pepper()).unwrap();

        let racing = Arc::new(ResetDuringSignIn {
            inner: h.repo.clone(),
            pending: Mutex::new(Some((token, credential, h.clock.now()))),
        });
        let sign_in = SignInUseCase::new(racing, h.tokens(), h.clock(), h.config.clone());
        sign_in
            .execute(SignInInput {
                email: "ines@example.edu".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        let stored = h
            .repo
            .find_by_email(&Email::new("ines@example.edu").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.last_login_at, Some(h.clock.now()));
        assert!(!signs_in(&h, "ines@example.edu", PASSWORD).await);
        assert!(signs_in(&h, "ines@example.edu", NEW_PASSWORD).await);
    }

    #[tokio::test]
    async fn test_update_from_stale_copy_keeps_credential() {
        let h = Harness::new();
        h.register("jon@example.edu", RoleProfile::teacher()).await;
        let email = Email::new("jon@example.edu").unwrap();
        let mut stale = h.repo.find_by_email(&email).await.unwrap().unwrap();

        let issued = h.reset().request("jon@example.edu").await.unwrap();
        h.reset()
            .confirm(crate::application::ConfirmResetInput {
                token: issued.value.expose().to_string(),
                new_password: NEW_PASSWORD.to_string(),
                password_confirmation: NEW_PASSWORD.to_string(),
            })
            .await
            .unwrap();

        stale.verified = true;
        h.repo.update(&stale).await.unwrap();

        let stored = h.repo.find_by_email(&email).await.unwrap().unwrap();
        assert!(stored.verified);
        assert!(signs_in(&h, "jon@example.edu", NEW_PASSWORD).await);
        assert!(!signs_in(&h, "jon@example.edu", PASSWORD).await);
    }
}
