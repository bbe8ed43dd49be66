//! Session Token Service
//!
//! Stateless signed tokens:
//! `base64url(json claims) "." base64url(HMAC-SHA256(secret, first segment))`.
//!
//! The MAC is checked in constant time before the claims are parsed. All
//! timestamps are Unix milliseconds from the injected [`Clock`]; issuer and
//! validator share the clock, so no skew allowance is applied.

use std::sync::Arc;

use kernel::clock::Clock;
use platform::crypto;
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::Identity;
use crate::domain::value_object::{identity_role::IdentityRole, public_id::PublicId};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    #[display("ACCESS")]
    Access,
    #[display("REFRESH")]
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: IdentityRole,
    kind: TokenKind,
    iat: i64,
    exp: i64,
}

/// Freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub kind: TokenKind,
    pub expires_at_ms: i64,
}

/// Claims of a token that passed validation
///
/// The subject still has to be re-resolved against the identity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: PublicId,
    pub role: IdentityRole,
    pub kind: TokenKind,
    pub issued_at_ms: i64,
    pub expires_at_ms: i64,
}

#[derive(Clone)]
pub struct TokenService {
    config: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: Arc<AuthConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn issue_access(&self, identity: &Identity) -> AuthResult<IssuedToken> {
        self.issue(identity, TokenKind::Access, self.config.access_token_ttl_ms())
    }

    pub fn issue_refresh(&self, identity: &Identity) -> AuthResult<IssuedToken> {
        self.issue(identity, TokenKind::Refresh, self.config.refresh_token_ttl_ms())
    }

    fn issue(&self, identity: &Identity, kind: TokenKind, ttl_ms: i64) -> AuthResult<IssuedToken> {
        let now_ms = self.clock.now_ms();
        let exp = now_ms
            .checked_add(ttl_ms)
            .ok_or_else(|| AuthError::Internal(format!("{kind} token expiry overflows")))?;
        let claims = Claims {
            sub: identity.public_id.to_string(),
            role: identity.role(),
            kind,
            iat: now_ms,
            exp,
        };

        let json = serde_json::to_vec(&claims)
            .map_err(|e| AuthError::Internal(format!("Failed to encode token claims: {e}")))?;
        let payload = crypto::to_base64_url(&json);
        let signature = crypto::hmac_sha256(&self.config.token_secret, payload.as_bytes());

        Ok(IssuedToken {
            token: format!("{}.{}", payload, crypto::to_base64_url(&signature)),
            kind,
            expires_at_ms: claims.exp,
        })
    }

    /// Validate a token of the expected kind
    ///
    /// ## Errors
    /// `AuthError::InvalidToken` for any malformed encoding, signature
    /// mismatch, wrong kind or expiry at or before now.
    pub fn validate(&self, token: &str, expected: TokenKind) -> AuthResult<VerifiedToken> {
        let claims = self.verify_signature(token).ok_or_else(|| {
            tracing::debug!("Rejected token with bad structure or signature");
            AuthError::InvalidToken
        })?;

        if claims.kind != expected {
            tracing::debug!(kind = %claims.kind, expected = %expected, "Rejected token of wrong kind");
            return Err(AuthError::InvalidToken);
        }

        if self.clock.now_ms() >= claims.exp {
            tracing::debug!(expired_at_ms = claims.exp, "Rejected expired token");
            return Err(AuthError::InvalidToken);
        }

        let subject = PublicId::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(VerifiedToken {
            subject,
            role: claims.role,
            kind: claims.kind,
            issued_at_ms: claims.iat,
            expires_at_ms: claims.exp,
        })
    }

    fn verify_signature(&self, token: &str) -> Option<Claims> {
        let (payload, signature) = token.split_once('.')?;
        let signature = crypto::from_base64_url(signature).ok()?;
        if !crypto::verify_hmac_sha256(&self.config.token_secret, payload.as_bytes(), &signature) {
            return None;
        }
        let json = crypto::from_base64_url(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}
