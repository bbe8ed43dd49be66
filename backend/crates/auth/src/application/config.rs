//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::crypto;

use crate::error::{AuthError, AuthResult};

pub const ENV_TOKEN_SECRET: &str = "AUTH_TOKEN_SECRET";
pub const ENV_ACCESS_TOKEN_TTL_SECS: &str = "AUTH_ACCESS_TOKEN_TTL_SECS";
pub const ENV_REFRESH_TOKEN_TTL_SECS: &str = "AUTH_REFRESH_TOKEN_TTL_SECS";
pub const ENV_RESET_TOKEN_TTL_SECS: &str = "AUTH_RESET_TOKEN_TTL_SECS";
pub const ENV_PASSWORD_PEPPER: &str = "AUTH_PASSWORD_PEPPER";

/// Shortest accepted reset token lifetime
pub const MIN_RESET_TOKEN_TTL: Duration = Duration::from_secs(60);
/// Longest accepted reset token lifetime
pub const MAX_RESET_TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);
/// Longest accepted access token lifetime
pub const MAX_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);
/// Longest accepted refresh token lifetime
pub const MAX_REFRESH_TOKEN_TTL: Duration = Duration::from_secs(90 * 24 * 3600);

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 key for session tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Access token TTL (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token TTL (1 week)
    pub refresh_token_ttl: Duration,
    /// Password reset token TTL (1 hour)
    pub reset_token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            access_token_ttl: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            reset_token_ttl: Duration::from_secs(3600),     // 1 hour
            password_pepper: None,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("reset_token_ttl", &self.reset_token_ttl)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development
    ///
    /// Random secret, so every restart invalidates outstanding tokens.
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Build from the process environment
    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    ///
    /// `AUTH_TOKEN_SECRET` is required (standard base64 of exactly 32 bytes).
    /// TTLs are whole seconds; absent values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> AuthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secret = lookup(ENV_TOKEN_SECRET)
            .ok_or_else(|| AuthError::Configuration(format!("{ENV_TOKEN_SECRET} is not set")))?;
        let secret = crypto::from_base64(secret.trim()).map_err(|e| {
            AuthError::Configuration(format!("{ENV_TOKEN_SECRET} is not valid base64: {e}"))
        })?;
        let token_secret: [u8; 32] = secret.try_into().map_err(|bytes: Vec<u8>| {
            AuthError::Configuration(format!(
                "{ENV_TOKEN_SECRET} must decode to 32 bytes (got {})",
                bytes.len()
            ))
        })?;

        let config = Self {
            token_secret,
            access_token_ttl: ttl_from(&lookup, ENV_ACCESS_TOKEN_TTL_SECS)?
                .unwrap_or(defaults.access_token_ttl),
            refresh_token_ttl: ttl_from(&lookup, ENV_REFRESH_TOKEN_TTL_SECS)?
                .unwrap_or(defaults.refresh_token_ttl),
            reset_token_ttl: ttl_from(&lookup, ENV_RESET_TOKEN_TTL_SECS)?
                .unwrap_or(defaults.reset_token_ttl),
            password_pepper: lookup(ENV_PASSWORD_PEPPER)
                .filter(|p| !p.is_empty())
                .map(String::into_bytes),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> AuthResult<()> {
        if self.access_token_ttl.is_zero() || self.refresh_token_ttl.is_zero() {
            return Err(AuthError::Configuration(
                "Token TTLs must be positive".into(),
            ));
        }
        if self.access_token_ttl > MAX_ACCESS_TOKEN_TTL {
            return Err(AuthError::Configuration(format!(
                "Access token TTL must be at most {}s (got {}s)",
                MAX_ACCESS_TOKEN_TTL.as_secs(),
                self.access_token_ttl.as_secs()
            )));
        }
        if self.refresh_token_ttl > MAX_REFRESH_TOKEN_TTL {
            return Err(AuthError::Configuration(format!(
                "Refresh token TTL must be at most {}s (got {}s)",
                MAX_REFRESH_TOKEN_TTL.as_secs(),
                self.refresh_token_ttl.as_secs()
            )));
        }
        if !(MIN_RESET_TOKEN_TTL..=MAX_RESET_TOKEN_TTL).contains(&self.reset_token_ttl) {
            return Err(AuthError::Configuration(format!(
                "Reset token TTL must be between {}s and {}s (got {}s)",
                MIN_RESET_TOKEN_TTL.as_secs(),
                MAX_RESET_TOKEN_TTL.as_secs(),
                self.reset_token_ttl.as_secs()
            )));
        }
        Ok(())
    }

    /// Get access token TTL in milliseconds
    pub fn access_token_ttl_ms(&self) -> i64 {
        millis(self.access_token_ttl)
    }

    /// Get refresh token TTL in milliseconds
    pub fn refresh_token_ttl_ms(&self) -> i64 {
        millis(self.refresh_token_ttl)
    }

    /// Get reset token TTL in milliseconds
    pub fn reset_token_ttl_ms(&self) -> i64 {
        millis(self.reset_token_ttl)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

/// Saturates where `validate` would reject the lifetime anyway
fn millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

fn ttl_from<F>(lookup: &F, key: &str) -> AuthResult<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| AuthError::Configuration(format!("{key} must be whole seconds: {e}")))
        })
        .transpose()
}
