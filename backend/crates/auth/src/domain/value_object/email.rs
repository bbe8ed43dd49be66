//! Email Value Object
//!
//! Addresses are trimmed and lowercased at construction, so two spellings of
//! the same mailbox compare equal. Registration uniqueness relies on this.
//! Only the shape is checked here; deliverability is not.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AuthError, AuthResult};

/// RFC 5321 path limit
const MAX_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(raw: impl Into<String>) -> AuthResult<Self> {
        let normalized = raw.into().trim().to_lowercase();
        match shape_error(&normalized) {
            None => Ok(Self(normalized)),
            Some(reason) => Err(AuthError::Validation(reason.into())),
        }
    }

    /// Wrap a value read back from storage, which was normalized on write
    pub fn from_db(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn shape_error(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        return Some("Email cannot be empty");
    }
    if email.len() > MAX_LEN {
        return Some("Email is too long");
    }
    let Some((local, host)) = email.split_once('@') else {
        return Some("Email must contain '@'");
    };
    if local.is_empty() || local.len() > MAX_LOCAL_LEN || local.chars().any(char::is_whitespace) {
        return Some("Invalid email local part");
    }
    let host_ok = host
        .split('.')
        .all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    if !host.contains('.') || !host_ok {
        return Some("Invalid email domain");
    }
    None
}

impl TryFrom<String> for Email {
    type Error = AuthError;

    fn try_from(raw: String) -> AuthResult<Self> {
        Email::new(raw)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl FromStr for Email {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        Email::new(s)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
