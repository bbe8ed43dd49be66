//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC-SHA256, Base64, secure random bytes)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Best-effort notification dispatch (detached from the triggering operation)

pub mod crypto;
pub mod notify;
pub mod password;
