//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod refresh_session;
pub mod reset_password;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod token_service;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use refresh_session::RefreshSessionUseCase;
pub use reset_password::{ConfirmResetInput, IssuedResetToken, ResetPasswordUseCase};
pub use sign_in::{SessionTokens, SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use token_service::{IssuedToken, TokenKind, TokenService, VerifiedToken};
