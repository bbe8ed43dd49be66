//! Value Object Module

pub mod credential;
pub mod email;
pub mod identity_role;
pub mod public_id;
pub mod reset_token_value;
pub mod role_profile;
