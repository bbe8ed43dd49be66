//! Entity Module

pub mod identity;
pub mod reset_token;
