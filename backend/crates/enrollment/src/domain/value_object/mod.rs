//! Value Object Module

pub mod progress;
pub mod status;
