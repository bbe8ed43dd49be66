//! Entity Module

pub mod course;
pub mod enrollment;
