//! Course and enrollment status codes

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseStatus {
    #[display("DRAFT")]
    Draft,
    #[display("PUBLISHED")]
    Published,
}

impl CourseStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "DRAFT",
            CourseStatus::Published => "PUBLISHED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DRAFT" => Some(CourseStatus::Draft),
            "PUBLISHED" => Some(CourseStatus::Published),
            _ => None,
        }
    }
}

/// `PENDING` moves to `APPROVED` or `REJECTED`; a decision may be replaced
/// by a later one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    #[display("PENDING")]
    Pending,
    #[display("APPROVED")]
    Approved,
    #[display("REJECTED")]
    Rejected,
}

impl EnrollmentStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "PENDING",
            EnrollmentStatus::Approved => "APPROVED",
            EnrollmentStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PENDING" => Some(EnrollmentStatus::Pending),
            "APPROVED" => Some(EnrollmentStatus::Approved),
            "REJECTED" => Some(EnrollmentStatus::Rejected),
            _ => None,
        }
    }

    /// Whether a teacher may set this status
    pub const fn is_decision(&self) -> bool {
        matches!(self, EnrollmentStatus::Approved | EnrollmentStatus::Rejected)
    }
}
