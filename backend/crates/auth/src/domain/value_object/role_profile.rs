//! Role-specific identity attributes
//!
//! The variant decides the role. Attributes are informational and never
//! consulted by authorization.

use serde::{Deserialize, Serialize};

use super::identity_role::IdentityRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleProfile {
    Student {
        #[serde(default)]
        specialization: Option<String>,
    },
    Teacher {
        #[serde(default)]
        grade: Option<String>,
        #[serde(default)]
        subjects: Vec<String>,
    },
    Admin,
}

impl RoleProfile {
    pub fn student() -> Self {
        RoleProfile::Student {
            specialization: None,
        }
    }

    pub fn teacher() -> Self {
        RoleProfile::Teacher {
            grade: None,
            subjects: Vec::new(),
        }
    }

    pub fn role(&self) -> IdentityRole {
        match self {
            RoleProfile::Student { .. } => IdentityRole::Student,
            RoleProfile::Teacher { .. } => IdentityRole::Teacher,
            RoleProfile::Admin => IdentityRole::Admin,
        }
    }
}
