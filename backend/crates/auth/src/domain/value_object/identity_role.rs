use serde::{Deserialize, Serialize};
use std::fmt;

/// The three fixed roles. Immutable after an identity is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum IdentityRole {
    Student = 0,
    Teacher = 1,
    Admin = 2,
}

impl IdentityRole {
    pub const ALL: [IdentityRole; 3] = [Self::Student, Self::Teacher, Self::Admin];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use IdentityRole::*;
        match self {
            Student => "STUDENT",
            Teacher => "TEACHER",
            Admin => "ADMIN",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, IdentityRole::Admin)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use IdentityRole::*;
        match id {
            0 => Some(Student),
            1 => Some(Teacher),
            2 => Some(Admin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.code() == code)
    }
}

impl fmt::Display for IdentityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_role_from_id() {
        assert_eq!(IdentityRole::from_id(0), Some(IdentityRole::Student));
        assert_eq!(IdentityRole::from_id(1), Some(IdentityRole::Teacher));
        assert_eq!(IdentityRole::from_id(2), Some(IdentityRole::Admin));
        assert_eq!(IdentityRole::from_id(3), None);
    }

    #[test]
    fn test_identity_role_from_code() {
        assert_eq!(
            IdentityRole::from_code("TEACHER"),
            Some(IdentityRole::Teacher)
        );
        assert_eq!(IdentityRole::from_code("teacher"), None);
    }

    #[test]
    fn test_identity_role_serde_matches_code() {
        for role in IdentityRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.code()));
        }
    }

    #[test]
    fn test_only_admin_is_admin() {
        assert!(IdentityRole::Admin.is_admin());
        assert!(!IdentityRole::Teacher.is_admin());
        assert!(!IdentityRole::Student.is_admin());
    }
}
