//! Course Entity

use chrono::{DateTime, Utc};
use kernel::id::{CourseId, IdentityId};

use crate::domain::value_object::status::CourseStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    /// Owning teacher
    pub owner_id: IdentityId,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Course {
    pub fn draft(title: impl Into<String>, owner_id: IdentityId, now: DateTime<Utc>) -> Self {
        Self {
            id: CourseId::new(),
            title: title.into(),
            owner_id,
            status: CourseStatus::Draft,
            created_at: now,
            published_at: None,
        }
    }

    pub fn publish(&mut self, now: DateTime<Utc>) {
        if self.status != CourseStatus::Published {
            self.status = CourseStatus::Published;
            self.published_at = Some(now);
        }
    }

    #[inline]
    pub fn is_enrollable(&self) -> bool {
        self.status == CourseStatus::Published
    }
}
