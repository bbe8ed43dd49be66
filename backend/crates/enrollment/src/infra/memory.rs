//! In-memory Repository Implementations
//!
//! Courses and enrollments share one lock so the (student, course)
//! uniqueness check and the insert happen together.

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::{CourseId, EnrollmentId, IdentityId};
use tokio::sync::Mutex;

use crate::domain::entity::{course::Course, enrollment::Enrollment};
use crate::domain::repository::{CourseRepository, EnrollmentRepository};
use crate::domain::value_object::status::EnrollmentStatus;
use crate::error::{EnrollmentError, EnrollmentResult};

#[derive(Default)]
struct State {
    courses: HashMap<CourseId, Course>,
    enrollments: HashMap<EnrollmentId, Enrollment>,
}

/// In-memory enrollment repository
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct MemoryEnrollmentRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryEnrollmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a course
    pub async fn put_course(&self, course: Course) {
        self.state.lock().await.courses.insert(course.id, course);
    }
}

fn by_enrolled_at(mut enrollments: Vec<Enrollment>) -> Vec<Enrollment> {
    enrollments.sort_by_key(|e| e.enrolled_at);
    enrollments
}

impl CourseRepository for MemoryEnrollmentRepository {
    async fn find_by_id(&self, id: &CourseId) -> EnrollmentResult<Option<Course>> {
        Ok(self.state.lock().await.courses.get(id).cloned())
    }
}

impl EnrollmentRepository for MemoryEnrollmentRepository {
    async fn find_by_id(&self, id: &EnrollmentId) -> EnrollmentResult<Option<Enrollment>> {
        Ok(self.state.lock().await.enrollments.get(id).cloned())
    }

    async fn find_by_student_and_course(
        &self,
        student_id: &IdentityId,
        course_id: &CourseId,
    ) -> EnrollmentResult<Option<Enrollment>> {
        let state = self.state.lock().await;
        Ok(state
            .enrollments
            .values()
            .find(|e| e.student_id == *student_id && e.course_id == *course_id)
            .cloned())
    }

    async fn find_by_student(&self, student_id: &IdentityId) -> EnrollmentResult<Vec<Enrollment>> {
        let state = self.state.lock().await;
        Ok(by_enrolled_at(
            state
                .enrollments
                .values()
                .filter(|e| e.student_id == *student_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_courses_owned_by(
        &self,
        teacher_id: &IdentityId,
        status: Option<EnrollmentStatus>,
    ) -> EnrollmentResult<Vec<Enrollment>> {
        let state = self.state.lock().await;
        Ok(by_enrolled_at(
            state
                .enrollments
                .values()
                .filter(|e| {
                    state
                        .courses
                        .get(&e.course_id)
                        .is_some_and(|c| c.owner_id == *teacher_id)
                })
                .filter(|e| status.is_none_or(|s| e.status == s))
                .cloned()
                .collect(),
        ))
    }

    async fn create(&self, enrollment: &Enrollment) -> EnrollmentResult<()> {
        let mut state = self.state.lock().await;
        if state.enrollments.values().any(|e| {
            e.student_id == enrollment.student_id && e.course_id == enrollment.course_id
        }) {
            return Err(EnrollmentError::AlreadyEnrolled);
        }
        if state.enrollments.contains_key(&enrollment.id) {
            return Err(EnrollmentError::Internal("Duplicate enrollment key".into()));
        }
        state.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(())
    }

    async fn update(&self, enrollment: &Enrollment) -> EnrollmentResult<i64> {
        let mut state = self.state.lock().await;
        let stored = state
            .enrollments
            .get_mut(&enrollment.id)
            .ok_or(EnrollmentError::EnrollmentNotFound)?;
        if stored.version != enrollment.version {
            return Err(EnrollmentError::ConcurrentModification);
        }
        *stored = enrollment.clone();
        stored.version += 1;
        Ok(stored.version)
    }

    async fn delete(&self, id: &EnrollmentId) -> EnrollmentResult<bool> {
        Ok(self.state.lock().await.enrollments.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn test_update_bumps_version_and_rejects_stale() {
        let repo = MemoryEnrollmentRepository::new();
        let mut enrollment = Enrollment::new_request(IdentityId::new(), CourseId::new(), Utc::now());
        repo.create(&enrollment).await.unwrap();

        let stale = enrollment.clone();
        enrollment.version = repo.update(&enrollment).await.unwrap();
        assert_eq!(enrollment.version, 1);

        let result = repo.update(&stale).await;
        assert!(matches!(result, Err(EnrollmentError::ConcurrentModification)));
    }

    #[tokio::test]
    async fn test_update_missing() {
        let repo = MemoryEnrollmentRepository::new();
        let enrollment = Enrollment::new_request(IdentityId::new(), CourseId::new(), Utc::now());
        let result = repo.update(&enrollment).await;
        assert!(matches!(result, Err(EnrollmentError::EnrollmentNotFound)));
        assert!(!repo.delete(&enrollment.id).await.unwrap());
    }
}
