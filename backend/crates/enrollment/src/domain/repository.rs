//! Repository Traits

use kernel::id::{CourseId, EnrollmentId, IdentityId};

use crate::domain::entity::{course::Course, enrollment::Enrollment};
use crate::domain::value_object::status::EnrollmentStatus;
use crate::error::EnrollmentResult;

/// Course repository trait
///
/// Courses are authored elsewhere; enrollment only reads them.
#[trait_variant::make(CourseRepository: Send)]
pub trait LocalCourseRepository {
    async fn find_by_id(&self, id: &CourseId) -> EnrollmentResult<Option<Course>>;
}

/// Enrollment repository trait
#[trait_variant::make(EnrollmentRepository: Send)]
pub trait LocalEnrollmentRepository {
    async fn find_by_id(&self, id: &EnrollmentId) -> EnrollmentResult<Option<Enrollment>>;

    async fn find_by_student_and_course(
        &self,
        student_id: &IdentityId,
        course_id: &CourseId,
    ) -> EnrollmentResult<Option<Enrollment>>;

    async fn find_by_student(&self, student_id: &IdentityId) -> EnrollmentResult<Vec<Enrollment>>;

    /// Enrollments in courses owned by `teacher_id`, optionally filtered by status
    async fn find_by_courses_owned_by(
        &self,
        teacher_id: &IdentityId,
        status: Option<EnrollmentStatus>,
    ) -> EnrollmentResult<Vec<Enrollment>>;

    /// Save a new enrollment
    ///
    /// Fails with `EnrollmentError::AlreadyEnrolled` if the (student, course)
    /// pair exists already.
    async fn create(&self, enrollment: &Enrollment) -> EnrollmentResult<()>;

    /// Write `enrollment` if the stored version still equals `enrollment.version`
    ///
    /// Returns the new version. A stale version fails with
    /// `EnrollmentError::ConcurrentModification`.
    async fn update(&self, enrollment: &Enrollment) -> EnrollmentResult<i64>;

    /// Returns whether a row was deleted
    async fn delete(&self, id: &EnrollmentId) -> EnrollmentResult<bool>;
}
