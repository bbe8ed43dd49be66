//! List Enrollments Use Case

use std::sync::Arc;

use auth::domain::guard::{Caller, authorize};
use auth::models::IdentityRole;
use kernel::id::IdentityId;

use crate::domain::entity::enrollment::Enrollment;
use crate::domain::repository::EnrollmentRepository;
use crate::domain::value_object::status::EnrollmentStatus;
use crate::error::EnrollmentResult;

pub struct ListEnrollmentsUseCase<E>
where
    E: EnrollmentRepository,
{
    enrollment_repo: Arc<E>,
}

impl<E> ListEnrollmentsUseCase<E>
where
    E: EnrollmentRepository,
{
    pub fn new(enrollment_repo: Arc<E>) -> Self {
        Self { enrollment_repo }
    }

    pub async fn for_student(
        &self,
        caller: &Caller,
        student_id: IdentityId,
    ) -> EnrollmentResult<Vec<Enrollment>> {
        authorize(caller, Some(student_id), None)?;
        self.enrollment_repo.find_by_student(&student_id).await
    }

    /// Requests awaiting a decision in the teacher's courses
    pub async fn pending_for_teacher(
        &self,
        caller: &Caller,
        teacher_id: IdentityId,
    ) -> EnrollmentResult<Vec<Enrollment>> {
        self.for_teacher(caller, teacher_id, Some(EnrollmentStatus::Pending))
            .await
    }

    pub async fn for_teacher(
        &self,
        caller: &Caller,
        teacher_id: IdentityId,
        status: Option<EnrollmentStatus>,
    ) -> EnrollmentResult<Vec<Enrollment>> {
        authorize(caller, Some(teacher_id), Some(IdentityRole::Teacher))?;
        self.enrollment_repo
            .find_by_courses_owned_by(&teacher_id, status)
            .await
    }
}
