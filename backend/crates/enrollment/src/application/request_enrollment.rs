//! Request Enrollment Use Case
//!
//! A student asks to join a published course. The request starts `PENDING`
//! and the course's teacher is told about it.

use std::sync::Arc;

use auth::domain::guard::{Caller, authorize};
use auth::domain::repository::IdentityRepository;
use auth::models::IdentityRole;
use kernel::clock::Clock;
use kernel::id::{CourseId, IdentityId};
use platform::notify::{NotificationEvent, Notifier};

use crate::application::notify::notify_identity;
use crate::domain::entity::enrollment::Enrollment;
use crate::domain::repository::{CourseRepository, EnrollmentRepository};
use crate::error::{EnrollmentError, EnrollmentResult};

pub struct RequestEnrollmentUseCase<E, C, I, N>
where
    E: EnrollmentRepository,
    C: CourseRepository,
    I: IdentityRepository + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    enrollment_repo: Arc<E>,
    course_repo: Arc<C>,
    identity_repo: Arc<I>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<E, C, I, N> RequestEnrollmentUseCase<E, C, I, N>
where
    E: EnrollmentRepository,
    C: CourseRepository,
    I: IdentityRepository + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(
        enrollment_repo: Arc<E>,
        course_repo: Arc<C>,
        identity_repo: Arc<I>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            enrollment_repo,
            course_repo,
            identity_repo,
            notifier,
            clock,
        }
    }

    /// ## Errors
    /// - `StudentNotFound` / `CourseNotFound`
    /// - `Auth(Unauthenticated | Forbidden)` unless the caller is the student or an admin
    /// - `NotAStudent` if the target identity is not a student
    /// - `CourseNotPublished`, `AlreadyEnrolled`
    pub async fn execute(
        &self,
        caller: &Caller,
        student_id: IdentityId,
        course_id: CourseId,
    ) -> EnrollmentResult<Enrollment> {
        let student = self
            .identity_repo
            .find_by_id(&student_id)
            .await?
            .ok_or(EnrollmentError::StudentNotFound)?;
        let course = self
            .course_repo
            .find_by_id(&course_id)
            .await?
            .ok_or(EnrollmentError::CourseNotFound)?;

        authorize(caller, Some(student_id), Some(IdentityRole::Student))?;

        if student.role() != IdentityRole::Student {
            return Err(EnrollmentError::NotAStudent);
        }
        if !course.is_enrollable() {
            return Err(EnrollmentError::CourseNotPublished);
        }
        if self
            .enrollment_repo
            .find_by_student_and_course(&student_id, &course_id)
            .await?
            .is_some()
        {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        let enrollment = Enrollment::new_request(student_id, course_id, self.clock.now());
        // The store decides between concurrent identical requests
        self.enrollment_repo.create(&enrollment).await?;

        tracing::info!(
            enrollment_id = %enrollment.id,
            student_id = %student_id,
            course_id = %course_id,
            "Enrollment requested"
        );

        notify_identity(
            self.identity_repo.clone(),
            self.notifier.clone(),
            course.owner_id,
            NotificationEvent::EnrollmentRequested,
            serde_json::json!({
                "enrollment_id": enrollment.id.to_string(),
                "course_id": course.id.to_string(),
                "course_title": course.title,
                "student_id": student_id.to_string(),
            }),
        );

        Ok(enrollment)
    }
}
