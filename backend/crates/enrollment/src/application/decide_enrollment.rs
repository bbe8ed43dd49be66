//! Decide Enrollment Use Case
//!
//! The course's teacher (or an admin) approves or rejects a request. A later
//! decision replaces an earlier one; concurrent deciders are serialized by
//! the enrollment version.

use std::sync::Arc;

use auth::domain::guard::{Caller, authorize};
use auth::domain::repository::IdentityRepository;
use auth::models::IdentityRole;
use kernel::clock::Clock;
use kernel::id::EnrollmentId;
use platform::notify::{NotificationEvent, Notifier};

use crate::application::notify::notify_identity;
use crate::domain::entity::enrollment::Enrollment;
use crate::domain::repository::{CourseRepository, EnrollmentRepository};
use crate::domain::value_object::status::EnrollmentStatus;
use crate::error::{EnrollmentError, EnrollmentResult};

/// Decide enrollment input
#[derive(Debug, Clone)]
pub struct DecisionInput {
    pub status: EnrollmentStatus,
    pub message: Option<String>,
}

pub struct DecideEnrollmentUseCase<E, C, I, N>
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

impl<E, C, I, N> DecideEnrollmentUseCase<E, C, I, N>
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

    pub async fn execute(
        &self,
        caller: &Caller,
        enrollment_id: EnrollmentId,
        input: DecisionInput,
    ) -> EnrollmentResult<Enrollment> {
        if !input.status.is_decision() {
            return Err(EnrollmentError::Validation(format!(
                "{} is not a decision",
                input.status
            )));
        }

        let mut enrollment = self
            .enrollment_repo
            .find_by_id(&enrollment_id)
            .await?
            .ok_or(EnrollmentError::EnrollmentNotFound)?;
        let course = self
            .course_repo
            .find_by_id(&enrollment.course_id)
            .await?
            .ok_or(EnrollmentError::CourseNotFound)?;

        let decider = authorize(caller, Some(course.owner_id), Some(IdentityRole::Teacher))?;
        let previous = enrollment.status;

        enrollment.decide(input.status, input.message, self.clock.now())?;
        enrollment.version = self.enrollment_repo.update(&enrollment).await?;

        tracing::info!(
            enrollment_id = %enrollment.id,
            decider = %decider.identity_id,
            from = %previous,
            to = %enrollment.status,
            "Enrollment decided"
        );

        let event = match enrollment.status {
            EnrollmentStatus::Approved => NotificationEvent::EnrollmentAccepted,
            _ => NotificationEvent::EnrollmentRejected,
        };
        notify_identity(
            self.identity_repo.clone(),
            self.notifier.clone(),
            enrollment.student_id,
            event,
            serde_json::json!({
                "enrollment_id": enrollment.id.to_string(),
                "course_id": course.id.to_string(),
                "course_title": course.title,
                "message": enrollment.decision_message,
            }),
        );

        Ok(enrollment)
    }
}
