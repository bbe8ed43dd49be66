//! Track Progress Use Case

use std::sync::Arc;

use auth::domain::guard::{Caller, authorize};
use auth::models::IdentityRole;
use kernel::clock::Clock;
use kernel::id::EnrollmentId;

use crate::domain::entity::enrollment::Enrollment;
use crate::domain::repository::EnrollmentRepository;
use crate::domain::value_object::progress::Progress;
use crate::error::{EnrollmentError, EnrollmentResult};

pub struct TrackProgressUseCase<E>
where
    E: EnrollmentRepository,
{
    enrollment_repo: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<E> TrackProgressUseCase<E>
where
    E: EnrollmentRepository,
{
    pub fn new(enrollment_repo: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            enrollment_repo,
            clock,
        }
    }

    /// Set progress; reaching 100 marks the enrollment completed
    pub async fn update_progress(
        &self,
        caller: &Caller,
        enrollment_id: EnrollmentId,
        progress: f64,
    ) -> EnrollmentResult<Enrollment> {
        let progress = Progress::new(progress)?;
        let mut enrollment = self.load_owned(caller, enrollment_id).await?;

        enrollment.record_progress(progress, self.clock.now())?;
        enrollment.version = self.enrollment_repo.update(&enrollment).await?;

        tracing::debug!(
            enrollment_id = %enrollment.id,
            progress = %enrollment.progress,
            completed = enrollment.completed,
            "Progress recorded"
        );
        Ok(enrollment)
    }

    pub async fn mark_completed(
        &self,
        caller: &Caller,
        enrollment_id: EnrollmentId,
    ) -> EnrollmentResult<Enrollment> {
        let mut enrollment = self.load_owned(caller, enrollment_id).await?;

        enrollment.complete(self.clock.now())?;
        enrollment.version = self.enrollment_repo.update(&enrollment).await?;

        tracing::info!(enrollment_id = %enrollment.id, "Enrollment completed");
        Ok(enrollment)
    }

    async fn load_owned(
        &self,
        caller: &Caller,
        enrollment_id: EnrollmentId,
    ) -> EnrollmentResult<Enrollment> {
        let enrollment = self
            .enrollment_repo
            .find_by_id(&enrollment_id)
            .await?
            .ok_or(EnrollmentError::EnrollmentNotFound)?;
        authorize(caller, Some(enrollment.student_id), Some(IdentityRole::Student))?;
        Ok(enrollment)
    }
}
