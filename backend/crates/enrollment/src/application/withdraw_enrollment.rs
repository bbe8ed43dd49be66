//! Withdraw Enrollment Use Case
//!
//! The enrolled student may cancel a pending request or leave a course at
//! any time. Both delete the enrollment.

use std::sync::Arc;

use auth::domain::guard::{Caller, authorize};
use kernel::id::EnrollmentId;

use crate::domain::entity::enrollment::Enrollment;
use crate::domain::repository::EnrollmentRepository;
use crate::error::{EnrollmentError, EnrollmentResult};

pub struct WithdrawEnrollmentUseCase<E>
where
    E: EnrollmentRepository,
{
    enrollment_repo: Arc<E>,
}

impl<E> WithdrawEnrollmentUseCase<E>
where
    E: EnrollmentRepository,
{
    pub fn new(enrollment_repo: Arc<E>) -> Self {
        Self { enrollment_repo }
    }

    /// ## Errors
    /// `NotPending` once the request has been decided
    pub async fn cancel_pending(
        &self,
        caller: &Caller,
        enrollment_id: EnrollmentId,
    ) -> EnrollmentResult<()> {
        let enrollment = self.load_owned(caller, enrollment_id).await?;
        enrollment.ensure_pending()?;
        self.remove(&enrollment).await?;

        tracing::info!(enrollment_id = %enrollment.id, "Pending enrollment cancelled");
        Ok(())
    }

    pub async fn unenroll(&self, caller: &Caller, enrollment_id: EnrollmentId) -> EnrollmentResult<()> {
        let enrollment = self.load_owned(caller, enrollment_id).await?;
        self.remove(&enrollment).await?;

        tracing::info!(
            enrollment_id = %enrollment.id,
            status = %enrollment.status,
            "Student unenrolled"
        );
        Ok(())
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
        authorize(caller, Some(enrollment.student_id), None)?;
        Ok(enrollment)
    }

    async fn remove(&self, enrollment: &Enrollment) -> EnrollmentResult<()> {
        if !self.enrollment_repo.delete(&enrollment.id).await? {
            return Err(EnrollmentError::EnrollmentNotFound);
        }
        Ok(())
    }
}
