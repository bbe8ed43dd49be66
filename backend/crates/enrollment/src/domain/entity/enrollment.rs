//! Enrollment Entity
//!
//! One per (student, course) pair. Created `PENDING`, decided by the
//! course's teacher, then tracked while `APPROVED`. `completed` never goes
//! back to false.

use chrono::{DateTime, Utc};
use kernel::id::{CourseId, EnrollmentId, IdentityId};

use crate::domain::value_object::{progress::Progress, status::EnrollmentStatus};
use crate::error::{EnrollmentError, EnrollmentResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: IdentityId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    pub progress: Progress,
    pub completed: bool,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_message: Option<String>,
    /// Optimistic concurrency counter, owned by the repository
    pub version: i64,
}

impl Enrollment {
    pub fn new_request(student_id: IdentityId, course_id: CourseId, now: DateTime<Utc>) -> Self {
        Self {
            id: EnrollmentId::new(),
            student_id,
            course_id,
            status: EnrollmentStatus::Pending,
            progress: Progress::ZERO,
            completed: false,
            enrolled_at: now,
            last_accessed_at: None,
            decided_at: None,
            decision_message: None,
            version: 0,
        }
    }

    /// Record a teacher decision, replacing any earlier one
    ///
    /// ## Errors
    /// `Validation` if `status` is not `APPROVED` or `REJECTED`
    pub fn decide(
        &mut self,
        status: EnrollmentStatus,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> EnrollmentResult<()> {
        if !status.is_decision() {
            return Err(EnrollmentError::Validation(format!(
                "{status} is not a decision"
            )));
        }
        self.status = status;
        self.decision_message = message.filter(|m| !m.trim().is_empty());
        self.decided_at = Some(now);
        Ok(())
    }

    /// Store the latest progress of an approved enrollment
    ///
    /// `completed` is set once progress reaches 100 and stays set even if a
    /// later call lowers the progress, so `completed` with progress below 100
    /// is a valid state.
    pub fn record_progress(&mut self, progress: Progress, now: DateTime<Utc>) -> EnrollmentResult<()> {
        self.ensure_approved()?;
        self.progress = progress;
        self.last_accessed_at = Some(now);
        if progress.is_complete() {
            self.completed = true;
        }
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> EnrollmentResult<()> {
        self.record_progress(Progress::COMPLETE, now)
    }

    pub fn ensure_pending(&self) -> EnrollmentResult<()> {
        match self.status {
            EnrollmentStatus::Pending => Ok(()),
            _ => Err(EnrollmentError::NotPending),
        }
    }

    fn ensure_approved(&self) -> EnrollmentResult<()> {
        match self.status {
            EnrollmentStatus::Approved => Ok(()),
            _ => Err(EnrollmentError::NotApproved),
        }
    }
}
