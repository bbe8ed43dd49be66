//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{CourseId, EnrollmentId, IdentityId};
use sqlx::PgPool;
use uuid::Uuid;

use auth::infra::postgres::is_unique_violation;

use crate::domain::entity::{course::Course, enrollment::Enrollment};
use crate::domain::repository::{CourseRepository, EnrollmentRepository};
use crate::domain::value_object::{
    progress::Progress,
    status::{CourseStatus, EnrollmentStatus},
};
use crate::error::{EnrollmentError, EnrollmentResult};

const ENROLLMENT_COLUMNS: &str = r#"
    e.enrollment_id,
    e.student_id,
    e.course_id,
    e.status,
    e.progress,
    e.completed,
    e.enrolled_at,
    e.last_accessed_at,
    e.decided_at,
    e.decision_message,
    e.version
"#;

/// PostgreSQL-backed enrollment repository
#[derive(Clone)]
pub struct PgEnrollmentRepository {
    pool: PgPool,
}

impl PgEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_all(
        &self,
        filter: &str,
        first: Uuid,
        status: Option<EnrollmentStatus>,
    ) -> EnrollmentResult<Vec<Enrollment>> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments e {filter} ORDER BY e.enrolled_at"
        );
        let rows = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(first)
            .bind(status.map(|s| s.code()))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Enrollment::try_from).collect()
    }
}

// ============================================================================
// Course Repository Implementation
// ============================================================================

impl CourseRepository for PgEnrollmentRepository {
    async fn find_by_id(&self, id: &CourseId) -> EnrollmentResult<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT course_id, title, owner_id, status, created_at, published_at
            FROM courses
            WHERE course_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Course::try_from).transpose()
    }
}

// ============================================================================
// Enrollment Repository Implementation
// ============================================================================

impl EnrollmentRepository for PgEnrollmentRepository {
    async fn find_by_id(&self, id: &EnrollmentId) -> EnrollmentResult<Option<Enrollment>> {
        let sql = format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments e WHERE e.enrollment_id = $1");
        let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Enrollment::try_from).transpose()
    }

    async fn find_by_student_and_course(
        &self,
        student_id: &IdentityId,
        course_id: &CourseId,
    ) -> EnrollmentResult<Option<Enrollment>> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments e WHERE e.student_id = $1 AND e.course_id = $2"
        );
        let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(student_id.as_uuid())
            .bind(course_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Enrollment::try_from).transpose()
    }

    async fn find_by_student(&self, student_id: &IdentityId) -> EnrollmentResult<Vec<Enrollment>> {
        self.fetch_all(
            "WHERE e.student_id = $1 AND ($2::text IS NULL OR e.status = $2)",
            *student_id.as_uuid(),
            None,
        )
        .await
    }

    async fn find_by_courses_owned_by(
        &self,
        teacher_id: &IdentityId,
        status: Option<EnrollmentStatus>,
    ) -> EnrollmentResult<Vec<Enrollment>> {
        self.fetch_all(
            "JOIN courses c ON c.course_id = e.course_id \
             WHERE c.owner_id = $1 AND ($2::text IS NULL OR e.status = $2)",
            *teacher_id.as_uuid(),
            status,
        )
        .await
    }

    async fn create(&self, enrollment: &Enrollment) -> EnrollmentResult<()> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (
                enrollment_id,
                student_id,
                course_id,
                status,
                progress,
                completed,
                enrolled_at,
                last_accessed_at,
                decided_at,
                decision_message,
                version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.student_id.as_uuid())
        .bind(enrollment.course_id.as_uuid())
        .bind(enrollment.status.code())
        .bind(enrollment.progress.value())
        .bind(enrollment.completed)
        .bind(enrollment.enrolled_at)
        .bind(enrollment.last_accessed_at)
        .bind(enrollment.decided_at)
        .bind(enrollment.decision_message.as_deref())
        .bind(enrollment.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EnrollmentError::AlreadyEnrolled
            } else {
                EnrollmentError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn update(&self, enrollment: &Enrollment) -> EnrollmentResult<i64> {
        let version = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE enrollments SET
                status = $2,
                progress = $3,
                completed = $4,
                last_accessed_at = $5,
                decided_at = $6,
                decision_message = $7,
                version = version + 1
            WHERE enrollment_id = $1 AND version = $8
            RETURNING version
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.status.code())
        .bind(enrollment.progress.value())
        .bind(enrollment.completed)
        .bind(enrollment.last_accessed_at)
        .bind(enrollment.decided_at)
        .bind(enrollment.decision_message.as_deref())
        .bind(enrollment.version)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(version) = version {
            return Ok(version);
        }

        // Zero rows: either gone, or someone else wrote first
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE enrollment_id = $1)",
        )
        .bind(enrollment.id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Err(if exists {
            EnrollmentError::ConcurrentModification
        } else {
            EnrollmentError::EnrollmentNotFound
        })
    }

    async fn delete(&self, id: &EnrollmentId) -> EnrollmentResult<bool> {
        let deleted = sqlx::query("DELETE FROM enrollments WHERE enrollment_id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct CourseRow {
    course_id: Uuid,
    title: String,
    owner_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

impl TryFrom<CourseRow> for Course {
    type Error = EnrollmentError;

    fn try_from(row: CourseRow) -> EnrollmentResult<Self> {
        let status = CourseStatus::from_code(&row.status).ok_or_else(|| {
            EnrollmentError::Internal(format!("Unknown course status: {}", row.status))
        })?;

        Ok(Course {
            id: CourseId::from_uuid(row.course_id),
            title: row.title,
            owner_id: IdentityId::from_uuid(row.owner_id),
            status,
            created_at: row.created_at,
            published_at: row.published_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EnrollmentRow {
    enrollment_id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    status: String,
    progress: f64,
    completed: bool,
    enrolled_at: DateTime<Utc>,
    last_accessed_at: Option<DateTime<Utc>>,
    decided_at: Option<DateTime<Utc>>,
    decision_message: Option<String>,
    version: i64,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = EnrollmentError;

    fn try_from(row: EnrollmentRow) -> EnrollmentResult<Self> {
        let status = EnrollmentStatus::from_code(&row.status).ok_or_else(|| {
            EnrollmentError::Internal(format!("Unknown enrollment status: {}", row.status))
        })?;
        let progress = Progress::new(row.progress)
            .map_err(|e| EnrollmentError::Internal(format!("Stored progress invalid: {e}")))?;

        Ok(Enrollment {
            id: EnrollmentId::from_uuid(row.enrollment_id),
            student_id: IdentityId::from_uuid(row.student_id),
            course_id: CourseId::from_uuid(row.course_id),
            status,
            progress,
            completed: row.completed,
            enrolled_at: row.enrolled_at,
            last_accessed_at: row.last_accessed_at,
            decided_at: row.decided_at,
            decision_message: row.decision_message,
            version: row.version,
        })
    }
}
