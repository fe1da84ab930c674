//! Lesson progress persistence, course completion, and certificates.
//!
//! Progress rows are unique per `(student, lesson)` and written through
//! an idempotent upsert: marking a completed lesson complete again keeps
//! the original `completed_at` timestamp. Completion queries always
//! scope progress through the live `lessons` table, so orphaned rows
//! from deleted lessons never inflate a student's count.

use std::collections::BTreeSet;

use coursekit_core::progress;
use coursekit_types::{
    Certificate, CertificateId, CourseCompletion, CourseId, LessonId, LessonProgress, ProgressId,
    UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `lesson_progress` and `certificates` tables.
pub struct ProgressStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ProgressStore<'a> {
    /// Create a new progress store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Mark a lesson complete for a student (idempotent).
    ///
    /// The first completion stamps `completed_at`; repeated calls return
    /// the row with the original timestamp intact. Concurrent duplicates
    /// collapse onto the unique `(student, lesson)` index.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if the lesson does not exist, or
    /// [`DbError::Postgres`] on query failure.
    pub async fn mark_complete(
        &self,
        student_id: UserId,
        lesson_id: LessonId,
    ) -> Result<LessonProgress, DbError> {
        let lesson_exists: Option<(Uuid,)> =
            sqlx::query_as(r"SELECT id FROM lessons WHERE id = $1")
                .bind(lesson_id.into_inner())
                .fetch_optional(self.pool)
                .await?;
        if lesson_exists.is_none() {
            return Err(DbError::NotFound {
                entity: "lesson",
                id: lesson_id.into_inner(),
            });
        }

        let id = ProgressId::new();
        let row = sqlx::query_as::<_, ProgressRow>(
            r"INSERT INTO lesson_progress (id, student_id, lesson_id, completed, completed_at)
              VALUES ($1, $2, $3, TRUE, now())
              ON CONFLICT (student_id, lesson_id) DO UPDATE
              SET completed = TRUE,
                  completed_at = COALESCE(lesson_progress.completed_at, EXCLUDED.completed_at)
              RETURNING id, student_id, lesson_id, completed, completed_at",
        )
        .bind(id.into_inner())
        .bind(student_id.into_inner())
        .bind(lesson_id.into_inner())
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(
            student_id = %student_id,
            lesson_id = %lesson_id,
            "Marked lesson complete"
        );

        Ok(row.into_progress())
    }

    /// Whether a student has completed a specific lesson.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn is_lesson_completed(
        &self,
        student_id: UserId,
        lesson_id: LessonId,
    ) -> Result<bool, DbError> {
        let row: Option<(bool,)> = sqlx::query_as(
            r"SELECT completed FROM lesson_progress
              WHERE student_id = $1 AND lesson_id = $2",
        )
        .bind(student_id.into_inner())
        .bind(lesson_id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.is_some_and(|r| r.0))
    }

    /// Derive a student's completion state for a course.
    ///
    /// Counts only lessons the course currently contains; progress rows
    /// for removed lessons are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails.
    pub async fn course_completion(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<CourseCompletion, DbError> {
        let course_lessons: Vec<(Uuid,)> = sqlx::query_as(
            r"SELECT l.id FROM lessons l
              JOIN course_modules m ON m.id = l.module_id
              WHERE m.course_id = $1",
        )
        .bind(course_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        let completed: Vec<(Uuid,)> = sqlx::query_as(
            r"SELECT lesson_id FROM lesson_progress
              WHERE student_id = $1 AND completed",
        )
        .bind(student_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        let course_set: BTreeSet<LessonId> =
            course_lessons.into_iter().map(|r| LessonId::from(r.0)).collect();
        let completed_set: BTreeSet<LessonId> =
            completed.into_iter().map(|r| LessonId::from(r.0)).collect();

        Ok(progress::course_completion(&course_set, &completed_set))
    }

    /// Issue a certificate if the student has completed the course.
    ///
    /// Returns `Ok(None)` when the course is not yet complete (or has no
    /// lessons). Issuance is idempotent: a repeat call returns the
    /// previously issued certificate.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails.
    pub async fn issue_certificate(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Certificate>, DbError> {
        let completion = self.course_completion(student_id, course_id).await?;
        if !progress::certificate_eligible(&completion) {
            return Ok(None);
        }

        let id = CertificateId::new();
        let inserted = sqlx::query_as::<_, CertificateRow>(
            r"INSERT INTO certificates (id, student_id, course_id)
              VALUES ($1, $2, $3)
              ON CONFLICT (student_id, course_id) DO NOTHING
              RETURNING id, student_id, course_id, generated_at",
        )
        .bind(id.into_inner())
        .bind(student_id.into_inner())
        .bind(course_id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        match inserted {
            Some(row) => {
                tracing::info!(
                    student_id = %student_id,
                    course_id = %course_id,
                    "Issued certificate"
                );
                Ok(Some(row.into_certificate()))
            }
            None => self.certificate(student_id, course_id).await,
        }
    }

    /// Look up a previously issued certificate.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn certificate(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Certificate>, DbError> {
        let row = sqlx::query_as::<_, CertificateRow>(
            r"SELECT id, student_id, course_id, generated_at
              FROM certificates
              WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id.into_inner())
        .bind(course_id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CertificateRow::into_certificate))
    }
}

/// A row from the `lesson_progress` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProgressRow {
    id: Uuid,
    student_id: Uuid,
    lesson_id: Uuid,
    completed: bool,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ProgressRow {
    fn into_progress(self) -> LessonProgress {
        LessonProgress {
            id: ProgressId::from(self.id),
            student_id: UserId::from(self.student_id),
            lesson_id: LessonId::from(self.lesson_id),
            completed: self.completed,
            completed_at: self.completed_at,
        }
    }
}

/// A row from the `certificates` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CertificateRow {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    generated_at: chrono::DateTime<chrono::Utc>,
}

impl CertificateRow {
    fn into_certificate(self) -> Certificate {
        Certificate {
            id: CertificateId::from(self.id),
            student_id: UserId::from(self.student_id),
            course_id: CourseId::from(self.course_id),
            generated_at: self.generated_at,
        }
    }
}
