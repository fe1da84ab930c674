//! Enrollment persistence and the payment confirmation bridge.
//!
//! Enrollment uniqueness rests on the `(student_id, course_id)` unique
//! index; every write path here goes through `ON CONFLICT DO NOTHING`
//! so duplicate attempts (double-clicks, replayed payment callbacks)
//! resolve to the existing row instead of failing.
//!
//! Payment confirmation is the only path that credits an instructor. The
//! enrollment insert and the ledger credit share one transaction, and
//! the credit only happens when the insert actually created a row, which
//! makes crediting at-most-once per (student, course) by construction.

use coursekit_core::enrollment::{self, EnrollDecision};
use coursekit_types::{Course, CourseId, Enrollment, EnrollmentId, UserId};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::balance_store;
use crate::catalog_store::CatalogStore;
use crate::error::DbError;

/// The result of an enroll attempt.
#[derive(Debug, Clone)]
pub struct EnrollOutcome {
    /// The enrollment row (created now or pre-existing).
    pub enrollment: Enrollment,
    /// Whether the student was already enrolled before this attempt.
    pub already_enrolled: bool,
}

/// The result of a confirmed payment.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The enrollment row (created now or pre-existing).
    pub enrollment: Enrollment,
    /// The amount credited to the instructor, if this confirmation
    /// created the enrollment and the course was paid. `None` for
    /// replayed confirmations and free courses.
    pub credited: Option<Decimal>,
}

/// Operations on the `enrollments` table.
pub struct EnrollmentStore<'a> {
    pool: &'a PgPool,
}

impl<'a> EnrollmentStore<'a> {
    /// Create a new enrollment store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Enroll a student in a course directly.
    ///
    /// Free courses enroll immediately; a duplicate attempt returns the
    /// existing enrollment unchanged. Paid courses are rejected here and
    /// must go through [`EnrollmentStore::confirm_payment`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for a missing course,
    /// [`DbError::Enroll`] when the course requires payment, or
    /// [`DbError::Postgres`] on query failure.
    pub async fn enroll(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<EnrollOutcome, DbError> {
        let course = self.require_course(course_id).await?;

        let existing = self.enrollment_for(student_id, course_id).await?;
        match enrollment::evaluate(&course, existing.is_some()) {
            EnrollDecision::AlreadyEnrolled => {
                let enrollment = existing.ok_or(DbError::NotFound {
                    entity: "enrollment",
                    id: student_id.into_inner(),
                })?;
                Ok(EnrollOutcome {
                    enrollment,
                    already_enrolled: true,
                })
            }
            EnrollDecision::EnrollFree => {
                let inserted = self.insert_enrollment(student_id, course_id).await?;
                match inserted {
                    Some(enrollment) => {
                        tracing::info!(
                            student_id = %student_id,
                            course_id = %course_id,
                            "Enrolled student (free)"
                        );
                        Ok(EnrollOutcome {
                            enrollment,
                            already_enrolled: false,
                        })
                    }
                    // Lost a race with a concurrent enroll; the winner's
                    // row is the enrollment.
                    None => {
                        let enrollment =
                            self.enrollment_for(student_id, course_id).await?.ok_or(
                                DbError::NotFound {
                                    entity: "enrollment",
                                    id: student_id.into_inner(),
                                },
                            )?;
                        Ok(EnrollOutcome {
                            enrollment,
                            already_enrolled: true,
                        })
                    }
                }
            }
            EnrollDecision::RequirePayment { price } => {
                Err(coursekit_core::EnrollError::PaymentRequired { price }.into())
            }
        }
    }

    /// Record a confirmed payment: enroll the student and credit the
    /// instructor in one transaction.
    ///
    /// The instructor is credited the course's effective price at
    /// confirmation time, and only when this call actually created the
    /// enrollment row. A replayed confirmation finds the row already
    /// present, credits nothing, and returns the existing enrollment.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for a missing course, or
    /// [`DbError::Postgres`] on query failure.
    pub async fn confirm_payment(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<PaymentOutcome, DbError> {
        let course = self.require_course(course_id).await?;

        let mut tx = self.pool.begin().await?;

        let id = EnrollmentId::new();
        let inserted = sqlx::query_as::<_, EnrollmentRow>(
            r"INSERT INTO enrollments (id, student_id, course_id)
              VALUES ($1, $2, $3)
              ON CONFLICT (student_id, course_id) DO NOTHING
              RETURNING id, student_id, course_id, enrolled_on",
        )
        .bind(id.into_inner())
        .bind(student_id.into_inner())
        .bind(course_id.into_inner())
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match inserted {
            Some(row) => {
                let price = course.effective_price();
                let credited = if price.is_zero() {
                    None
                } else {
                    balance_store::credit_sale(&mut *tx, course.instructor_id, course_id, price)
                        .await?;
                    Some(price)
                };
                PaymentOutcome {
                    enrollment: row.into_enrollment(),
                    credited,
                }
            }
            None => {
                let row = sqlx::query_as::<_, EnrollmentRow>(
                    r"SELECT id, student_id, course_id, enrolled_on
                      FROM enrollments
                      WHERE student_id = $1 AND course_id = $2",
                )
                .bind(student_id.into_inner())
                .bind(course_id.into_inner())
                .fetch_one(&mut *tx)
                .await?;
                PaymentOutcome {
                    enrollment: row.into_enrollment(),
                    credited: None,
                }
            }
        };

        tx.commit().await?;

        tracing::info!(
            student_id = %student_id,
            course_id = %course_id,
            credited = ?outcome.credited,
            "Confirmed payment"
        );

        Ok(outcome)
    }

    /// Look up an enrollment by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>, DbError> {
        let row = sqlx::query_as::<_, EnrollmentRow>(
            r"SELECT id, student_id, course_id, enrolled_on
              FROM enrollments
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(EnrollmentRow::into_enrollment))
    }

    /// Look up the enrollment for a (student, course) pair.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn enrollment_for(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, DbError> {
        let row = sqlx::query_as::<_, EnrollmentRow>(
            r"SELECT id, student_id, course_id, enrolled_on
              FROM enrollments
              WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id.into_inner())
        .bind(course_id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(EnrollmentRow::into_enrollment))
    }

    /// List a student's enrollments, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn enrollments_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<Enrollment>, DbError> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r"SELECT id, student_id, course_id, enrolled_on
              FROM enrollments
              WHERE student_id = $1
              ORDER BY enrolled_on DESC",
        )
        .bind(student_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(EnrollmentRow::into_enrollment).collect())
    }

    async fn require_course(&self, course_id: CourseId) -> Result<Course, DbError> {
        CatalogStore::new(self.pool)
            .course(course_id)
            .await?
            .ok_or(DbError::NotFound {
                entity: "course",
                id: course_id.into_inner(),
            })
    }

    async fn insert_enrollment(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, DbError> {
        let id = EnrollmentId::new();
        let row = sqlx::query_as::<_, EnrollmentRow>(
            r"INSERT INTO enrollments (id, student_id, course_id)
              VALUES ($1, $2, $3)
              ON CONFLICT (student_id, course_id) DO NOTHING
              RETURNING id, student_id, course_id, enrolled_on",
        )
        .bind(id.into_inner())
        .bind(student_id.into_inner())
        .bind(course_id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(EnrollmentRow::into_enrollment))
    }
}

/// A row from the `enrollments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    enrolled_on: chrono::DateTime<chrono::Utc>,
}

impl EnrollmentRow {
    fn into_enrollment(self) -> Enrollment {
        Enrollment {
            id: EnrollmentId::from(self.id),
            student_id: UserId::from(self.student_id),
            course_id: CourseId::from(self.course_id),
            enrolled_on: self.enrolled_on,
        }
    }
}
