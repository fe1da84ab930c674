//! Course catalog persistence: courses, modules, lessons, and quizzes.
//!
//! The content hierarchy is owned top-down (course -> module -> lesson ->
//! quiz) with cascade deletes, so removing a course removes its whole
//! tree. The store also assembles the [`CourseOutline`] read model the
//! drip resolver operates on, and serves the public catalog search.

use std::collections::HashMap;

use coursekit_types::{
    Course, CourseId, CourseLevel, CourseModule, CourseOutline, CourseStats, Lesson, LessonId,
    ModuleId, ModuleOutline, Quiz, QuizId, UserId,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Parameters for creating a course.
#[derive(Debug, Clone)]
pub struct NewCourse {
    /// The instructor authoring the course.
    pub instructor_id: UserId,
    /// Course title.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Free-text category for catalog filtering.
    pub category: String,
    /// Difficulty level, if assigned.
    pub level: Option<CourseLevel>,
    /// Thumbnail image URL.
    pub thumbnail_url: Option<String>,
    /// Cover image URL.
    pub cover_url: Option<String>,
    /// Listed price.
    pub price: Decimal,
    /// Whether the course is free regardless of the price field.
    pub is_free: bool,
    /// Whether the course is publicly visible.
    pub is_published: bool,
}

/// Parameters for adding a lesson to a module.
#[derive(Debug, Clone)]
pub struct NewLesson {
    /// The module the lesson belongs to.
    pub module_id: ModuleId,
    /// Lesson title.
    pub title: String,
    /// Video URL, if any.
    pub video_url: Option<String>,
    /// Supplementary notes.
    pub notes: String,
    /// Display ordering within the module.
    pub position: u32,
    /// Drip offset in days after enrollment.
    pub available_after_days: u32,
}

/// Filters for the public catalog search. All filters are optional and
/// combine with AND; [`CourseFilter::default`] lists published courses.
#[derive(Debug, Clone)]
pub struct CourseFilter {
    /// Free-text term matched against title, description, and category.
    pub term: Option<String>,
    /// Exact category match (case-insensitive).
    pub category: Option<String>,
    /// Difficulty level filter.
    pub level: Option<CourseLevel>,
    /// Only list free courses.
    pub free_only: bool,
    /// Maximum number of rows to return.
    pub limit: i64,
    /// Number of rows to skip (pagination).
    pub offset: i64,
}

impl Default for CourseFilter {
    fn default() -> Self {
        Self {
            term: None,
            category: None,
            level: None,
            free_only: false,
            limit: 50,
            offset: 0,
        }
    }
}

/// Operations on the catalog tables.
pub struct CatalogStore<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogStore<'a> {
    /// Create a new catalog store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a course.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn create_course(&self, new: &NewCourse) -> Result<Course, DbError> {
        let id = CourseId::new();
        let row = sqlx::query_as::<_, CourseRow>(
            r"INSERT INTO courses (id, instructor_id, title, description, category, level, thumbnail_url, cover_url, price, is_free, is_published)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
              RETURNING id, instructor_id, title, description, category, level, thumbnail_url, cover_url, price, is_free, is_published, created_at",
        )
        .bind(id.into_inner())
        .bind(new.instructor_id.into_inner())
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.level.map(course_level_to_db))
        .bind(&new.thumbnail_url)
        .bind(&new.cover_url)
        .bind(new.price)
        .bind(new.is_free)
        .bind(new.is_published)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(course_id = %row.id, title = %row.title, "Created course");

        row.into_course()
    }

    /// Add a module to a course.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails (including a
    /// missing parent course).
    pub async fn add_module(
        &self,
        course_id: CourseId,
        title: &str,
        position: u32,
        available_after_days: u32,
    ) -> Result<CourseModule, DbError> {
        let id = ModuleId::new();
        let row = sqlx::query_as::<_, ModuleRow>(
            r"INSERT INTO course_modules (id, course_id, title, position, available_after_days)
              VALUES ($1, $2, $3, $4, $5)
              RETURNING id, course_id, title, position, available_after_days",
        )
        .bind(id.into_inner())
        .bind(course_id.into_inner())
        .bind(title)
        .bind(int_from_u32(position))
        .bind(int_from_u32(available_after_days))
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_module())
    }

    /// Add a lesson to a module.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn add_lesson(&self, new: &NewLesson) -> Result<Lesson, DbError> {
        let id = LessonId::new();
        let row = sqlx::query_as::<_, LessonRow>(
            r"INSERT INTO lessons (id, module_id, title, video_url, notes, position, available_after_days)
              VALUES ($1, $2, $3, $4, $5, $6, $7)
              RETURNING id, module_id, title, video_url, notes, position, available_after_days",
        )
        .bind(id.into_inner())
        .bind(new.module_id.into_inner())
        .bind(&new.title)
        .bind(&new.video_url)
        .bind(&new.notes)
        .bind(int_from_u32(new.position))
        .bind(int_from_u32(new.available_after_days))
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_lesson())
    }

    /// Attach a quiz question to a lesson.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails, or
    /// [`DbError::Serialization`] if the choices cannot be encoded.
    pub async fn add_quiz(
        &self,
        lesson_id: LessonId,
        question: &str,
        choices: &[String],
        correct_answer: &str,
    ) -> Result<Quiz, DbError> {
        let id = QuizId::new();
        let choices_json = serde_json::to_value(choices)?;
        let row = sqlx::query_as::<_, QuizRow>(
            r"INSERT INTO quizzes (id, lesson_id, question, choices, correct_answer)
              VALUES ($1, $2, $3, $4, $5)
              RETURNING id, lesson_id, question, choices, correct_answer",
        )
        .bind(id.into_inner())
        .bind(lesson_id.into_inner())
        .bind(question)
        .bind(choices_json)
        .bind(correct_answer)
        .fetch_one(self.pool)
        .await?;

        row.into_quiz()
    }

    /// Update a module's position and drip offset.
    ///
    /// Changing the offset retroactively shifts availability for every
    /// enrolled student, since access is always computed from the live
    /// schedule.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn update_module_schedule(
        &self,
        module_id: ModuleId,
        position: u32,
        available_after_days: u32,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"UPDATE course_modules
              SET position = $2, available_after_days = $3
              WHERE id = $1",
        )
        .bind(module_id.into_inner())
        .bind(int_from_u32(position))
        .bind(int_from_u32(available_after_days))
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Update a lesson's position and drip offset.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn update_lesson_schedule(
        &self,
        lesson_id: LessonId,
        position: u32,
        available_after_days: u32,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"UPDATE lessons
              SET position = $2, available_after_days = $3
              WHERE id = $1",
        )
        .bind(lesson_id.into_inner())
        .bind(int_from_u32(position))
        .bind(int_from_u32(available_after_days))
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Look up a course by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn course(&self, id: CourseId) -> Result<Option<Course>, DbError> {
        let row = sqlx::query_as::<_, CourseRow>(
            r"SELECT id, instructor_id, title, description, category, level, thumbnail_url, cover_url, price, is_free, is_published, created_at
              FROM courses
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(CourseRow::into_course).transpose()
    }

    /// Look up a lesson by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn lesson(&self, id: LessonId) -> Result<Option<Lesson>, DbError> {
        let row = sqlx::query_as::<_, LessonRow>(
            r"SELECT id, module_id, title, video_url, notes, position, available_after_days
              FROM lessons
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(LessonRow::into_lesson))
    }

    /// Assemble the full content tree for a course in one pass.
    ///
    /// Modules and lessons are ordered by position. Returns `None` if
    /// the course does not exist; a course with no modules yields an
    /// outline with an empty module list.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any query fails.
    pub async fn course_outline(
        &self,
        course_id: CourseId,
    ) -> Result<Option<CourseOutline>, DbError> {
        let Some(course) = self.course(course_id).await? else {
            return Ok(None);
        };

        let module_rows = sqlx::query_as::<_, ModuleRow>(
            r"SELECT id, course_id, title, position, available_after_days
              FROM course_modules
              WHERE course_id = $1
              ORDER BY position, id",
        )
        .bind(course_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        let lesson_rows = sqlx::query_as::<_, LessonRow>(
            r"SELECT l.id, l.module_id, l.title, l.video_url, l.notes, l.position, l.available_after_days
              FROM lessons l
              JOIN course_modules m ON m.id = l.module_id
              WHERE m.course_id = $1
              ORDER BY l.position, l.id",
        )
        .bind(course_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        let mut lessons_by_module: HashMap<Uuid, Vec<Lesson>> = HashMap::new();
        for row in lesson_rows {
            lessons_by_module
                .entry(row.module_id)
                .or_default()
                .push(row.into_lesson());
        }

        let modules = module_rows
            .into_iter()
            .map(|row| {
                let lessons = lessons_by_module.remove(&row.id).unwrap_or_default();
                ModuleOutline {
                    module: row.into_module(),
                    lessons,
                }
            })
            .collect();

        Ok(Some(CourseOutline { course, modules }))
    }

    /// Module and lesson counts for a course detail page.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn course_stats(&self, course_id: CourseId) -> Result<CourseStats, DbError> {
        let row: (i64, i64) = sqlx::query_as(
            r"SELECT
                  (SELECT COUNT(*) FROM course_modules WHERE course_id = $1),
                  (SELECT COUNT(*) FROM lessons l
                   JOIN course_modules m ON m.id = l.module_id
                   WHERE m.course_id = $1)",
        )
        .bind(course_id.into_inner())
        .fetch_one(self.pool)
        .await?;

        Ok(CourseStats {
            course_id,
            total_modules: u64::try_from(row.0).unwrap_or(0),
            total_lessons: u64::try_from(row.1).unwrap_or(0),
        })
    }

    /// Number of published courses in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count_published(&self) -> Result<u64, DbError> {
        let (count,): (i64,) =
            sqlx::query_as(r"SELECT COUNT(*) FROM courses WHERE is_published")
                .fetch_one(self.pool)
                .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Search published courses with optional filters.
    ///
    /// Results are ordered newest first. Unpublished courses never
    /// appear in search results.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn search_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, DbError> {
        let term_pattern = filter.term.as_ref().map(|t| format!("%{t}%"));
        let rows = sqlx::query_as::<_, CourseRow>(
            r"SELECT id, instructor_id, title, description, category, level, thumbnail_url, cover_url, price, is_free, is_published, created_at
              FROM courses
              WHERE is_published
                AND ($1::TEXT IS NULL OR title ILIKE $1 OR description ILIKE $1 OR category ILIKE $1)
                AND ($2::TEXT IS NULL OR category ILIKE $2)
                AND ($3::TEXT IS NULL OR level = $3)
                AND (NOT $4 OR is_free)
              ORDER BY created_at DESC
              LIMIT $5 OFFSET $6",
        )
        .bind(term_pattern)
        .bind(filter.category.as_deref())
        .bind(filter.level.map(course_level_to_db))
        .bind(filter.free_only)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CourseRow::into_course).collect()
    }

    /// List the courses authored by an instructor, including drafts.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn courses_by_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<Course>, DbError> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r"SELECT id, instructor_id, title, description, category, level, thumbnail_url, cover_url, price, is_free, is_published, created_at
              FROM courses
              WHERE instructor_id = $1
              ORDER BY created_at DESC",
        )
        .bind(instructor_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CourseRow::into_course).collect()
    }

    /// Look up a quiz by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Serialization`] if stored choices cannot be decoded.
    pub async fn quiz(&self, id: QuizId) -> Result<Option<Quiz>, DbError> {
        let row = sqlx::query_as::<_, QuizRow>(
            r"SELECT id, lesson_id, question, choices, correct_answer
              FROM quizzes
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(QuizRow::into_quiz).transpose()
    }

    /// List the quizzes attached to a lesson.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Serialization`] if stored choices cannot be decoded.
    pub async fn quizzes_for_lesson(&self, lesson_id: LessonId) -> Result<Vec<Quiz>, DbError> {
        let rows = sqlx::query_as::<_, QuizRow>(
            r"SELECT id, lesson_id, question, choices, correct_answer
              FROM quizzes
              WHERE lesson_id = $1
              ORDER BY id",
        )
        .bind(lesson_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(QuizRow::into_quiz).collect()
    }

    /// Delete a course and its whole content tree (cascade).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_course(&self, id: CourseId) -> Result<bool, DbError> {
        let result = sqlx::query(r"DELETE FROM courses WHERE id = $1")
            .bind(id.into_inner())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// A row from the `courses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    instructor_id: Uuid,
    title: String,
    description: String,
    category: String,
    level: Option<String>,
    thumbnail_url: Option<String>,
    cover_url: Option<String>,
    price: Decimal,
    is_free: bool,
    is_published: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl CourseRow {
    fn into_course(self) -> Result<Course, DbError> {
        Ok(Course {
            id: CourseId::from(self.id),
            instructor_id: UserId::from(self.instructor_id),
            title: self.title,
            description: self.description,
            category: self.category,
            level: self.level.as_deref().map(course_level_from_db).transpose()?,
            thumbnail_url: self.thumbnail_url,
            cover_url: self.cover_url,
            price: self.price,
            is_free: self.is_free,
            is_published: self.is_published,
            created_at: self.created_at,
        })
    }
}

/// A row from the `course_modules` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ModuleRow {
    id: Uuid,
    course_id: Uuid,
    title: String,
    position: i32,
    available_after_days: i32,
}

impl ModuleRow {
    fn into_module(self) -> CourseModule {
        CourseModule {
            id: ModuleId::from(self.id),
            course_id: CourseId::from(self.course_id),
            title: self.title,
            position: u32_from_int(self.position),
            available_after_days: u32_from_int(self.available_after_days),
        }
    }
}

/// A row from the `lessons` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct LessonRow {
    id: Uuid,
    module_id: Uuid,
    title: String,
    video_url: Option<String>,
    notes: String,
    position: i32,
    available_after_days: i32,
}

impl LessonRow {
    fn into_lesson(self) -> Lesson {
        Lesson {
            id: LessonId::from(self.id),
            module_id: ModuleId::from(self.module_id),
            title: self.title,
            video_url: self.video_url,
            notes: self.notes,
            position: u32_from_int(self.position),
            available_after_days: u32_from_int(self.available_after_days),
        }
    }
}

/// A row from the `quizzes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct QuizRow {
    id: Uuid,
    lesson_id: Uuid,
    question: String,
    choices: serde_json::Value,
    correct_answer: String,
}

impl QuizRow {
    fn into_quiz(self) -> Result<Quiz, DbError> {
        Ok(Quiz {
            id: QuizId::from(self.id),
            lesson_id: LessonId::from(self.lesson_id),
            question: self.question,
            correct_answer: self.correct_answer,
            choices: serde_json::from_value(self.choices)?,
        })
    }
}

/// Convert a [`CourseLevel`] to its database string.
pub(crate) const fn course_level_to_db(level: CourseLevel) -> &'static str {
    match level {
        CourseLevel::Beginner => "beginner",
        CourseLevel::Intermediate => "intermediate",
        CourseLevel::Advanced => "advanced",
    }
}

/// Parse a stored `level` string back into a [`CourseLevel`].
pub(crate) fn course_level_from_db(value: &str) -> Result<CourseLevel, DbError> {
    match value {
        "beginner" => Ok(CourseLevel::Beginner),
        "intermediate" => Ok(CourseLevel::Intermediate),
        "advanced" => Ok(CourseLevel::Advanced),
        other => Err(DbError::InvalidEnum {
            what: "level",
            value: other.to_owned(),
        }),
    }
}

/// Bind a `u32` schedule field as a `PostgreSQL` INT.
pub(crate) fn int_from_u32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Read a `PostgreSQL` INT back as a `u32` (CHECK constraints keep
/// stored values non-negative).
pub(crate) fn u32_from_int(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_level_roundtrips_through_db_strings() {
        for level in [
            CourseLevel::Beginner,
            CourseLevel::Intermediate,
            CourseLevel::Advanced,
        ] {
            let parsed = course_level_from_db(course_level_to_db(level));
            assert!(matches!(parsed, Ok(l) if l == level));
        }
    }

    #[test]
    fn unknown_level_string_is_rejected() {
        assert!(matches!(
            course_level_from_db("expert"),
            Err(DbError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn schedule_int_conversions_clamp() {
        assert_eq!(int_from_u32(7), 7);
        assert_eq!(int_from_u32(u32::MAX), i32::MAX);
        assert_eq!(u32_from_int(7), 7);
        assert_eq!(u32_from_int(-1), 0);
    }

    #[test]
    fn default_filter_lists_first_page() {
        let filter = CourseFilter::default();
        assert!(filter.term.is_none());
        assert!(!filter.free_only);
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
    }
}
