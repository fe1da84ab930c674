//! REST API endpoint handlers for the Coursekit server.
//!
//! Handlers are thin: they parse and validate the request, call the
//! matching store, and shape the JSON response. Every domain rule lives
//! in `coursekit-core` or in the stores' transactions.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/api/accounts` | Create a user account |
//! | `GET` | `/api/instructors` | List instructor accounts |
//! | `GET` | `/api/courses` | Search the published catalog |
//! | `POST` | `/api/courses` | Create a course |
//! | `GET` | `/api/courses/:id` | Course detail with content counts |
//! | `DELETE` | `/api/courses/:id` | Delete a course (cascade) |
//! | `GET` | `/api/courses/:id/outline` | Full module/lesson tree |
//! | `POST` | `/api/courses/:id/modules` | Add a module |
//! | `POST` | `/api/modules/:id/lessons` | Add a lesson |
//! | `PATCH` | `/api/modules/:id/schedule` | Reposition / re-drip a module |
//! | `PATCH` | `/api/lessons/:id/schedule` | Reposition / re-drip a lesson |
//! | `POST` | `/api/lessons/:id/quizzes` | Attach a quiz question |
//! | `GET` | `/api/lessons/:id/quizzes` | List quiz questions |
//! | `POST` | `/api/quizzes/:id/answer` | Grade a submitted answer |
//! | `POST` | `/api/courses/:id/enroll` | Enroll (free courses only) |
//! | `POST` | `/api/payments/confirmations` | Payment bridge: enroll + credit |
//! | `GET` | `/api/students/:id/enrollments` | A student's enrollments |
//! | `GET` | `/api/courses/:id/access` | Drip-unlocked modules and lessons |
//! | `GET` | `/api/enrollments/:id/access` | The same view by enrollment id |
//! | `POST` | `/api/lessons/:id/complete` | Mark a lesson complete |
//! | `GET` | `/api/courses/:id/progress` | Completion state + certificate |
//! | `POST` | `/api/courses/:id/certificate` | Issue certificate if complete |
//! | `GET` | `/api/instructors/:id/balance` | Cached balance + audit status |
//! | `GET` | `/api/instructors/:id/ledger` | Full balance ledger |
//! | `GET` | `/api/instructors/:id/payouts` | Payout request history |
//! | `POST` | `/api/instructors/:id/payouts` | Request a payout |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use axum::Json;
use coursekit_core::{unlocked_lessons, unlocked_modules};
use coursekit_db::{
    AccountStore, BalanceStore, CatalogStore, CourseFilter, EnrollmentStore, NewCourse, NewLesson,
    ProgressStore,
};
use coursekit_ledger::audit::ProjectionStatus;
use coursekit_types::{
    CourseId, CourseLevel, EnrollmentId, LessonId, ModuleId, QuizId, Role, UserId,
};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request and query structs
// ---------------------------------------------------------------------------

/// Body for `POST /api/accounts`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Display name, unique on the platform.
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    /// Contact email address.
    #[validate(email)]
    pub email: String,
    /// Account role.
    pub role: Role,
}

/// Body for `POST /api/courses`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateCourseRequest {
    /// The authoring instructor.
    pub instructor_id: Uuid,
    /// Course title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Catalog category.
    #[serde(default)]
    pub category: String,
    /// Difficulty level.
    pub level: Option<CourseLevel>,
    /// Thumbnail image URL.
    pub thumbnail_url: Option<String>,
    /// Cover image URL.
    pub cover_url: Option<String>,
    /// Listed price.
    #[serde(default)]
    pub price: Decimal,
    /// Whether the course is free regardless of price.
    #[serde(default)]
    pub is_free: bool,
    /// Whether the course is publicly listed.
    #[serde(default)]
    pub is_published: bool,
}

/// Body for `POST /api/courses/:id/modules`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateModuleRequest {
    /// Module title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Display ordering.
    #[serde(default)]
    pub position: u32,
    /// Drip offset in days after enrollment.
    #[serde(default)]
    pub available_after_days: u32,
}

/// Body for `POST /api/modules/:id/lessons`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateLessonRequest {
    /// Lesson title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Video URL.
    pub video_url: Option<String>,
    /// Supplementary notes.
    #[serde(default)]
    pub notes: String,
    /// Display ordering.
    #[serde(default)]
    pub position: u32,
    /// Drip offset in days after enrollment.
    #[serde(default)]
    pub available_after_days: u32,
}

/// Body for the schedule PATCH endpoints.
#[derive(Debug, serde::Deserialize)]
pub struct ScheduleRequest {
    /// New display ordering.
    pub position: u32,
    /// New drip offset in days after enrollment.
    pub available_after_days: u32,
}

/// Body for `POST /api/lessons/:id/quizzes`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateQuizRequest {
    /// The question text.
    #[validate(length(min = 1))]
    pub question: String,
    /// Multiple-choice options.
    pub choices: Vec<String>,
    /// The correct answer.
    #[validate(length(min = 1))]
    pub correct_answer: String,
}

/// Body for `POST /api/quizzes/:id/answer`.
#[derive(Debug, serde::Deserialize)]
pub struct QuizAnswer {
    /// The submitted answer text.
    pub answer: String,
}

/// Body for endpoints acting on behalf of a student.
#[derive(Debug, serde::Deserialize)]
pub struct StudentRef {
    /// The acting student.
    pub student_id: Uuid,
}

/// Body for `POST /api/payments/confirmations`.
#[derive(Debug, serde::Deserialize)]
pub struct PaymentConfirmation {
    /// The paying student.
    pub student_id: Uuid,
    /// The purchased course.
    pub course_id: Uuid,
}

/// Body for `POST /api/instructors/:id/payouts`.
#[derive(Debug, serde::Deserialize)]
pub struct PayoutRequestBody {
    /// Amount to withdraw.
    pub amount: Decimal,
}

/// Query parameters for `GET /api/courses`.
#[derive(Debug, serde::Deserialize)]
pub struct CoursesQuery {
    /// Free-text search term.
    pub term: Option<String>,
    /// Category filter.
    pub category: Option<String>,
    /// Difficulty filter.
    pub level: Option<CourseLevel>,
    /// Only list free courses.
    pub free: Option<bool>,
    /// Page size (default 50, max 200).
    pub limit: Option<i64>,
    /// Page offset.
    pub offset: Option<i64>,
}

/// Query parameters for the per-student course views.
#[derive(Debug, serde::Deserialize)]
pub struct StudentQuery {
    /// The student whose view is requested.
    pub student_id: Uuid,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML status page with a live catalog count.
pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let published = CatalogStore::new(state.db.pool()).count_published().await?;

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Coursekit API</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Coursekit API</h1>
    <p class="subtitle">Drip-content access and progress engine</p>

    <p>Status: <span class="status">RUNNING</span></p>

    <div class="metric">
        <div class="label">Published courses</div>
        <div class="value">{published}</div>
    </div>

    <hr>

    <h2>Endpoints</h2>
    <ul>
        <li><a href="/api/courses">/api/courses</a> -- Search the catalog (?term=, ?category=, ?level=, ?free=)</li>
        <li>/api/courses/:id -- Course detail and content counts</li>
        <li>/api/courses/:id/outline -- Full module/lesson tree</li>
        <li>/api/courses/:id/access?student_id= -- Drip-unlocked content</li>
        <li>/api/courses/:id/progress?student_id= -- Completion state</li>
        <li>/api/instructors/:id/balance -- Balance and ledger audit</li>
    </ul>
</body>
</html>"#,
    )))
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Create a user account.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&body)?;
    let account = AccountStore::new(state.db.pool())
        .create_account(&body.username, &body.email, body.role)
        .await?;
    Ok(Json(account))
}

/// List all instructor accounts.
pub async fn list_instructors(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let instructors = AccountStore::new(state.db.pool()).list_instructors().await?;
    Ok(Json(serde_json::json!({
        "count": instructors.len(),
        "instructors": instructors,
    })))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Search the published catalog.
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoursesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = CourseFilter {
        term: params.term,
        category: params.category,
        level: params.level,
        free_only: params.free.unwrap_or(false),
        limit: params.limit.unwrap_or(50).clamp(1, 200),
        offset: params.offset.unwrap_or(0).max(0),
    };
    let courses = CatalogStore::new(state.db.pool())
        .search_courses(&filter)
        .await?;
    Ok(Json(serde_json::json!({
        "count": courses.len(),
        "courses": courses,
    })))
}

/// Create a course.
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&body)?;
    if body.price < Decimal::ZERO {
        return Err(ApiError::Validation(String::from(
            "price must not be negative",
        )));
    }
    let course = CatalogStore::new(state.db.pool())
        .create_course(&NewCourse {
            instructor_id: UserId::from(body.instructor_id),
            title: body.title,
            description: body.description,
            category: body.category,
            level: body.level,
            thumbnail_url: body.thumbnail_url,
            cover_url: body.cover_url,
            price: body.price,
            is_free: body.is_free,
            is_published: body.is_published,
        })
        .await?;
    Ok(Json(course))
}

/// Course detail with module and lesson counts.
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let course_id = CourseId::from(parse_uuid(&id_str)?);
    let store = CatalogStore::new(state.db.pool());
    let course = store
        .course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("course {course_id}")))?;
    let stats = store.course_stats(course_id).await?;
    Ok(Json(serde_json::json!({
        "course": course,
        "stats": stats,
    })))
}

/// Delete a course and its content tree.
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let course_id = CourseId::from(parse_uuid(&id_str)?);
    let deleted = CatalogStore::new(state.db.pool())
        .delete_course(course_id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("course {course_id}")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Full module/lesson tree for a course.
pub async fn get_outline(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let course_id = CourseId::from(parse_uuid(&id_str)?);
    let outline = CatalogStore::new(state.db.pool())
        .course_outline(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("course {course_id}")))?;
    Ok(Json(outline))
}

/// Add a module to a course.
pub async fn add_module(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<CreateModuleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&body)?;
    let course_id = CourseId::from(parse_uuid(&id_str)?);
    let module = CatalogStore::new(state.db.pool())
        .add_module(course_id, &body.title, body.position, body.available_after_days)
        .await?;
    Ok(Json(module))
}

/// Add a lesson to a module.
pub async fn add_lesson(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&body)?;
    let module_id = ModuleId::from(parse_uuid(&id_str)?);
    let lesson = CatalogStore::new(state.db.pool())
        .add_lesson(&NewLesson {
            module_id,
            title: body.title,
            video_url: body.video_url,
            notes: body.notes,
            position: body.position,
            available_after_days: body.available_after_days,
        })
        .await?;
    Ok(Json(lesson))
}

/// Reposition a module or change its drip offset.
pub async fn update_module_schedule(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<ScheduleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let module_id = ModuleId::from(parse_uuid(&id_str)?);
    let updated = CatalogStore::new(state.db.pool())
        .update_module_schedule(module_id, body.position, body.available_after_days)
        .await?;
    if !updated {
        return Err(ApiError::NotFound(format!("module {module_id}")));
    }
    Ok(Json(serde_json::json!({ "updated": true })))
}

/// Reposition a lesson or change its drip offset.
pub async fn update_lesson_schedule(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<ScheduleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let lesson_id = LessonId::from(parse_uuid(&id_str)?);
    let updated = CatalogStore::new(state.db.pool())
        .update_lesson_schedule(lesson_id, body.position, body.available_after_days)
        .await?;
    if !updated {
        return Err(ApiError::NotFound(format!("lesson {lesson_id}")));
    }
    Ok(Json(serde_json::json!({ "updated": true })))
}

/// Attach a quiz question to a lesson.
pub async fn add_quiz(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&body)?;
    let lesson_id = LessonId::from(parse_uuid(&id_str)?);
    let quiz = CatalogStore::new(state.db.pool())
        .add_quiz(lesson_id, &body.question, &body.choices, &body.correct_answer)
        .await?;
    Ok(Json(quiz))
}

/// Grade a submitted quiz answer.
pub async fn answer_quiz(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<QuizAnswer>,
) -> Result<impl IntoResponse, ApiError> {
    let quiz_id = QuizId::from(parse_uuid(&id_str)?);
    let quiz = CatalogStore::new(state.db.pool())
        .quiz(quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("quiz {quiz_id}")))?;
    Ok(Json(serde_json::json!({
        "quiz_id": quiz.id,
        "correct": quiz.is_correct(&body.answer),
    })))
}

/// List the quiz questions on a lesson.
pub async fn list_quizzes(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let lesson_id = LessonId::from(parse_uuid(&id_str)?);
    let quizzes = CatalogStore::new(state.db.pool())
        .quizzes_for_lesson(lesson_id)
        .await?;
    Ok(Json(serde_json::json!({
        "count": quizzes.len(),
        "quizzes": quizzes,
    })))
}

// ---------------------------------------------------------------------------
// Enrollment and payment
// ---------------------------------------------------------------------------

/// Enroll a student directly (free courses only; paid courses answer 402).
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<StudentRef>,
) -> Result<impl IntoResponse, ApiError> {
    let course_id = CourseId::from(parse_uuid(&id_str)?);
    let outcome = EnrollmentStore::new(state.db.pool())
        .enroll(UserId::from(body.student_id), course_id)
        .await?;
    Ok(Json(serde_json::json!({
        "enrollment": outcome.enrollment,
        "already_enrolled": outcome.already_enrolled,
    })))
}

/// Payment bridge: record a confirmed payment, enrolling the student and
/// crediting the instructor at most once.
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PaymentConfirmation>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = EnrollmentStore::new(state.db.pool())
        .confirm_payment(
            UserId::from(body.student_id),
            CourseId::from(body.course_id),
        )
        .await?;
    Ok(Json(serde_json::json!({
        "enrollment": outcome.enrollment,
        "credited": outcome.credited,
    })))
}

/// List a student's enrollments.
pub async fn list_enrollments(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = UserId::from(parse_uuid(&id_str)?);
    let enrollments = EnrollmentStore::new(state.db.pool())
        .enrollments_for_student(student_id)
        .await?;
    Ok(Json(serde_json::json!({
        "count": enrollments.len(),
        "enrollments": enrollments,
    })))
}

// ---------------------------------------------------------------------------
// Drip access
// ---------------------------------------------------------------------------

/// The drip-unlocked content for one enrolled student, evaluated against
/// the live schedule at request time.
pub async fn get_access(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Query(params): Query<StudentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let course_id = CourseId::from(parse_uuid(&id_str)?);
    let student_id = UserId::from(params.student_id);

    let enrollment = EnrollmentStore::new(state.db.pool())
        .enrollment_for(student_id, course_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("enrollment for student {student_id} in {course_id}"))
        })?;
    let outline = CatalogStore::new(state.db.pool())
        .course_outline(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("course {course_id}")))?;

    let now = state.clock.now();
    let modules = unlocked_modules(&outline, &enrollment, now);
    let lessons = unlocked_lessons(&outline, &enrollment, now, state.drip_policy);
    let locked: Vec<_> = outline.lesson_ids().difference(&lessons).copied().collect();

    Ok(Json(serde_json::json!({
        "enrollment_id": enrollment.id,
        "elapsed_days": coursekit_core::elapsed_days(enrollment.enrolled_on, now),
        "unlocked_modules": modules,
        "unlocked_lessons": lessons,
        "locked_lessons": locked,
    })))
}

/// The same access view, addressed by enrollment id instead of
/// (course, student). Useful when the caller holds a receipt from
/// enroll or confirm-payment and nothing else.
pub async fn get_access_by_enrollment(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment_id = EnrollmentId::from(parse_uuid(&id_str)?);

    let enrollment = EnrollmentStore::new(state.db.pool())
        .enrollment(enrollment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("enrollment {enrollment_id}")))?;
    let outline = CatalogStore::new(state.db.pool())
        .course_outline(enrollment.course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("course {}", enrollment.course_id)))?;

    let now = state.clock.now();
    let modules = unlocked_modules(&outline, &enrollment, now);
    let lessons = unlocked_lessons(&outline, &enrollment, now, state.drip_policy);
    let locked: Vec<_> = outline.lesson_ids().difference(&lessons).copied().collect();

    Ok(Json(serde_json::json!({
        "enrollment_id": enrollment.id,
        "course_id": enrollment.course_id,
        "student_id": enrollment.student_id,
        "elapsed_days": coursekit_core::elapsed_days(enrollment.enrolled_on, now),
        "unlocked_modules": modules,
        "unlocked_lessons": lessons,
        "locked_lessons": locked,
    })))
}

// ---------------------------------------------------------------------------
// Progress and certificates
// ---------------------------------------------------------------------------

/// Mark a lesson complete for a student (idempotent).
pub async fn complete_lesson(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<StudentRef>,
) -> Result<impl IntoResponse, ApiError> {
    let lesson_id = LessonId::from(parse_uuid(&id_str)?);
    let progress = ProgressStore::new(state.db.pool())
        .mark_complete(UserId::from(body.student_id), lesson_id)
        .await?;
    Ok(Json(progress))
}

/// A student's completion state for a course, plus any certificate.
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Query(params): Query<StudentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let course_id = CourseId::from(parse_uuid(&id_str)?);
    let student_id = UserId::from(params.student_id);

    let store = ProgressStore::new(state.db.pool());
    let completion = store.course_completion(student_id, course_id).await?;
    let certificate = store.certificate(student_id, course_id).await?;

    Ok(Json(serde_json::json!({
        "completion": completion,
        "certificate": certificate,
    })))
}

/// Issue a certificate if the student has completed the course.
pub async fn issue_certificate(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<StudentRef>,
) -> Result<impl IntoResponse, ApiError> {
    let course_id = CourseId::from(parse_uuid(&id_str)?);
    let certificate = ProgressStore::new(state.db.pool())
        .issue_certificate(UserId::from(body.student_id), course_id)
        .await?
        .ok_or_else(|| {
            ApiError::Validation(String::from(
                "course is not fully completed (or has no lessons)",
            ))
        })?;
    Ok(Json(certificate))
}

// ---------------------------------------------------------------------------
// Instructor balance
// ---------------------------------------------------------------------------

/// Cached balance together with a ledger replay audit.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let instructor_id = UserId::from(parse_uuid(&id_str)?);
    let store = BalanceStore::new(state.db.pool());
    let balance = store.balance(instructor_id).await?;
    let status = store.audit_balance(instructor_id).await?;
    let consistent = matches!(status, ProjectionStatus::Consistent);
    if !consistent {
        tracing::error!(instructor_id = %instructor_id, "Balance projection drift detected");
    }
    Ok(Json(serde_json::json!({
        "instructor_id": instructor_id,
        "balance": balance,
        "ledger_consistent": consistent,
    })))
}

/// Full balance ledger for an instructor, oldest first.
pub async fn get_ledger(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let instructor_id = UserId::from(parse_uuid(&id_str)?);
    let entries = BalanceStore::new(state.db.pool())
        .entries_for(instructor_id)
        .await?;
    Ok(Json(serde_json::json!({
        "count": entries.len(),
        "entries": entries,
    })))
}

/// Payout request history, newest first.
pub async fn list_payouts(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let instructor_id = UserId::from(parse_uuid(&id_str)?);
    let requests = BalanceStore::new(state.db.pool())
        .list_payout_requests(instructor_id)
        .await?;
    Ok(Json(serde_json::json!({
        "count": requests.len(),
        "payouts": requests,
    })))
}

/// Request a payout against the accumulated balance.
pub async fn request_payout(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<PayoutRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let instructor_id = UserId::from(parse_uuid(&id_str)?);
    let payout = BalanceStore::new(state.db.pool())
        .request_payout(instructor_id, body.amount)
        .await?;
    Ok(Json(payout))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a UUID from a request path, returning an [`ApiError`] on failure.
fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}

/// Run validator-derived checks, mapping failures to a 422 response.
fn validate<T: Validate>(body: &T) -> Result<(), ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))
}
