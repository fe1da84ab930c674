//! Axum router construction for the Coursekit API.
//!
//! Assembles all REST routes into a single [`Router`] with CORS
//! middleware enabled for cross-origin frontend access.

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the Coursekit server.
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Accounts
        .route("/api/accounts", post(handlers::create_account))
        .route("/api/instructors", get(handlers::list_instructors))
        // Catalog
        .route(
            "/api/courses",
            get(handlers::list_courses).post(handlers::create_course),
        )
        .route(
            "/api/courses/{id}",
            get(handlers::get_course).delete(handlers::delete_course),
        )
        .route("/api/courses/{id}/outline", get(handlers::get_outline))
        .route("/api/courses/{id}/modules", post(handlers::add_module))
        .route("/api/modules/{id}/lessons", post(handlers::add_lesson))
        .route(
            "/api/modules/{id}/schedule",
            patch(handlers::update_module_schedule),
        )
        .route(
            "/api/lessons/{id}/schedule",
            patch(handlers::update_lesson_schedule),
        )
        .route(
            "/api/lessons/{id}/quizzes",
            get(handlers::list_quizzes).post(handlers::add_quiz),
        )
        .route("/api/quizzes/{id}/answer", post(handlers::answer_quiz))
        // Enrollment and payment
        .route("/api/courses/{id}/enroll", post(handlers::enroll))
        .route(
            "/api/payments/confirmations",
            post(handlers::confirm_payment),
        )
        .route(
            "/api/students/{id}/enrollments",
            get(handlers::list_enrollments),
        )
        // Drip access
        .route("/api/courses/{id}/access", get(handlers::get_access))
        .route(
            "/api/enrollments/{id}/access",
            get(handlers::get_access_by_enrollment),
        )
        // Progress
        .route("/api/lessons/{id}/complete", post(handlers::complete_lesson))
        .route("/api/courses/{id}/progress", get(handlers::get_progress))
        .route(
            "/api/courses/{id}/certificate",
            post(handlers::issue_certificate),
        )
        // Instructor balance
        .route("/api/instructors/{id}/balance", get(handlers::get_balance))
        .route("/api/instructors/{id}/ledger", get(handlers::get_ledger))
        .route(
            "/api/instructors/{id}/payouts",
            get(handlers::list_payouts).post(handlers::request_payout),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
