//! REST API server for the Coursekit platform.
//!
//! This crate provides an Axum HTTP server exposing the platform's
//! operations:
//!
//! - **Catalog** endpoints for authoring and searching courses, modules,
//!   lessons, and quizzes
//! - **Enrollment** endpoints, including the payment confirmation bridge
//!   that enrolls a student and credits the instructor atomically
//! - **Drip access** endpoint resolving which content a student has
//!   unlocked at request time
//! - **Progress** endpoints for lesson completion and certificates
//! - **Balance** endpoints for the instructor ledger and payout requests
//!
//! # Architecture
//!
//! Handlers are stateless: each request constructs the store it needs
//! from the shared pool in [`AppState`] and returns JSON. Every concurrency-sensitive rule (enrollment uniqueness,
//! at-most-once crediting, payout overdraw) is enforced inside the
//! `coursekit-db` transactions, so two racing requests can never observe
//! a half-applied state through this API.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
