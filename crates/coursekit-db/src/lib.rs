//! Data layer for the Coursekit platform (`PostgreSQL`).
//!
//! `PostgreSQL` is the single source of truth: accounts, the course
//! catalog, enrollments, lesson progress, certificates, and the
//! instructor balance ledger all live here. Stores are thin handles
//! bound to a shared [`sqlx::PgPool`]; every invariant that must hold
//! under concurrency (enrollment uniqueness, at-most-once sale credit,
//! no payout overdraw) is enforced by a database constraint or a
//! transaction in this crate, never by application-level locking.
//!
//! # Architecture
//!
//! ```text
//! HTTP handlers
//!     |
//!     +-- AccountStore     (user accounts, role checks)
//!     +-- CatalogStore     (courses, modules, lessons, quizzes)
//!     +-- EnrollmentStore  (enroll, payment confirmation bridge)
//!     +-- ProgressStore    (lesson completion, certificates)
//!     +-- BalanceStore     (ledger, projection, payouts)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`account_store`] -- User account persistence
//! - [`catalog_store`] -- Course content tree and catalog search
//! - [`enrollment_store`] -- Enrollment and payment confirmation
//! - [`progress_store`] -- Lesson progress and certificates
//! - [`balance_store`] -- Balance ledger, projection, and payouts
//! - [`error`] -- Shared error types

pub mod account_store;
pub mod balance_store;
pub mod catalog_store;
pub mod enrollment_store;
pub mod error;
pub mod postgres;
pub mod progress_store;

// Re-export primary types for convenience.
pub use account_store::AccountStore;
pub use balance_store::BalanceStore;
pub use catalog_store::{CatalogStore, CourseFilter, NewCourse, NewLesson};
pub use enrollment_store::{EnrollOutcome, EnrollmentStore, PaymentOutcome};
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use progress_store::ProgressStore;
