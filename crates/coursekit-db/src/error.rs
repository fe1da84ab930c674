//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors and lifts the domain-rule failures (payment required,
//! insufficient balance) out of the core crates so callers can match on
//! them directly.

use uuid::Uuid;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up.
        entity: &'static str,
        /// The identifier that matched nothing.
        id: Uuid,
    },

    /// The account exists but does not hold the instructor role.
    #[error("Account {0} is not an instructor")]
    NotInstructor(Uuid),

    /// A stored enum value could not be decoded.
    #[error("Invalid {what} value in database: {value}")]
    InvalidEnum {
        /// The enum column being decoded.
        what: &'static str,
        /// The unrecognized stored value.
        value: String,
    },

    /// Enrollment was rejected by the gate.
    #[error(transparent)]
    Enroll(#[from] coursekit_core::EnrollError),

    /// A payout request failed validation.
    #[error(transparent)]
    Payout(#[from] coursekit_core::PayoutError),

    /// A ledger entry failed validation before it could be persisted.
    #[error(transparent)]
    Ledger(#[from] coursekit_ledger::LedgerError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
