//! Append-only balance ledger for instructor earnings.
//!
//! Every movement of money on the platform -- a course sale crediting an
//! instructor, a payout request debiting them -- is recorded as an
//! immutable [`BalanceEntry`](coursekit_types::BalanceEntry). An
//! instructor's balance is never a mutable field: it is the net of their
//! entries, with a cached projection that must always replay to the same
//! figure.
//!
//! # Architecture
//!
//! The ledger crate provides three modules:
//!
//! - [`ledger`] -- The [`Ledger`] struct: the append-only log and derived balances.
//! - [`entry`] -- The [`EntryBuilder`] for validated entry construction.
//! - [`audit`] -- Projection verification against the replayed ledger.
//!
//! # Projection Invariant
//!
//! For every instructor I at any point in time:
//!
//! ```text
//! cached_balance(I) == sum(credits for I) - sum(debits for I)
//! ```
//!
//! A violation produces a [`ProjectionDrift`](audit::ProjectionDrift) --
//! the platform's most critical integrity alert. The ledger never
//! panics; it returns errors.
//!
//! # Usage
//!
//! ```
//! use coursekit_ledger::{EntryBuilder, Ledger};
//! use coursekit_ledger::audit::ProjectionStatus;
//! use coursekit_ledger::ledger::{REASON_COURSE_SALE, REASON_PAYOUT};
//! use coursekit_types::{BalanceEntryType, CourseId, PayoutRequestId, UserId};
//! use rust_decimal::Decimal;
//!
//! # fn main() -> Result<(), coursekit_ledger::LedgerError> {
//! let mut ledger = Ledger::new();
//! let instructor = UserId::new();
//!
//! // A student buys the instructor's 50.00 course.
//! ledger.append(
//!     EntryBuilder::new(BalanceEntryType::CourseSale, instructor)
//!         .amount(Decimal::new(5000, 2))
//!         .reason(REASON_COURSE_SALE.to_owned())
//!         .reference_id(CourseId::new().into_inner())
//!         .build()?,
//! );
//!
//! // The instructor withdraws 20.00.
//! ledger.append(
//!     EntryBuilder::new(BalanceEntryType::Payout, instructor)
//!         .amount(Decimal::new(2000, 2))
//!         .reason(REASON_PAYOUT.to_owned())
//!         .reference_id(PayoutRequestId::new().into_inner())
//!         .build()?,
//! );
//!
//! assert_eq!(ledger.instructor_balance(instructor), Decimal::new(3000, 2));
//!
//! // A cached projection of 30.00 replays cleanly.
//! let status = coursekit_ledger::audit::verify_projection(
//!     instructor,
//!     Decimal::new(3000, 2),
//!     &ledger,
//! );
//! assert_eq!(status, ProjectionStatus::Consistent);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod entry;
pub mod ledger;

// Re-export primary types at crate root.
pub use audit::ProjectionStatus;
pub use entry::EntryBuilder;
pub use ledger::Ledger;

use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording ledger entries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amounts must be strictly positive; the entry type carries the sign.
    #[error("ledger entry amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The invalid amount.
        amount: Decimal,
    },

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
