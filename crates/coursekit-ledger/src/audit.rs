//! Projection verification for the balance ledger.
//!
//! The platform keeps a cached balance per instructor so reads never
//! replay the full ledger. The cache is updated in the same database
//! transaction as every ledger append, so the two can only diverge
//! through data corruption or a future bug -- this module exists as
//! defense-in-depth to detect exactly that.
//!
//! For an instructor I the check is:
//!
//! ```text
//! cached_balance(I) == sum(credits for I) - sum(debits for I)
//! ```
//!
//! A violation produces a [`ProjectionDrift`], the platform's most
//! critical integrity alert.

use rust_decimal::Decimal;

use coursekit_types::{BalanceEntry, UserId};

use crate::Ledger;

/// The result of verifying a cached balance against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionStatus {
    /// The cached balance replays cleanly from the entries.
    Consistent,
    /// The cached balance does not match the replayed ledger.
    Drift(ProjectionDrift),
}

/// Details of a cached balance that no longer matches its ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionDrift {
    /// The instructor whose projection drifted.
    pub instructor_id: UserId,
    /// The cached balance that was presented for verification.
    pub cached: Decimal,
    /// The balance derived by replaying the ledger entries.
    pub derived: Decimal,
    /// Human-readable description of the drift.
    pub message: String,
}

impl core::fmt::Display for ProjectionDrift {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Net balance for one instructor derived from a slice of entries.
///
/// Credits add, debits subtract. Saturating arithmetic keeps a corrupted
/// log from panicking the caller; the resulting clamp will surface as
/// drift in [`verify_projection`].
pub fn net_balance(instructor_id: UserId, entries: &[BalanceEntry]) -> Decimal {
    let mut balance = Decimal::ZERO;
    for entry in entries {
        if entry.instructor_id != instructor_id {
            continue;
        }
        balance = if entry.entry_type.is_credit() {
            balance.saturating_add(entry.amount)
        } else {
            balance.saturating_sub(entry.amount)
        };
    }
    balance
}

/// Verify a cached balance against the replayed ledger for one instructor.
///
/// Returns [`ProjectionStatus::Consistent`] when the figures match, or
/// [`ProjectionStatus::Drift`] with both figures when they do not.
pub fn verify_projection(
    instructor_id: UserId,
    cached: Decimal,
    ledger: &Ledger,
) -> ProjectionStatus {
    let derived = ledger.instructor_balance(instructor_id);
    if derived == cached {
        ProjectionStatus::Consistent
    } else {
        ProjectionStatus::Drift(ProjectionDrift {
            instructor_id,
            cached,
            derived,
            message: format!(
                "balance projection drift for instructor {instructor_id}: cached {cached}, ledger replays to {derived}"
            ),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coursekit_types::{BalanceEntryType, CourseId, PayoutRequestId};

    use crate::ledger::{REASON_COURSE_SALE, REASON_PAYOUT};
    use crate::EntryBuilder;

    use super::*;

    fn sale(instructor: UserId, amount: Decimal) -> BalanceEntry {
        EntryBuilder::new(BalanceEntryType::CourseSale, instructor)
            .amount(amount)
            .reason(REASON_COURSE_SALE.to_owned())
            .reference_id(CourseId::new().into_inner())
            .build()
            .unwrap()
    }

    fn payout(instructor: UserId, amount: Decimal) -> BalanceEntry {
        EntryBuilder::new(BalanceEntryType::Payout, instructor)
            .amount(amount)
            .reason(REASON_PAYOUT.to_owned())
            .reference_id(PayoutRequestId::new().into_inner())
            .build()
            .unwrap()
    }

    #[test]
    fn matching_projection_is_consistent() {
        let mut ledger = Ledger::new();
        let instructor = UserId::new();
        ledger.append(sale(instructor, Decimal::new(100, 0)));
        ledger.append(payout(instructor, Decimal::new(40, 0)));

        let status = verify_projection(instructor, Decimal::new(60, 0), &ledger);
        assert_eq!(status, ProjectionStatus::Consistent);
    }

    #[test]
    fn stale_projection_reports_both_figures() {
        let mut ledger = Ledger::new();
        let instructor = UserId::new();
        ledger.append(sale(instructor, Decimal::new(100, 0)));

        let status = verify_projection(instructor, Decimal::new(75, 0), &ledger);
        assert!(matches!(status, ProjectionStatus::Drift(_)));
        if let ProjectionStatus::Drift(drift) = status {
            assert_eq!(drift.cached, Decimal::new(75, 0));
            assert_eq!(drift.derived, Decimal::new(100, 0));
        }
    }

    #[test]
    fn other_instructors_entries_are_ignored() {
        let mut ledger = Ledger::new();
        let alice = UserId::new();
        let bob = UserId::new();
        ledger.append(sale(alice, Decimal::new(10, 0)));
        ledger.append(sale(bob, Decimal::new(90, 0)));

        assert_eq!(net_balance(alice, ledger.all_entries()), Decimal::new(10, 0));
        let status = verify_projection(alice, Decimal::new(10, 0), &ledger);
        assert_eq!(status, ProjectionStatus::Consistent);
    }

    #[test]
    fn empty_ledger_verifies_against_zero() {
        let status = verify_projection(UserId::new(), Decimal::ZERO, &Ledger::new());
        assert_eq!(status, ProjectionStatus::Consistent);
    }
}
