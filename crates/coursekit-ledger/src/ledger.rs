//! The balance ledger: an append-only log of instructor credits and debits.
//!
//! The [`Ledger`] struct is the in-memory representation of one or more
//! instructors' balance history. It holds validated
//! [`BalanceEntry`] values, appended at construction time through the
//! [`EntryBuilder`](crate::EntryBuilder) or replayed from persisted rows,
//! and derives balances from them.
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or deleted.
//! - **Signed by type**: amounts are always positive; [`BalanceEntryType`]
//!   carries the direction.
//! - **Precision**: all amounts use [`Decimal`](rust_decimal::Decimal) --
//!   no floating point.
//! - **Unchecked at the log level**: the ledger records what happened;
//!   overdraw prevention belongs to the payout validator and the store's
//!   row lock, which run before an entry is ever built.
//!
//! [`BalanceEntryType`]: coursekit_types::BalanceEntryType

use rust_decimal::Decimal;

use coursekit_types::{BalanceEntry, UserId};

/// Reason string recorded for course sale credits.
pub const REASON_COURSE_SALE: &str = "COURSE_SALE";

/// Reason string recorded for payout debits.
pub const REASON_PAYOUT: &str = "PAYOUT";

/// The append-only log of balance movements.
///
/// Every confirmed paid enrollment appends one credit; every accepted
/// payout request appends one debit. Balances are derived, never stored
/// here.
#[derive(Debug, Default)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<BalanceEntry>,
}

impl Ledger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a validated [`BalanceEntry`] to the ledger.
    ///
    /// Entries come from the [`EntryBuilder`](crate::EntryBuilder) when
    /// recording new movements, or from persisted rows when replaying a
    /// stored ledger for an audit.
    pub fn append(&mut self, entry: BalanceEntry) {
        self.entries.push(entry);
    }

    /// Derive an instructor's balance: credits minus debits.
    ///
    /// Uses saturating arithmetic so a corrupted log can never panic the
    /// caller; drift is surfaced by the audit instead.
    pub fn instructor_balance(&self, instructor_id: UserId) -> Decimal {
        crate::audit::net_balance(instructor_id, &self.entries)
    }

    /// Return all entries for one instructor, in insertion order.
    pub fn entries_for(&self, instructor_id: UserId) -> Vec<&BalanceEntry> {
        self.entries
            .iter()
            .filter(|e| e.instructor_id == instructor_id)
            .collect()
    }

    /// Return all entries, in insertion order.
    pub fn all_entries(&self) -> &[BalanceEntry] {
        &self.entries
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coursekit_types::{BalanceEntryType, CourseId, PayoutRequestId};

    use crate::EntryBuilder;

    use super::*;

    fn sale(instructor: UserId, course: CourseId, amount: Decimal) -> BalanceEntry {
        EntryBuilder::new(BalanceEntryType::CourseSale, instructor)
            .amount(amount)
            .reason(REASON_COURSE_SALE.to_owned())
            .reference_id(course.into_inner())
            .build()
            .unwrap()
    }

    fn payout(instructor: UserId, request: PayoutRequestId, amount: Decimal) -> BalanceEntry {
        EntryBuilder::new(BalanceEntryType::Payout, instructor)
            .amount(amount)
            .reason(REASON_PAYOUT.to_owned())
            .reference_id(request.into_inner())
            .build()
            .unwrap()
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn sale_credits_the_instructor() {
        let mut ledger = Ledger::new();
        let instructor = UserId::new();

        ledger.append(sale(instructor, CourseId::new(), Decimal::new(5000, 2)));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.instructor_balance(instructor), Decimal::new(5000, 2));
    }

    #[test]
    fn payout_debits_the_instructor() {
        let mut ledger = Ledger::new();
        let instructor = UserId::new();

        ledger.append(sale(instructor, CourseId::new(), Decimal::new(10000, 2)));
        ledger.append(payout(instructor, PayoutRequestId::new(), Decimal::new(4000, 2)));

        assert_eq!(ledger.instructor_balance(instructor), Decimal::new(6000, 2));
    }

    #[test]
    fn balances_are_scoped_per_instructor() {
        let mut ledger = Ledger::new();
        let alice = UserId::new();
        let bob = UserId::new();

        ledger.append(sale(alice, CourseId::new(), Decimal::new(30, 0)));
        ledger.append(sale(bob, CourseId::new(), Decimal::new(70, 0)));

        assert_eq!(ledger.instructor_balance(alice), Decimal::new(30, 0));
        assert_eq!(ledger.instructor_balance(bob), Decimal::new(70, 0));
        assert_eq!(ledger.entries_for(alice).len(), 1);
    }

    #[test]
    fn sale_entry_references_the_course() {
        let course = CourseId::new();
        let entry = sale(UserId::new(), course, Decimal::new(25, 0));
        assert_eq!(entry.reference_id, Some(course.into_inner()));
        assert_eq!(entry.reason, REASON_COURSE_SALE);
    }

    #[test]
    fn unknown_instructor_has_zero_balance() {
        let ledger = Ledger::new();
        assert_eq!(ledger.instructor_balance(UserId::new()), Decimal::ZERO);
    }
}
