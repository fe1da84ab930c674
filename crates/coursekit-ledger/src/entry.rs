//! Entry builders and validation for the balance ledger.
//!
//! Provides an [`EntryBuilder`] that enforces the ledger's invariants at
//! construction time: every entry names an instructor, carries a strictly
//! positive amount, and records a human-readable reason. Invalid entries
//! never reach the log.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use coursekit_types::{BalanceEntry, BalanceEntryId, BalanceEntryType, UserId};

use crate::LedgerError;

/// Builder for constructing validated [`BalanceEntry`] values.
///
/// # Examples
///
/// ```
/// use coursekit_ledger::EntryBuilder;
/// use coursekit_types::{BalanceEntryType, UserId};
/// use rust_decimal::Decimal;
///
/// let entry = EntryBuilder::new(BalanceEntryType::CourseSale, UserId::new())
///     .amount(Decimal::new(5000, 2))
///     .reason("COURSE_SALE".to_owned())
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct EntryBuilder {
    entry_type: BalanceEntryType,
    instructor_id: UserId,
    amount: Option<Decimal>,
    reason: Option<String>,
    reference_id: Option<Uuid>,
}

impl EntryBuilder {
    /// Start building a ledger entry of the given type for an instructor.
    pub const fn new(entry_type: BalanceEntryType, instructor_id: UserId) -> Self {
        Self {
            entry_type,
            instructor_id,
            amount: None,
            reason: None,
            reference_id: None,
        }
    }

    /// Set the amount moved by this entry (must be strictly positive).
    #[must_use]
    pub const fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the human-readable reason for the entry.
    #[must_use]
    pub fn reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Set an optional reference ID linking to the sold course or the
    /// payout request.
    #[must_use]
    pub const fn reference_id(mut self, id: Uuid) -> Self {
        self.reference_id = Some(id);
        self
    }

    /// Validate the builder's fields and produce a [`BalanceEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingField`] if the amount or reason was
    /// never set, or [`LedgerError::NonPositiveAmount`] if the amount is
    /// zero or negative.
    pub fn build(self) -> Result<BalanceEntry, LedgerError> {
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount { amount });
        }
        let reason = self.reason.ok_or(LedgerError::MissingField("reason"))?;

        Ok(BalanceEntry {
            id: BalanceEntryId::new(),
            entry_type: self.entry_type,
            instructor_id: self.instructor_id,
            amount,
            reference_id: self.reference_id,
            reason,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_valid_credit_entry() {
        let instructor = UserId::new();
        let entry = EntryBuilder::new(BalanceEntryType::CourseSale, instructor)
            .amount(Decimal::new(5000, 2))
            .reason(String::from("COURSE_SALE"))
            .build()
            .unwrap();

        assert_eq!(entry.instructor_id, instructor);
        assert_eq!(entry.entry_type, BalanceEntryType::CourseSale);
        assert_eq!(entry.amount, Decimal::new(5000, 2));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let result = EntryBuilder::new(BalanceEntryType::Payout, UserId::new())
            .amount(Decimal::ZERO)
            .reason(String::from("PAYOUT"))
            .build();
        assert!(matches!(
            result,
            Err(LedgerError::NonPositiveAmount { .. })
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let result = EntryBuilder::new(BalanceEntryType::Payout, UserId::new())
            .amount(Decimal::new(-1, 0))
            .reason(String::from("PAYOUT"))
            .build();
        assert!(matches!(
            result,
            Err(LedgerError::NonPositiveAmount { .. })
        ));
    }

    #[test]
    fn missing_amount_is_rejected() {
        let result = EntryBuilder::new(BalanceEntryType::CourseSale, UserId::new())
            .reason(String::from("COURSE_SALE"))
            .build();
        assert!(matches!(result, Err(LedgerError::MissingField("amount"))));
    }

    #[test]
    fn missing_reason_is_rejected() {
        let result = EntryBuilder::new(BalanceEntryType::CourseSale, UserId::new())
            .amount(Decimal::new(10, 0))
            .build();
        assert!(matches!(result, Err(LedgerError::MissingField("reason"))));
    }
}
