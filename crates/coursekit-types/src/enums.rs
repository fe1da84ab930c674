//! Enumeration types for the Coursekit platform.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Account role
// ---------------------------------------------------------------------------

/// The role of a user account.
///
/// A role is a sum type, not a boolean flag: every operation that cares
/// about the role matches on the variant, so the compiler flags any code
/// path that forgot to handle one of them. Students enroll and complete
/// lessons; instructors author courses and accrue a sale balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Consumes courses: enrolls, watches lessons, earns certificates.
    Student,
    /// Authors courses and receives sale credits in the balance ledger.
    Instructor,
}

// ---------------------------------------------------------------------------
// Course level
// ---------------------------------------------------------------------------

/// Difficulty level of a course, used for catalog filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CourseLevel {
    /// No prior knowledge assumed.
    Beginner,
    /// Builds on beginner material.
    Intermediate,
    /// Assumes substantial prior knowledge.
    Advanced,
}

// ---------------------------------------------------------------------------
// Balance ledger entry type
// ---------------------------------------------------------------------------

/// The category of a balance ledger entry.
///
/// The ledger is an append-only log of movements on instructor
/// balances: sales credit, payouts debit. An instructor's balance is the
/// sum of credits minus the sum of debits -- never a mutable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BalanceEntryType {
    /// Credit: a confirmed paid enrollment transfers the course price
    /// to the instructor.
    CourseSale,
    /// Debit: the instructor withdraws part of their balance via a
    /// payout request.
    Payout,
}

impl BalanceEntryType {
    /// Returns `true` if this entry type increases the instructor balance.
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::CourseSale)
    }

    /// Returns `true` if this entry type decreases the instructor balance.
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::Payout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_types_partition_into_credit_and_debit() {
        assert!(BalanceEntryType::CourseSale.is_credit());
        assert!(!BalanceEntryType::CourseSale.is_debit());
        assert!(BalanceEntryType::Payout.is_debit());
        assert!(!BalanceEntryType::Payout.is_credit());
    }

    #[test]
    fn role_serde_roundtrip() {
        let json = serde_json::to_string(&Role::Instructor).ok();
        assert_eq!(json.as_deref(), Some("\"Instructor\""));
        let restored: Result<Role, _> = serde_json::from_str("\"Student\"");
        assert_eq!(restored.ok(), Some(Role::Student));
    }
}
