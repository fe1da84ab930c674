//! Enrollment gate decision logic.
//!
//! The gate decides what an enroll attempt may do before any row is
//! written: free courses enroll directly, duplicate attempts resolve to
//! the existing enrollment, and paid courses are only enrollable through
//! the payment bridge. The durable uniqueness guarantee lives in the
//! store's `(student, course)` unique index; this module is the pure
//! policy in front of it.

use rust_decimal::Decimal;

use coursekit_types::Course;

/// What an enrollment attempt is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollDecision {
    /// The student is already enrolled; return the existing row
    /// unchanged. Informational, never an error.
    AlreadyEnrolled,
    /// The course is free (flagged free or zero-priced); enroll
    /// unconditionally.
    EnrollFree,
    /// The course costs money; enrollment may only be created by the
    /// payment bridge after a confirmed payment of this amount.
    RequirePayment {
        /// The effective price the student must pay.
        price: Decimal,
    },
}

/// Errors surfaced by direct enroll attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EnrollError {
    /// A paid course cannot be enrolled in outside the payment bridge.
    #[error("payment of {price} required to enroll in this course")]
    PaymentRequired {
        /// The effective course price that must be paid first.
        price: Decimal,
    },
}

/// Decide what an enroll attempt for `course` may do.
///
/// `already_enrolled` reflects whether an enrollment row already exists
/// for this (student, course) pair; duplicates short-circuit before any
/// pricing logic runs.
pub fn evaluate(course: &Course, already_enrolled: bool) -> EnrollDecision {
    if already_enrolled {
        return EnrollDecision::AlreadyEnrolled;
    }
    let price = course.effective_price();
    if price.is_zero() {
        EnrollDecision::EnrollFree
    } else {
        EnrollDecision::RequirePayment { price }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use coursekit_types::{CourseId, CourseLevel, UserId};

    use super::*;

    fn course(price: Decimal, is_free: bool) -> Course {
        Course {
            id: CourseId::new(),
            instructor_id: UserId::new(),
            title: String::from("Gate Course"),
            description: String::new(),
            category: String::from("testing"),
            level: Some(CourseLevel::Intermediate),
            thumbnail_url: None,
            cover_url: None,
            price,
            is_free,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn existing_enrollment_short_circuits() {
        let c = course(Decimal::new(5000, 2), false);
        assert_eq!(evaluate(&c, true), EnrollDecision::AlreadyEnrolled);
    }

    #[test]
    fn free_flag_enrolls_even_with_stale_price() {
        let c = course(Decimal::new(5000, 2), true);
        assert_eq!(evaluate(&c, false), EnrollDecision::EnrollFree);
    }

    #[test]
    fn zero_price_enrolls_without_free_flag() {
        let c = course(Decimal::ZERO, false);
        assert_eq!(evaluate(&c, false), EnrollDecision::EnrollFree);
    }

    #[test]
    fn paid_course_requires_payment() {
        let c = course(Decimal::new(5000, 2), false);
        assert_eq!(
            evaluate(&c, false),
            EnrollDecision::RequirePayment {
                price: Decimal::new(5000, 2)
            }
        );
    }
}
