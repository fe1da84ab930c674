//! Core entity structs for the Coursekit platform.
//!
//! The content hierarchy is Course -> Module -> Lesson (cascade-owned,
//! top down). Enrollments and progress records are independent join-like
//! entities referencing users and content without owning them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::enums::{BalanceEntryType, CourseLevel, Role};
use crate::ids::{
    BalanceEntryId, CertificateId, CourseId, EnrollmentId, LessonId, ModuleId, PayoutRequestId,
    ProgressId, QuizId, UserId,
};

// ---------------------------------------------------------------------------
// User account
// ---------------------------------------------------------------------------

/// A platform user, either a student or an instructor.
///
/// Instructor balances are deliberately absent here: the balance is a
/// projection of the append-only ledger, never a mutable account field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserAccount {
    /// Unique account identifier.
    pub id: UserId,
    /// Display name, unique on the platform.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Account role (student or instructor).
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Course content hierarchy
// ---------------------------------------------------------------------------

/// A published or draft course authored by an instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// The instructor who owns this course.
    pub instructor_id: UserId,
    /// Course title.
    pub title: String,
    /// Long-form course description.
    pub description: String,
    /// Free-text category used for catalog filtering.
    pub category: String,
    /// Difficulty level, if the author assigned one.
    pub level: Option<CourseLevel>,
    /// Thumbnail image URL for catalog cards.
    pub thumbnail_url: Option<String>,
    /// Cover image URL for the course detail page.
    pub cover_url: Option<String>,
    /// Listed price ([`Decimal`] for financial-grade precision).
    #[ts(as = "String")]
    pub price: Decimal,
    /// Whether the course is free regardless of the stored price.
    pub is_free: bool,
    /// Whether the course is visible in the public catalog.
    pub is_published: bool,
    /// When the course was created.
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// The price a student actually pays.
    ///
    /// A free course is free no matter what the stored price field says;
    /// a stale price on a course flipped to free must never be charged
    /// or credited.
    pub const fn effective_price(&self) -> Decimal {
        if self.is_free {
            Decimal::ZERO
        } else {
            self.price
        }
    }
}

/// A module grouping lessons within a course.
///
/// `available_after_days` is the drip offset: the module unlocks that many
/// whole days after the student's enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CourseModule {
    /// Unique module identifier.
    pub id: ModuleId,
    /// The course this module belongs to (cascade-deleted with it).
    pub course_id: CourseId,
    /// Module title.
    pub title: String,
    /// Display ordering within the course (not required to be unique).
    pub position: u32,
    /// Days after enrollment before this module unlocks (0 = immediately).
    pub available_after_days: u32,
}

/// A single lesson within a module.
///
/// A lesson carries its own drip offset, independent of its parent
/// module's. How the two combine is the resolver's policy decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: LessonId,
    /// The module this lesson belongs to (cascade-deleted with it).
    pub module_id: ModuleId,
    /// Lesson title.
    pub title: String,
    /// Video URL, if the lesson has one.
    pub video_url: Option<String>,
    /// Supplementary lesson notes (markdown or plain text).
    pub notes: String,
    /// Display ordering within the module.
    pub position: u32,
    /// Days after enrollment before this lesson unlocks (0 = immediately).
    pub available_after_days: u32,
}

/// A quiz question attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Quiz {
    /// Unique quiz identifier.
    pub id: QuizId,
    /// The lesson this quiz belongs to (cascade-deleted with it).
    pub lesson_id: LessonId,
    /// The question text.
    pub question: String,
    /// The correct answer, compared case-insensitively.
    pub correct_answer: String,
    /// The multiple-choice options presented to the student.
    pub choices: Vec<String>,
}

impl Quiz {
    /// Check a submitted answer against the stored correct answer.
    ///
    /// Comparison ignores surrounding whitespace and ASCII case.
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer
            .trim()
            .eq_ignore_ascii_case(answer.trim())
    }
}

// ---------------------------------------------------------------------------
// Course outline (read model)
// ---------------------------------------------------------------------------

/// A module together with its lessons, ordered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ModuleOutline {
    /// The module record.
    pub module: CourseModule,
    /// The module's lessons, ordered by position.
    pub lessons: Vec<Lesson>,
}

/// The full content tree of a course: every module with its lessons.
///
/// This is the read model the drip resolver operates on; it is assembled
/// by the catalog store in one pass and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CourseOutline {
    /// The course record.
    pub course: Course,
    /// All modules with their lessons, ordered by position.
    pub modules: Vec<ModuleOutline>,
}

impl CourseOutline {
    /// All lesson IDs in the course, across every module.
    pub fn lesson_ids(&self) -> BTreeSet<LessonId> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter().map(|l| l.id))
            .collect()
    }

    /// Total number of lessons in the course.
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

/// Module and lesson counts for a course detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CourseStats {
    /// The course these counts describe.
    pub course_id: CourseId,
    /// Number of modules in the course.
    pub total_modules: u64,
    /// Number of lessons across all modules.
    pub total_lessons: u64,
}

// ---------------------------------------------------------------------------
// Enrollment and progress
// ---------------------------------------------------------------------------

/// The relation granting a student ongoing access to a course.
///
/// Unique per (student, course): enrolling twice returns the original
/// row. `enrolled_on` is set once and never changes -- it anchors every
/// drip-availability computation for this student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Enrollment {
    /// Unique enrollment identifier.
    pub id: EnrollmentId,
    /// The enrolled student.
    pub student_id: UserId,
    /// The course enrolled in.
    pub course_id: CourseId,
    /// When the enrollment was created (immutable).
    pub enrolled_on: DateTime<Utc>,
}

/// A student's completion record for a single lesson.
///
/// Unique per (student, lesson). `completed_at` is stamped at the moment
/// `completed` flips true and is `None` until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LessonProgress {
    /// Unique progress record identifier.
    pub id: ProgressId,
    /// The student this record belongs to.
    pub student_id: UserId,
    /// The lesson this record tracks.
    pub lesson_id: LessonId,
    /// Whether the student has completed the lesson.
    pub completed: bool,
    /// When the lesson was completed, if it has been.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Aggregate completion state for one student in one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CourseCompletion {
    /// IDs of lessons the student has completed, restricted to lessons
    /// that currently belong to the course.
    pub completed_lesson_ids: BTreeSet<LessonId>,
    /// Number of lessons currently in the course.
    pub total_lessons: u64,
    /// Whether every current lesson is completed.
    pub all_completed: bool,
}

/// A certificate issued once a student completes every lesson in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Certificate {
    /// Unique certificate identifier.
    pub id: CertificateId,
    /// The student the certificate was issued to.
    pub student_id: UserId,
    /// The completed course.
    pub course_id: CourseId,
    /// When the certificate was generated.
    pub generated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Instructor balance ledger
// ---------------------------------------------------------------------------

/// One append-only entry in an instructor's balance ledger.
///
/// Credits record course sales; debits record payout withdrawals. The
/// amount is always strictly positive -- the entry type carries the sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BalanceEntry {
    /// Unique entry identifier.
    pub id: BalanceEntryId,
    /// Whether this entry credits or debits the balance.
    pub entry_type: BalanceEntryType,
    /// The instructor whose balance this entry affects.
    pub instructor_id: UserId,
    /// Amount moved (always positive; see `entry_type` for direction).
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Related entity: the sold course or the payout request.
    pub reference_id: Option<Uuid>,
    /// Human-readable reason (e.g. `"COURSE_SALE"`, `"PAYOUT"`).
    pub reason: String,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

/// An instructor's withdrawal request against their accumulated balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PayoutRequest {
    /// Unique payout request identifier.
    pub id: PayoutRequestId,
    /// The instructor requesting the payout.
    pub instructor_id: UserId,
    /// Amount requested (already debited from the balance).
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Whether the payout has been processed externally.
    pub processed: bool,
    /// When the request was submitted.
    pub requested_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn course(price: Decimal, is_free: bool) -> Course {
        Course {
            id: CourseId::new(),
            instructor_id: UserId::new(),
            title: String::from("Rust for Everyone"),
            description: String::from("From zero to ownership"),
            category: String::from("programming"),
            level: Some(CourseLevel::Beginner),
            thumbnail_url: None,
            cover_url: None,
            price,
            is_free,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn free_course_has_zero_effective_price() {
        let c = course(Decimal::new(4999, 2), true);
        assert_eq!(c.effective_price(), Decimal::ZERO);
    }

    #[test]
    fn paid_course_keeps_stored_price() {
        let c = course(Decimal::new(4999, 2), false);
        assert_eq!(c.effective_price(), Decimal::new(4999, 2));
    }

    #[test]
    fn quiz_answer_check_ignores_case_and_whitespace() {
        let quiz = Quiz {
            id: QuizId::new(),
            lesson_id: LessonId::new(),
            question: String::from("What keyword declares an immutable binding?"),
            correct_answer: String::from("let"),
            choices: vec![String::from("let"), String::from("mut"), String::from("var")],
        };
        assert!(quiz.is_correct("let"));
        assert!(quiz.is_correct("  LET "));
        assert!(!quiz.is_correct("mut"));
    }

    #[test]
    fn outline_collects_lesson_ids_across_modules() {
        let c = course(Decimal::ZERO, true);
        let module_a = CourseModule {
            id: ModuleId::new(),
            course_id: c.id,
            title: String::from("Basics"),
            position: 1,
            available_after_days: 0,
        };
        let module_b = CourseModule {
            id: ModuleId::new(),
            course_id: c.id,
            title: String::from("Ownership"),
            position: 2,
            available_after_days: 7,
        };
        let lesson = |module_id, position| Lesson {
            id: LessonId::new(),
            module_id,
            title: format!("Lesson {position}"),
            video_url: None,
            notes: String::new(),
            position,
            available_after_days: 0,
        };
        let outline = CourseOutline {
            course: c,
            modules: vec![
                ModuleOutline {
                    module: module_a.clone(),
                    lessons: vec![lesson(module_a.id, 1), lesson(module_a.id, 2)],
                },
                ModuleOutline {
                    module: module_b.clone(),
                    lessons: vec![lesson(module_b.id, 1)],
                },
            ],
        };
        assert_eq!(outline.total_lessons(), 3);
        assert_eq!(outline.lesson_ids().len(), 3);
    }
}
