//! Shared type definitions for the Coursekit course platform.
//!
//! This crate is the single source of truth for all types used across the
//! Coursekit workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the web dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (roles, course levels, ledger entry types)
//! - [`structs`] -- Core entity structs (courses, enrollments, progress, ledger)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BalanceEntryType, CourseLevel, Role};
pub use ids::{
    BalanceEntryId, CertificateId, CourseId, EnrollmentId, LessonId, ModuleId, PayoutRequestId,
    ProgressId, QuizId, UserId,
};
pub use structs::{
    BalanceEntry, Certificate, Course, CourseCompletion, CourseModule, CourseOutline, CourseStats,
    Enrollment, Lesson, LessonProgress, ModuleOutline, PayoutRequest, Quiz, UserAccount,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::CourseId::export_all();
        let _ = crate::ids::ModuleId::export_all();
        let _ = crate::ids::LessonId::export_all();
        let _ = crate::ids::EnrollmentId::export_all();

        // Enums
        let _ = crate::enums::Role::export_all();
        let _ = crate::enums::CourseLevel::export_all();
        let _ = crate::enums::BalanceEntryType::export_all();

        // Entities
        let _ = crate::structs::Course::export_all();
        let _ = crate::structs::CourseOutline::export_all();
        let _ = crate::structs::Enrollment::export_all();
        let _ = crate::structs::LessonProgress::export_all();
        let _ = crate::structs::CourseCompletion::export_all();
        let _ = crate::structs::BalanceEntry::export_all();
        let _ = crate::structs::PayoutRequest::export_all();
    }
}
