//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity on the platform has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) for efficient database indexing.
//!
//! Rows created by the application always carry an app-generated v7 value;
//! the `gen_random_uuid()` column defaults only cover rows inserted directly
//! in SQL (seeds, fixtures).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a user account (student or instructor).
    UserId
}

define_id! {
    /// Unique identifier for a course.
    CourseId
}

define_id! {
    /// Unique identifier for a module within a course.
    ModuleId
}

define_id! {
    /// Unique identifier for a lesson within a module.
    LessonId
}

define_id! {
    /// Unique identifier for a quiz attached to a lesson.
    QuizId
}

define_id! {
    /// Unique identifier for an enrollment (student <-> course relation).
    EnrollmentId
}

define_id! {
    /// Unique identifier for a per-lesson progress record.
    ProgressId
}

define_id! {
    /// Unique identifier for a course completion certificate.
    CertificateId
}

define_id! {
    /// Unique identifier for an instructor payout request.
    PayoutRequestId
}

define_id! {
    /// Unique identifier for a balance ledger entry (credit or debit).
    BalanceEntryId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let student = UserId::new();
        let course = CourseId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(student.into_inner(), Uuid::nil());
        assert_ne!(course.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = LessonId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<LessonId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = EnrollmentId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
