//! Time source abstraction and elapsed-day computation.
//!
//! Every drip-availability decision reduces to one number: how many whole
//! days have passed between a student's enrollment and "now". The clock is
//! injected so the same resolver code runs against wall-clock time in
//! production and a pinned instant in tests.
//!
//! # Design Principles
//!
//! - Elapsed days are truncated, never rounded: day 3 begins exactly 72
//!   hours after enrollment, not at 60.
//! - Negative elapsed time (clock skew, an enrollment stamped slightly in
//!   the future) floors to 0 instead of failing.
//! - All conversions use checked arithmetic.

use chrono::{DateTime, Utc};

/// A source of the current time.
///
/// Production code uses [`SystemClock`]; tests pin time with
/// [`FixedClock`] to make drip boundaries deterministic.
pub trait Clock: Send + Sync {
    /// Return the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, for tests and replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock that always reports the given instant.
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Move the pinned instant forward (or backward) by a duration.
    #[must_use]
    pub fn advanced_by(self, delta: chrono::Duration) -> Self {
        Self {
            instant: self
                .instant
                .checked_add_signed(delta)
                .unwrap_or(self.instant),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Whole days elapsed between `enrolled_on` and `now`, truncated.
///
/// The duration is floored to complete 24-hour periods: 2 days and 23
/// hours is still 2 elapsed days. A `now` earlier than `enrolled_on`
/// yields 0 rather than an error, so clock skew can never lock a student
/// out of day-0 content.
pub fn elapsed_days(enrolled_on: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let days = now.signed_duration_since(enrolled_on).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn enrollment_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn same_instant_is_day_zero() {
        let t = enrollment_instant();
        assert_eq!(elapsed_days(t, t), 0);
    }

    #[test]
    fn partial_day_truncates() {
        let t = enrollment_instant();
        let now = t + Duration::hours(23) + Duration::minutes(59);
        assert_eq!(elapsed_days(t, now), 0);
    }

    #[test]
    fn exact_day_boundary_counts() {
        let t = enrollment_instant();
        assert_eq!(elapsed_days(t, t + Duration::days(1)), 1);
        assert_eq!(elapsed_days(t, t + Duration::days(3) + Duration::seconds(1)), 3);
    }

    #[test]
    fn two_days_and_change_is_still_two() {
        let t = enrollment_instant();
        let now = t + Duration::days(2) + Duration::hours(23);
        assert_eq!(elapsed_days(t, now), 2);
    }

    #[test]
    fn negative_elapsed_floors_to_zero() {
        let t = enrollment_instant();
        let skewed_now = t - Duration::hours(5);
        assert_eq!(elapsed_days(t, skewed_now), 0);
    }

    #[test]
    fn fixed_clock_reports_pinned_instant() {
        let clock = FixedClock::new(enrollment_instant());
        assert_eq!(clock.now(), enrollment_instant());

        let advanced = clock.advanced_by(Duration::days(3));
        assert_eq!(
            elapsed_days(enrollment_instant(), advanced.now()),
            3
        );
    }
}
