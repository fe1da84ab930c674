//! Domain rules for the Coursekit platform: drip access, progress,
//! enrollment gating, and payout validation.
//!
//! Everything in this crate is pure computation over the shared types --
//! no I/O, no storage, no HTTP. The data layer (`coursekit-db`) persists
//! what these rules decide; the API layer exposes them.
//!
//! # Modules
//!
//! - [`clock`] -- Time source abstraction and whole-day elapsed computation
//! - [`drip`] -- When enrolled students may access modules and lessons
//! - [`progress`] -- Course completion derivation from lesson completions
//! - [`enrollment`] -- The free/paid/duplicate enrollment gate decision
//! - [`payout`] -- Instructor payout amount validation
//! - [`config`] -- Typed YAML configuration with env overrides

pub mod clock;
pub mod config;
pub mod drip;
pub mod enrollment;
pub mod payout;
pub mod progress;

// Re-export primary types for convenience.
pub use clock::{Clock, FixedClock, SystemClock, elapsed_days};
pub use config::{ConfigError, PlatformConfig};
pub use drip::{DripPolicy, unlocked_lessons, unlocked_modules};
pub use enrollment::{EnrollDecision, EnrollError};
pub use payout::PayoutError;
pub use progress::{certificate_eligible, course_completion};
