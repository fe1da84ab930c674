//! Shared application state for the Coursekit API server.
//!
//! [`AppState`] holds the `PostgreSQL` pool every handler reads through,
//! the platform-wide drip policy, and the time source drip evaluation
//! reads from. Stores are constructed per request from the pool; they
//! are cheap handles with no state of their own.

use std::sync::Arc;

use coursekit_core::{Clock, DripPolicy, SystemClock};
use coursekit_db::PostgresPool;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool to `PostgreSQL`.
    pub db: PostgresPool,
    /// How module and lesson drip offsets combine.
    pub drip_policy: DripPolicy,
    /// Time source for drip evaluation. [`SystemClock`] in production;
    /// tests pin an instant to make unlock boundaries deterministic.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create application state with the default drip policy.
    pub fn new(db: PostgresPool) -> Self {
        Self::with_policy(db, DripPolicy::default())
    }

    /// Create application state with an explicit drip policy.
    pub fn with_policy(db: PostgresPool, drip_policy: DripPolicy) -> Self {
        Self {
            db,
            drip_policy,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source, keeping the pool and policy.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
