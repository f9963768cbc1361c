//! Application state shared across HTTP handlers.
//!
//! The snapshot inside the state is frozen before the server starts and is
//! never replaced: every report read renders the same scan result.

use procfrag::Snapshot;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    /// The one frozen scan result.
    pub snapshot: Arc<Snapshot>,
    pub config: Arc<Config>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
