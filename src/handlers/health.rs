//! Health check endpoint handler.
//!
//! Returns reporter status plus a few scan statistics as plain text. The
//! scan runs once at startup, so health never flips after a successful
//! start; the endpoint exists for probes and humans.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let uptime_seconds = state.start_time.elapsed().as_secs();
    let uptime_hours = uptime_seconds as f64 / SECONDS_PER_HOUR;
    let uptime_str = if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    };

    let totals = state.snapshot.totals();
    let mut body = String::new();
    writeln!(body, "OK").ok();
    writeln!(body).ok();
    writeln!(body, "Uptime: {}", uptime_str).ok();
    writeln!(body, "Processes scanned: {}", state.snapshot.records().len()).ok();
    writeln!(body, "Contiguous pages (report): {}", totals.contiguous).ok();
    writeln!(
        body,
        "Non-contiguous pages (report): {}",
        totals.non_contiguous
    )
    .ok();

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        body,
    )
}
