//! The /proc_report endpoint handler.
//!
//! Serves the fragmentation report rendered from the frozen snapshot. Reads
//! never trigger a new scan, so repeated requests return byte-identical
//! bodies.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use procfrag::render_report;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the /proc_report endpoint.
#[instrument(skip(state))]
pub async fn report_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /proc_report request");

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        render_report(&state.snapshot),
    )
}
