//! HTTP endpoint handlers for the reporter.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/proc_report`: the frozen fragmentation report (text)
//! - `/health`: health check endpoint
//! - `/`: landing page

pub mod health;
pub mod report;
pub mod root;

// Re-export handlers
pub use health::health_handler;
pub use report::report_handler;
pub use root::root_handler;
