//! procfrag core library.
//!
//! A read-only diagnostic for physical-memory fragmentation: for every
//! active process it walks the mapped virtual pages, translates each page to
//! its backing physical frame through a four-level lookup, and classifies
//! consecutive resolved frames as physically contiguous or not. The result
//! is frozen into a [`snapshot::Snapshot`] built exactly once and rendered
//! on demand by [`report::render_report`].
//!
//! The binary in `main.rs` wires this pipeline to the live `/proc` tree and
//! serves the report over HTTP; the library itself is host-agnostic behind
//! the [`source::ProcessSource`] trait.

pub mod paging;
pub mod report;
pub mod scan;
pub mod snapshot;
pub mod source;

// Re-export the pipeline entry points for convenience
pub use report::render_report;
pub use scan::{run_scan, BoundaryPolicy, ScanError};
pub use snapshot::Snapshot;
pub use source::{ProcessSource, ProcfsSource, SyntheticSource};
