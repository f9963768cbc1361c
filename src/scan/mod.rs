//! The one-shot fragmentation scan.
//!
//! Runs the walker -> translator -> classifier pipeline over every process a
//! source enumerates and freezes the result into a [`Snapshot`]. The scan is
//! single-threaded, synchronous, and runs exactly once per process lifetime;
//! a source failure aborts the whole scan rather than publishing a partial
//! snapshot.

pub mod classifier;
pub mod walker;

use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use crate::paging::translate;
use crate::snapshot::{included_in_report, GlobalTotals, ProcessRecord, Snapshot};
use crate::source::{ProcessSource, SourceError};

pub use classifier::{BoundaryPolicy, ContiguityClassifier};
pub use walker::{AddressSpaceWalker, WalkedPage};

/// Fatal scan failure. Per-page translation misses and rootless processes
/// are normal results and never surface here.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("process source failed: {0}")]
    Source(#[from] SourceError),
}

/// Scans every process the source enumerates and returns the frozen
/// snapshot.
pub fn run_scan<S: ProcessSource>(source: &S, policy: BoundaryPolicy) -> Result<Snapshot, ScanError> {
    let start = Instant::now();
    let processes = source.processes()?;

    let mut records = Vec::with_capacity(processes.len());
    let mut totals = GlobalTotals::default();

    for process in processes {
        let mut classifier = ContiguityClassifier::new(policy);
        if let Some(space) = &process.address_space {
            for walked in AddressSpaceWalker::new(&process.regions) {
                classifier.observe(walked.region, translate(space, walked.page));
            }
        }

        let record = ProcessRecord {
            pid: process.pid,
            name: process.name,
            contiguous: classifier.contiguous(),
            non_contiguous: classifier.non_contiguous(),
        };
        debug!(
            "Scanned process {} ({}): {} contiguous, {} non-contiguous",
            record.pid, record.name, record.contiguous, record.non_contiguous
        );
        if included_in_report(record.pid) {
            totals.absorb(&record);
        }
        records.push(record);
    }

    info!(
        "Scan completed: {} processes, {} contiguous / {} non-contiguous pages in report, {:.2}ms",
        records.len(),
        totals.contiguous,
        totals.non_contiguous,
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(Snapshot::new(records, totals))
}
