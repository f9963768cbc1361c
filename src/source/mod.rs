//! Process sources: where the scan gets its processes from.
//!
//! A source enumerates the active processes at one point in time, handing
//! the scan a pid, a display name, an optional captured address space, and
//! the ordered list of mapped regions. The live backend reads `/proc`; the
//! synthetic backend fabricates populations for demos and tests.

pub mod procfs;
pub mod synthetic;

use crate::paging::{AddressSpace, PAGE_SIZE};
use thiserror::Error;

pub use procfs::ProcfsSource;
pub use synthetic::SyntheticSource;

/// One mapped virtual region: `[start, end)`, both page aligned. Regions for
/// a process are ordered ascending and non-overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: u64,
    pub end: u64,
}

impl MemoryRegion {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "region must not be inverted");
        debug_assert_eq!(start % PAGE_SIZE, 0, "region start must be page aligned");
        debug_assert_eq!(end % PAGE_SIZE, 0, "region end must be page aligned");
        MemoryRegion { start, end }
    }

    pub fn page_count(&self) -> u64 {
        (self.end - self.start) / PAGE_SIZE
    }
}

/// One enumerated process as seen by the scan.
///
/// `address_space` is `None` for processes without an address-space root
/// (kernel threads, processes whose tables could not be captured); they
/// still get a zero-count record.
#[derive(Clone)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub address_space: Option<AddressSpace>,
    pub regions: Vec<MemoryRegion>,
}

/// Failure while enumerating processes. Fatal for the scan: a partial
/// snapshot is never published.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read process directory {path}: {source}")]
    ProcDir {
        path: String,
        source: std::io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Point-in-time process enumeration. Iterated exactly once per scan, in
/// enumeration order.
pub trait ProcessSource {
    fn processes(&self) -> Result<Vec<ProcessInfo>, SourceError>;
}
