//! The frozen scan result: per-process records plus global totals.

/// Pids at or below this threshold are treated as system infrastructure and
/// excluded from the report and from the global totals.
pub const PID_INCLUDE_THRESHOLD: u32 = 650;

/// Inclusion filter applied to rendered rows and to [`GlobalTotals`]
/// membership alike.
pub fn included_in_report(pid: u32) -> bool {
    pid > PID_INCLUDE_THRESHOLD
}

/// Final counters for one process, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub contiguous: u64,
    pub non_contiguous: u64,
}

impl ProcessRecord {
    /// Number of resolved pages scanned for this process.
    pub fn total(&self) -> u64 {
        self.contiguous + self.non_contiguous
    }
}

/// Counters aggregated across all records passing the inclusion filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobalTotals {
    pub contiguous: u64,
    pub non_contiguous: u64,
}

impl GlobalTotals {
    pub fn total(&self) -> u64 {
        self.contiguous + self.non_contiguous
    }

    pub(crate) fn absorb(&mut self, record: &ProcessRecord) {
        self.contiguous += record.contiguous;
        self.non_contiguous += record.non_contiguous;
    }
}

/// Immutable point-in-time capture of one scan: records in enumeration
/// order plus the folded totals. Built exactly once at startup; every
/// report read renders this same value.
#[derive(Debug)]
pub struct Snapshot {
    records: Vec<ProcessRecord>,
    totals: GlobalTotals,
}

impl Snapshot {
    pub(crate) fn new(records: Vec<ProcessRecord>, totals: GlobalTotals) -> Self {
        Snapshot { records, totals }
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn totals(&self) -> GlobalTotals {
        self.totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_is_strictly_greater_than_threshold() {
        assert!(!included_in_report(0));
        assert!(!included_in_report(PID_INCLUDE_THRESHOLD));
        assert!(included_in_report(PID_INCLUDE_THRESHOLD + 1));
    }

    #[test]
    fn totals_absorb_record_counts() {
        let mut totals = GlobalTotals::default();
        totals.absorb(&ProcessRecord {
            pid: 700,
            name: "a".into(),
            contiguous: 3,
            non_contiguous: 1,
        });
        totals.absorb(&ProcessRecord {
            pid: 701,
            name: "b".into(),
            contiguous: 0,
            non_contiguous: 2,
        });
        assert_eq!(totals.contiguous, 3);
        assert_eq!(totals.non_contiguous, 3);
        assert_eq!(totals.total(), 6);
    }
}
