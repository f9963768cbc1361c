//! Text rendering of a frozen snapshot.
//!
//! Rendering is a pure function of the snapshot: repeated renders are
//! byte-identical, and no render ever triggers a new scan.

use std::fmt::Write as FmtWrite;

use crate::snapshot::{included_in_report, Snapshot};

/// Renders the snapshot as the CSV-style process report:
///
/// ```text
/// PROCESS REPORT:
/// proc_id,proc_name,contig_pages,noncontig_pages,total_pages
/// <pid>,<name>,<contig>,<noncontig>,<total>
/// ...
/// ,,<globalContig>,<globalNoncontig>,<globalTotal>
/// ```
pub fn render_report(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    out.push_str("PROCESS REPORT:\n");
    out.push_str("proc_id,proc_name,contig_pages,noncontig_pages,total_pages\n");

    for record in snapshot
        .records()
        .iter()
        .filter(|r| included_in_report(r.pid))
    {
        writeln!(
            out,
            "{},{},{},{},{}",
            record.pid,
            record.name,
            record.contiguous,
            record.non_contiguous,
            record.total()
        )
        .ok();
    }

    let totals = snapshot.totals();
    writeln!(
        out,
        ",,{},{},{}",
        totals.contiguous,
        totals.non_contiguous,
        totals.total()
    )
    .ok();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{GlobalTotals, ProcessRecord, Snapshot};

    fn record(pid: u32, name: &str, contiguous: u64, non_contiguous: u64) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.into(),
            contiguous,
            non_contiguous,
        }
    }

    #[test]
    fn renders_filtered_rows_and_totals() {
        let snapshot = Snapshot::new(
            vec![
                record(1, "init", 9, 9),
                record(700, "nginx", 3, 1),
                record(800, "redis", 0, 2),
            ],
            GlobalTotals {
                contiguous: 3,
                non_contiguous: 3,
            },
        );
        let report = render_report(&snapshot);
        assert_eq!(
            report,
            "PROCESS REPORT:\n\
             proc_id,proc_name,contig_pages,noncontig_pages,total_pages\n\
             700,nginx,3,1,4\n\
             800,redis,0,2,2\n\
             ,,3,3,6\n"
        );
    }

    #[test]
    fn empty_snapshot_still_has_header_and_totals_row() {
        let snapshot = Snapshot::new(Vec::new(), GlobalTotals::default());
        let report = render_report(&snapshot);
        assert_eq!(
            report,
            "PROCESS REPORT:\n\
             proc_id,proc_name,contig_pages,noncontig_pages,total_pages\n\
             ,,0,0,0\n"
        );
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let snapshot = Snapshot::new(
            vec![record(700, "nginx", 3, 1)],
            GlobalTotals {
                contiguous: 3,
                non_contiguous: 1,
            },
        );
        assert_eq!(render_report(&snapshot), render_report(&snapshot));
    }
}
