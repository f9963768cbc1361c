//! Integration tests for the scan pipeline.
//!
//! These exercise the walker -> translator -> classifier path end to end
//! over synthetic process populations and check the counting invariants.

use procfrag::paging::{translate, Translation, PAGE_SIZE};
use procfrag::scan::{run_scan, AddressSpaceWalker, BoundaryPolicy};
use procfrag::snapshot::included_in_report;
use procfrag::source::synthetic::SyntheticProcess;
use procfrag::source::{ProcessSource, SyntheticSource};

const BASE_VADDR: u64 = 0x5555_0000_0000;
const BASE_FRAME: u64 = 0x10_0000;

fn single(process: SyntheticProcess) -> SyntheticSource {
    SyntheticSource::from_processes(vec![process.build()])
}

#[test]
fn four_adjacent_frames_count_three_contiguous() {
    let source = single(
        SyntheticProcess::new(700, "adjacent")
            .region(BASE_VADDR, 4)
            .map_linear(BASE_VADDR, BASE_FRAME, 4),
    );
    let snapshot = run_scan(&source, BoundaryPolicy::Reset).unwrap();
    let record = &snapshot.records()[0];
    assert_eq!(record.contiguous, 3);
    assert_eq!(record.non_contiguous, 1);
    assert_eq!(record.total(), 4);
}

#[test]
fn scattered_frames_count_all_non_contiguous() {
    let source = single(
        SyntheticProcess::new(700, "scattered")
            .region(BASE_VADDR, 3)
            .map(BASE_VADDR, BASE_FRAME)
            .map(BASE_VADDR + PAGE_SIZE, BASE_FRAME + 100 * PAGE_SIZE)
            .map(BASE_VADDR + 2 * PAGE_SIZE, BASE_FRAME + 5 * PAGE_SIZE),
    );
    let snapshot = run_scan(&source, BoundaryPolicy::Reset).unwrap();
    let record = &snapshot.records()[0];
    assert_eq!(record.contiguous, 0);
    assert_eq!(record.non_contiguous, 3);
}

#[test]
fn process_with_zero_regions_counts_nothing() {
    let source = single(SyntheticProcess::new(700, "empty"));
    let snapshot = run_scan(&source, BoundaryPolicy::Reset).unwrap();
    let record = &snapshot.records()[0];
    assert_eq!((record.contiguous, record.non_contiguous), (0, 0));
}

#[test]
fn leading_unresolved_page_contributes_nothing() {
    // First page of the region unmapped, next two adjacent: the first
    // resolved page is the baseline, the second is contiguous with it.
    let source = single(
        SyntheticProcess::new(700, "hole")
            .region(BASE_VADDR, 3)
            .map_linear(BASE_VADDR + PAGE_SIZE, BASE_FRAME, 2),
    );
    let snapshot = run_scan(&source, BoundaryPolicy::Reset).unwrap();
    let record = &snapshot.records()[0];
    assert_eq!(record.contiguous, 1);
    assert_eq!(record.non_contiguous, 1);
}

#[test]
fn boundary_policy_decides_cross_region_adjacency() {
    // Two regions whose frames happen to be physically consecutive.
    let build = || {
        SyntheticProcess::new(700, "tworegions")
            .region(BASE_VADDR, 2)
            .map_linear(BASE_VADDR, BASE_FRAME, 2)
            .region(BASE_VADDR + 0x10_0000, 1)
            .map(BASE_VADDR + 0x10_0000, BASE_FRAME + 2 * PAGE_SIZE)
    };

    let reset = run_scan(&single(build()), BoundaryPolicy::Reset).unwrap();
    assert_eq!(reset.records()[0].contiguous, 1);
    assert_eq!(reset.records()[0].non_contiguous, 2);

    let carry = run_scan(&single(build()), BoundaryPolicy::Carry).unwrap();
    assert_eq!(carry.records()[0].contiguous, 2);
    assert_eq!(carry.records()[0].non_contiguous, 1);
}

#[test]
fn per_process_total_equals_resolved_page_count() {
    let source = SyntheticSource::generate(24, 1234);
    let snapshot = run_scan(&source, BoundaryPolicy::Reset).unwrap();
    let processes = source.processes().unwrap();

    for (process, record) in processes.iter().zip(snapshot.records()) {
        let resolved = match &process.address_space {
            Some(space) => AddressSpaceWalker::new(&process.regions)
                .filter(|w| translate(space, w.page) != Translation::Unresolved)
                .count() as u64,
            None => 0,
        };
        assert_eq!(
            record.total(),
            resolved,
            "process {} ({})",
            record.pid,
            record.name
        );
    }
}

#[test]
fn global_totals_equal_filtered_record_sums() {
    let source = SyntheticSource::generate(40, 99);
    let snapshot = run_scan(&source, BoundaryPolicy::Reset).unwrap();

    let (mut contiguous, mut non_contiguous) = (0u64, 0u64);
    for record in snapshot
        .records()
        .iter()
        .filter(|r| included_in_report(r.pid))
    {
        contiguous += record.contiguous;
        non_contiguous += record.non_contiguous;
    }
    assert_eq!(snapshot.totals().contiguous, contiguous);
    assert_eq!(snapshot.totals().non_contiguous, non_contiguous);
}

#[test]
fn threshold_pid_is_excluded_from_totals() {
    let source = SyntheticSource::from_processes(vec![
        SyntheticProcess::new(650, "at-threshold")
            .region(BASE_VADDR, 2)
            .map_linear(BASE_VADDR, BASE_FRAME, 2)
            .build(),
        SyntheticProcess::new(651, "above-threshold")
            .region(BASE_VADDR, 2)
            .map_linear(BASE_VADDR, BASE_FRAME, 2)
            .build(),
    ]);
    let snapshot = run_scan(&source, BoundaryPolicy::Reset).unwrap();

    // Both processes get records, only the second feeds the totals.
    assert_eq!(snapshot.records().len(), 2);
    assert_eq!(snapshot.records()[0].total(), 2);
    assert_eq!(snapshot.totals().contiguous, 1);
    assert_eq!(snapshot.totals().non_contiguous, 1);
}
