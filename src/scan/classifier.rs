//! Contiguity classification of resolved frames in walk order.

use crate::paging::{PhysFrame, Translation};

/// What happens to the contiguity baseline when the walk crosses into a new
/// region. A gap in virtual address space strongly suggests a gap in
/// physical backing, so [`BoundaryPolicy::Reset`] is the default; `Carry`
/// keeps the previous frame across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    Reset,
    Carry,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy::Reset
    }
}

/// Per-process classifier state. Feed it every walked page's translation;
/// unresolved pages are skipped entirely and leave the baseline untouched.
#[derive(Debug)]
pub struct ContiguityClassifier {
    policy: BoundaryPolicy,
    previous: Option<PhysFrame>,
    last_region: Option<usize>,
    contiguous: u64,
    non_contiguous: u64,
}

impl ContiguityClassifier {
    pub fn new(policy: BoundaryPolicy) -> Self {
        ContiguityClassifier {
            policy,
            previous: None,
            last_region: None,
            contiguous: 0,
            non_contiguous: 0,
        }
    }

    /// Classifies the translation of one walked page. `region` is the
    /// ordinal the walker attached to the page.
    pub fn observe(&mut self, region: usize, translation: Translation) {
        if self.policy == BoundaryPolicy::Reset && self.last_region != Some(region) {
            self.previous = None;
        }
        self.last_region = Some(region);

        let frame = match translation {
            Translation::Frame(frame) => frame,
            Translation::Unresolved => return,
        };
        match self.previous {
            Some(prev) if prev.precedes(frame) => self.contiguous += 1,
            // First resolved frame of the process (or of the region under
            // the Reset policy) has no baseline and counts as non-contiguous.
            _ => self.non_contiguous += 1,
        }
        self.previous = Some(frame);
    }

    pub fn contiguous(&self) -> u64 {
        self.contiguous
    }

    pub fn non_contiguous(&self) -> u64 {
        self.non_contiguous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::PAGE_SIZE;

    fn frame(n: u64) -> Translation {
        Translation::Frame(PhysFrame::new(n * PAGE_SIZE))
    }

    fn counts(policy: BoundaryPolicy, steps: &[(usize, Translation)]) -> (u64, u64) {
        let mut classifier = ContiguityClassifier::new(policy);
        for &(region, translation) in steps {
            classifier.observe(region, translation);
        }
        (classifier.contiguous(), classifier.non_contiguous())
    }

    #[test]
    fn adjacent_run_counts_all_but_first() {
        let steps = [(0, frame(10)), (0, frame(11)), (0, frame(12)), (0, frame(13))];
        assert_eq!(counts(BoundaryPolicy::Reset, &steps), (3, 1));
    }

    #[test]
    fn scattered_frames_are_all_non_contiguous() {
        let steps = [(0, frame(10)), (0, frame(110)), (0, frame(15))];
        assert_eq!(counts(BoundaryPolicy::Reset, &steps), (0, 3));
    }

    #[test]
    fn unresolved_pages_do_not_touch_the_baseline() {
        let steps = [
            (0, Translation::Unresolved),
            (0, frame(20)),
            (0, frame(21)),
        ];
        assert_eq!(counts(BoundaryPolicy::Reset, &steps), (1, 1));

        // A hole between two adjacent frames keeps them adjacent.
        let steps = [(0, frame(20)), (0, Translation::Unresolved), (0, frame(21))];
        assert_eq!(counts(BoundaryPolicy::Reset, &steps), (1, 1));
    }

    #[test]
    fn reset_policy_clears_baseline_at_region_boundary() {
        let steps = [(0, frame(10)), (1, frame(11))];
        assert_eq!(counts(BoundaryPolicy::Reset, &steps), (0, 2));
    }

    #[test]
    fn carry_policy_keeps_baseline_across_regions() {
        let steps = [(0, frame(10)), (1, frame(11))];
        assert_eq!(counts(BoundaryPolicy::Carry, &steps), (1, 1));
    }

    #[test]
    fn no_observations_means_zero_counts() {
        assert_eq!(counts(BoundaryPolicy::Reset, &[]), (0, 0));
    }
}
