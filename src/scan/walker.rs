//! Lazy walk over a process's mapped virtual pages.

use crate::paging::{VirtPage, PAGE_SIZE};
use crate::source::MemoryRegion;

/// One step of the walk: a page address plus the ordinal of the region it
/// came from, so the classifier can see region boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkedPage {
    pub page: VirtPage,
    pub region: usize,
}

/// Finite, one-shot iterator over every page of every region, regions in
/// list order, pages ascending within a region. Empty regions contribute
/// nothing; an empty region list yields an empty walk.
pub struct AddressSpaceWalker<'a> {
    regions: &'a [MemoryRegion],
    region: usize,
    next_addr: u64,
}

impl<'a> AddressSpaceWalker<'a> {
    pub fn new(regions: &'a [MemoryRegion]) -> Self {
        AddressSpaceWalker {
            regions,
            region: 0,
            next_addr: regions.first().map_or(0, |r| r.start),
        }
    }
}

impl Iterator for AddressSpaceWalker<'_> {
    type Item = WalkedPage;

    fn next(&mut self) -> Option<WalkedPage> {
        loop {
            let region = self.regions.get(self.region)?;
            if self.next_addr < region.end {
                let page = VirtPage::containing(self.next_addr);
                self.next_addr += PAGE_SIZE;
                return Some(WalkedPage {
                    page,
                    region: self.region,
                });
            }
            self.region += 1;
            if let Some(next) = self.regions.get(self.region) {
                self.next_addr = next.start;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(regions: &[MemoryRegion]) -> Vec<(u64, usize)> {
        AddressSpaceWalker::new(regions)
            .map(|w| (w.page.addr(), w.region))
            .collect()
    }

    #[test]
    fn walks_pages_of_one_region() {
        let regions = [MemoryRegion::new(0x1000, 0x4000)];
        assert_eq!(
            addrs(&regions),
            vec![(0x1000, 0), (0x2000, 0), (0x3000, 0)]
        );
    }

    #[test]
    fn walks_regions_in_order_with_ordinals() {
        let regions = [
            MemoryRegion::new(0x1000, 0x3000),
            MemoryRegion::new(0x10000, 0x11000),
        ];
        assert_eq!(
            addrs(&regions),
            vec![(0x1000, 0), (0x2000, 0), (0x10000, 1)]
        );
    }

    #[test]
    fn empty_region_list_yields_nothing() {
        assert!(addrs(&[]).is_empty());
    }

    #[test]
    fn zero_length_region_is_skipped() {
        let regions = [
            MemoryRegion::new(0x1000, 0x1000),
            MemoryRegion::new(0x2000, 0x3000),
        ];
        assert_eq!(addrs(&regions), vec![(0x2000, 1)]);
    }
}
