//! Four-level paging model used by the fragmentation scan.
//!
//! An [`AddressSpace`] is a point-in-time capture of one process's page
//! mappings, stored as the classic four-level radix tree: 512 entries per
//! table, 9 index bits per level, 4 KiB pages. [`translate`] walks that tree
//! from the root to a leaf and reports the backing physical frame, or
//! `Unresolved` when any stage cannot descend.

pub mod tables;
pub mod translate;

pub use tables::{AddressSpace, Entry, TableHandle};
pub use translate::translate;

/// Page size in bytes. The scan only deals in base pages.
pub const PAGE_SIZE: u64 = 4096;

/// log2 of [`PAGE_SIZE`].
pub const PAGE_SHIFT: u32 = 12;

/// Entries per table at every level.
pub const ENTRIES_PER_TABLE: usize = 512;

const INDEX_BITS: u32 = 9;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// The four lookup stages, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Top,
    Upper,
    Middle,
    Leaf,
}

impl Level {
    /// Walk order of the four stages.
    pub const ALL: [Level; 4] = [Level::Top, Level::Upper, Level::Middle, Level::Leaf];

    fn shift(self) -> u32 {
        match self {
            Level::Top => PAGE_SHIFT + 3 * INDEX_BITS,
            Level::Upper => PAGE_SHIFT + 2 * INDEX_BITS,
            Level::Middle => PAGE_SHIFT + INDEX_BITS,
            Level::Leaf => PAGE_SHIFT,
        }
    }
}

/// A page-aligned virtual address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtPage(u64);

impl VirtPage {
    /// Wraps a virtual address, truncating to page alignment.
    pub fn containing(addr: u64) -> Self {
        VirtPage(addr & !(PAGE_SIZE - 1))
    }

    pub fn addr(self) -> u64 {
        self.0
    }

    /// Table index selected by this address at the given level.
    pub fn index(self, level: Level) -> usize {
        ((self.0 >> level.shift()) & INDEX_MASK) as usize
    }
}

/// A page-aligned physical frame address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysFrame(u64);

impl PhysFrame {
    /// Wraps a frame address. Callers guarantee page alignment; leaf entries
    /// store the address masked, so a constructed frame is always aligned.
    pub fn new(addr: u64) -> Self {
        debug_assert_eq!(addr % PAGE_SIZE, 0, "frame address must be page aligned");
        PhysFrame(addr)
    }

    /// Frame backing the given page frame number.
    pub fn from_pfn(pfn: u64) -> Self {
        PhysFrame(pfn << PAGE_SHIFT)
    }

    pub fn addr(self) -> u64 {
        self.0
    }

    /// True when `next` is the frame immediately after `self` in physical
    /// memory.
    pub fn precedes(self, next: PhysFrame) -> bool {
        next.0 == self.0 + PAGE_SIZE
    }
}

/// Outcome of translating one virtual page. Never a bare nullable: an
/// unmapped page is a normal negative result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    Frame(PhysFrame),
    Unresolved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virt_page_truncates_to_alignment() {
        assert_eq!(VirtPage::containing(0x1234).addr(), 0x1000);
        assert_eq!(VirtPage::containing(0x1000).addr(), 0x1000);
    }

    #[test]
    fn level_indices_cover_48_bit_addresses() {
        let page = VirtPage::containing(0x0000_7fff_ffff_f000);
        assert_eq!(page.index(Level::Top), 255);
        assert_eq!(page.index(Level::Upper), 511);
        assert_eq!(page.index(Level::Middle), 511);
        assert_eq!(page.index(Level::Leaf), 511);
    }

    #[test]
    fn frame_adjacency() {
        let a = PhysFrame::new(0x8000);
        assert!(a.precedes(PhysFrame::new(0x9000)));
        assert!(!a.precedes(PhysFrame::new(0xa000)));
        assert!(!a.precedes(a));
        assert!(!PhysFrame::new(0x9000).precedes(a));
    }

    #[test]
    fn frame_from_pfn() {
        assert_eq!(PhysFrame::from_pfn(3).addr(), 3 * PAGE_SIZE);
    }
}
