//! Table storage for captured address spaces.
//!
//! Tables live in an owned arena inside [`AddressSpace`]; directory entries
//! reference the next level by arena handle instead of by raw pointer, so a
//! dangling reference shows up as a failed handle lookup rather than an
//! invalid dereference.

use super::{Level, PhysFrame, VirtPage, ENTRIES_PER_TABLE, PAGE_SHIFT};

const PRESENT: u64 = 1 << 0;
/// Large-mapping bit. Huge pages are out of scope for the scan; an entry
/// carrying this bit aborts the walk as unresolved.
const HUGE: u64 = 1 << 7;
const ADDR_MASK: u64 = 0x000f_ffff_ffff_f000;

/// One 64-bit table entry: a present bit, a huge bit, and an address field
/// holding either the next table's handle (directory entry) or the physical
/// frame address (leaf entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Entry(u64);

impl Entry {
    /// The absent entry.
    pub const NONE: Entry = Entry(0);

    /// Directory entry pointing at the table with the given handle.
    pub fn directory(next: TableHandle) -> Self {
        Entry(PRESENT | ((next.0 as u64) << PAGE_SHIFT))
    }

    /// Leaf entry mapping a physical frame.
    pub fn leaf(frame: PhysFrame) -> Self {
        Entry(PRESENT | (frame.addr() & ADDR_MASK))
    }

    /// Raw constructor, for exercising malformed shapes in tests.
    #[cfg(test)]
    pub fn from_raw(raw: u64) -> Self {
        Entry(raw)
    }

    pub fn is_present(self) -> bool {
        self.0 & PRESENT != 0
    }

    pub fn is_huge(self) -> bool {
        self.0 & HUGE != 0
    }

    /// Handle of the next-level table. Meaningful only for directory entries.
    pub fn next_table(self) -> TableHandle {
        TableHandle((self.address() >> PAGE_SHIFT) as usize)
    }

    /// Frame mapped by this leaf entry. The mask keeps it page aligned.
    pub fn frame(self) -> PhysFrame {
        PhysFrame::new(self.address())
    }

    fn address(self) -> u64 {
        self.0 & ADDR_MASK
    }
}

/// Opaque reference to a table inside one address space's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHandle(pub(crate) usize);

/// One table of 512 entries. Boxed so an `AddressSpace` move stays cheap.
#[derive(Clone)]
struct Table {
    entries: Box<[Entry; ENTRIES_PER_TABLE]>,
}

impl Table {
    fn empty() -> Self {
        Table {
            entries: Box::new([Entry::NONE; ENTRIES_PER_TABLE]),
        }
    }
}

/// Point-in-time capture of one process's page mappings as a four-level
/// radix tree. Built once by a process source, then read-only for the walk.
#[derive(Clone)]
pub struct AddressSpace {
    tables: Vec<Table>,
}

impl AddressSpace {
    /// New address space with an empty root table.
    pub fn new() -> Self {
        AddressSpace {
            tables: vec![Table::empty()],
        }
    }

    /// Handle of the root (top-level) table.
    pub fn root(&self) -> TableHandle {
        TableHandle(0)
    }

    /// Entry at `index` in the table behind `handle`. `None` when the handle
    /// does not reference a table in this arena — a malformed directory
    /// entry, treated by the translator as unresolved.
    pub fn entry(&self, handle: TableHandle, index: usize) -> Option<Entry> {
        let table = self.tables.get(handle.0)?;
        table.entries.get(index).copied()
    }

    /// Maps `page` to `frame`, allocating intermediate tables as needed.
    /// Used by process sources while building the capture; the scan itself
    /// never mutates an address space.
    pub fn map(&mut self, page: VirtPage, frame: PhysFrame) {
        let mut handle = self.root();
        for level in [Level::Top, Level::Upper, Level::Middle] {
            let index = page.index(level);
            let entry = self.tables[handle.0].entries[index];
            handle = if entry.is_present() {
                entry.next_table()
            } else {
                let next = self.push_table();
                self.tables[handle.0].entries[index] = Entry::directory(next);
                next
            };
        }
        self.tables[handle.0].entries[page.index(Level::Leaf)] = Entry::leaf(frame);
    }

    /// Number of tables in the arena, root included.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn push_table(&mut self) -> TableHandle {
        self.tables.push(Table::empty());
        TableHandle(self.tables.len() - 1)
    }

    /// Overwrites a single entry, for building malformed shapes in tests.
    #[cfg(test)]
    pub(crate) fn set_entry(&mut self, handle: TableHandle, index: usize, entry: Entry) {
        self.tables[handle.0].entries[index] = entry;
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}
