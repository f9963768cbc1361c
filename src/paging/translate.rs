//! Virtual-to-physical translation over a captured address space.
//!
//! The lookup is a small state machine: each of the four stages inspects one
//! entry and either descends with the next table handle, produces the leaf
//! frame, or aborts. An abort is a normal negative result — the page is
//! simply not resolved — never an error.

use super::{AddressSpace, Level, PhysFrame, TableHandle, Translation, VirtPage};

/// Outcome of inspecting one entry during the walk.
enum Step {
    Descend(TableHandle),
    Resolved(PhysFrame),
    Abort,
}

fn inspect(space: &AddressSpace, handle: TableHandle, page: VirtPage, level: Level) -> Step {
    // The table borrow is scoped to this single stage; nothing is held
    // across pages or iterations.
    let entry = match space.entry(handle, page.index(level)) {
        Some(entry) => entry,
        None => return Step::Abort,
    };
    if !entry.is_present() || entry.is_huge() {
        return Step::Abort;
    }
    match level {
        Level::Leaf => Step::Resolved(entry.frame()),
        _ => Step::Descend(entry.next_table()),
    }
}

/// Resolves one page-aligned virtual address to its backing physical frame,
/// walking top -> upper -> middle -> leaf. Read-only.
pub fn translate(space: &AddressSpace, page: VirtPage) -> Translation {
    let mut handle = space.root();
    for level in Level::ALL {
        match inspect(space, handle, page, level) {
            Step::Descend(next) => handle = next,
            Step::Resolved(frame) => return Translation::Frame(frame),
            Step::Abort => return Translation::Unresolved,
        }
    }
    // Level::ALL ends on Leaf, which never descends.
    Translation::Unresolved
}
