//! Live process source backed by the /proc filesystem.
//!
//! Enumeration reads the numeric directories under the proc root; per
//! process, the display name comes from `comm` (falling back to `cmdline`),
//! the region list from `maps`, and the address-space capture from
//! `pagemap`. A process whose maps or pagemap cannot be read is enumerated
//! without an address-space root and ends up with a zero-count record.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::paging::{AddressSpace, PhysFrame, VirtPage, PAGE_SHIFT, PAGE_SIZE};
use crate::source::{MemoryRegion, ProcessInfo, ProcessSource, SourceError};

const PAGEMAP_ENTRY_SIZE: usize = 8;
const PAGEMAP_CHUNK_ENTRIES: usize = 1024;
// Pagemap entry layout: PFN in bits 0-54, present flag in bit 63.
const PFN_MASK: u64 = 0x7f_ffff_ffff_ffff;
const PRESENT_MASK: u64 = 1 << 63;

/// Process source reading the live /proc tree. `with_root` points it at a
/// fake tree for tests.
pub struct ProcfsSource {
    root: PathBuf,
}

impl ProcfsSource {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        ProcfsSource { root: root.into() }
    }
}

impl Default for ProcfsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for ProcfsSource {
    fn processes(&self) -> Result<Vec<ProcessInfo>, SourceError> {
        let entries = fs::read_dir(&self.root).map_err(|source| SourceError::ProcDir {
            path: self.root.display().to_string(),
            source,
        })?;

        let mut pids: Vec<(u32, PathBuf)> = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let name = match path.file_name().and_then(|s| s.to_str()) {
                Some(v) => v,
                None => continue,
            };
            if !name.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let pid: u32 = match name.parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            pids.push((pid, path));
        }
        // Directory order is filesystem-dependent; pin enumeration order.
        pids.sort_by_key(|(pid, _)| *pid);

        let mut out = Vec::with_capacity(pids.len());
        for (pid, path) in pids {
            let name = match read_process_name(&path) {
                Some(name) => name,
                // Process likely exited between readdir and here.
                None => continue,
            };
            let (regions, address_space) = match read_address_space(&path) {
                Some(captured) => captured,
                None => {
                    debug!("Process {} ({}): no address-space root", pid, name);
                    (Vec::new(), None)
                }
            };
            out.push(ProcessInfo {
                pid,
                name,
                address_space,
                regions,
            });
        }
        Ok(out)
    }
}

/// Reads the process name from comm, falling back to cmdline.
fn read_process_name(proc_path: &Path) -> Option<String> {
    if let Ok(s) = fs::read_to_string(proc_path.join("comm")) {
        let t = s.trim();
        if !t.is_empty() {
            return Some(t.into());
        }
    }

    let content = fs::read(proc_path.join("cmdline")).ok()?;
    let first = content.split(|&b| b == 0u8).next()?;
    let arg0 = std::str::from_utf8(first).ok()?;
    if arg0.is_empty() {
        return None;
    }
    Path::new(arg0)
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// Captures regions and page mappings for one process. `None` when maps is
/// unreadable or empty (kernel threads) or pagemap cannot be opened.
fn read_address_space(proc_path: &Path) -> Option<(Vec<MemoryRegion>, Option<AddressSpace>)> {
    let maps = fs::read_to_string(proc_path.join("maps")).ok()?;
    let regions: Vec<MemoryRegion> = maps.lines().filter_map(parse_maps_line).collect();
    if regions.is_empty() {
        return None;
    }

    let mut pagemap = File::open(proc_path.join("pagemap")).ok()?;
    match capture_mappings(&mut pagemap, &regions) {
        Ok(space) => Some((regions, Some(space))),
        Err(e) => {
            debug!("pagemap read failed for {}: {}", proc_path.display(), e);
            None
        }
    }
}

/// Parses one maps line: `start-end perms offset dev inode [path]`.
/// Addresses in maps are page aligned already.
fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
    let range = line.split_whitespace().next()?;
    let (start, end) = range.split_once('-')?;
    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;
    if start >= end || start % PAGE_SIZE != 0 || end % PAGE_SIZE != 0 {
        return None;
    }
    Some(MemoryRegion::new(start, end))
}

/// Reads pagemap entries for every region and records the present pages.
/// Entries are read in chunks; reaching EOF inside a region (addresses past
/// the pagemap range) just ends that region's capture.
fn capture_mappings(pagemap: &mut File, regions: &[MemoryRegion]) -> io::Result<AddressSpace> {
    let mut space = AddressSpace::new();
    let mut buffer = [0u8; PAGEMAP_CHUNK_ENTRIES * PAGEMAP_ENTRY_SIZE];

    for region in regions {
        let mut page_index = region.start / PAGE_SIZE;
        pagemap.seek(SeekFrom::Start(page_index * PAGEMAP_ENTRY_SIZE as u64))?;

        let mut remaining = region.page_count();
        while remaining > 0 {
            let chunk = remaining.min(PAGEMAP_CHUNK_ENTRIES as u64) as usize;
            let bytes = chunk * PAGEMAP_ENTRY_SIZE;

            // Fill as much of the chunk as the file still has; a short read
            // means the region extends past the pagemap range.
            let mut filled = 0;
            while filled < bytes {
                let n = pagemap.read(&mut buffer[filled..bytes])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            let complete = filled / PAGEMAP_ENTRY_SIZE;

            for i in 0..complete {
                let raw = u64::from_ne_bytes(
                    buffer[i * PAGEMAP_ENTRY_SIZE..(i + 1) * PAGEMAP_ENTRY_SIZE]
                        .try_into()
                        .expect("chunk slice is exactly eight bytes"),
                );
                let pfn = raw & PFN_MASK;
                if raw & PRESENT_MASK != 0 && pfn != 0 {
                    space.map(
                        VirtPage::containing(page_index << PAGE_SHIFT),
                        PhysFrame::from_pfn(pfn),
                    );
                }
                page_index += 1;
            }
            if complete < chunk {
                break;
            }
            remaining -= chunk as u64;
        }
    }
    Ok(space)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_maps_line_with_path() {
        let line = "7f1a2b400000-7f1a2b403000 r-xp 00000000 08:01 393232 /usr/lib/libc.so";
        let region = parse_maps_line(line).unwrap();
        assert_eq!(region.start, 0x7f1a_2b40_0000);
        assert_eq!(region.end, 0x7f1a_2b40_3000);
        assert_eq!(region.page_count(), 3);
    }

    #[test]
    fn parses_anonymous_maps_line() {
        let line = "559000000000-559000002000 rw-p 00000000 00:00 0";
        assert!(parse_maps_line(line).is_some());
    }

    #[test]
    fn rejects_malformed_maps_lines() {
        assert!(parse_maps_line("").is_none());
        assert!(parse_maps_line("not-a-range rw-p").is_none());
        assert!(parse_maps_line("2000-1000 rw-p 0 0 0").is_none());
        assert!(parse_maps_line("1234-5678 rw-p 0 0 0").is_none());
    }

    #[test]
    fn pagemap_bits_select_present_pfn() {
        // Present entry with pfn 5.
        let raw: u64 = PRESENT_MASK | 5;
        assert_eq!(raw & PFN_MASK, 5);
        assert_ne!(raw & PRESENT_MASK, 0);
        // Swapped-out entry: present bit clear even with nonzero low bits.
        let swapped: u64 = 5;
        assert_eq!(swapped & PRESENT_MASK, 0);
    }
}
