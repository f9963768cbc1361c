//! Synthetic process populations for demos and tests.
//!
//! Processes are either assembled explicitly with [`SyntheticProcess`] or
//! generated pseudo-randomly from a seed, so a demo run is reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::paging::{AddressSpace, PhysFrame, VirtPage, PAGE_SIZE};
use crate::source::{MemoryRegion, ProcessInfo, ProcessSource, SourceError};

const NAME_POOL: [&str; 8] = [
    "nginx", "postgres", "redis", "sshd", "bash", "dockerd", "chrome", "journald",
];

/// Builder for one fabricated process.
pub struct SyntheticProcess {
    pid: u32,
    name: String,
    regions: Vec<MemoryRegion>,
    space: Option<AddressSpace>,
}

impl SyntheticProcess {
    pub fn new(pid: u32, name: &str) -> Self {
        SyntheticProcess {
            pid,
            name: name.to_string(),
            regions: Vec::new(),
            space: Some(AddressSpace::new()),
        }
    }

    /// Process without an address-space root; its walk is empty.
    pub fn rootless(pid: u32, name: &str) -> Self {
        SyntheticProcess {
            pid,
            name: name.to_string(),
            regions: Vec::new(),
            space: None,
        }
    }

    /// Appends a mapped region `[start, start + pages * PAGE_SIZE)`.
    pub fn region(mut self, start: u64, pages: u64) -> Self {
        self.regions
            .push(MemoryRegion::new(start, start + pages * PAGE_SIZE));
        self
    }

    /// Maps one virtual page to one physical frame. Pages left unmapped
    /// inside a region translate as unresolved.
    pub fn map(mut self, vaddr: u64, frame_addr: u64) -> Self {
        if let Some(space) = &mut self.space {
            space.map(VirtPage::containing(vaddr), PhysFrame::new(frame_addr));
        }
        self
    }

    /// Maps `pages` consecutive virtual pages from `vaddr` onto consecutive
    /// frames from `frame_addr`.
    pub fn map_linear(mut self, vaddr: u64, frame_addr: u64, pages: u64) -> Self {
        for i in 0..pages {
            self = self.map(vaddr + i * PAGE_SIZE, frame_addr + i * PAGE_SIZE);
        }
        self
    }

    pub fn build(self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            name: self.name,
            address_space: self.space,
            regions: self.regions,
        }
    }
}

/// In-memory process source. Enumeration order is insertion order.
pub struct SyntheticSource {
    processes: Vec<ProcessInfo>,
}

impl SyntheticSource {
    pub fn from_processes(processes: Vec<ProcessInfo>) -> Self {
        SyntheticSource { processes }
    }

    /// Generates a reproducible population of `count` processes with mixed
    /// layouts: contiguous runs, scattered frames, unmapped holes, the odd
    /// rootless process, and some pids below the report threshold.
    pub fn generate(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut processes = Vec::with_capacity(count);
        let mut next_frame: u64 = 0x10_0000;

        for i in 0..count {
            let pid = rng.gen_range(100..30_000);
            let name = NAME_POOL[i % NAME_POOL.len()];

            if rng.gen_ratio(1, 8) {
                processes.push(SyntheticProcess::rootless(pid, name).build());
                continue;
            }

            let mut process = SyntheticProcess::new(pid, name);
            let mut vaddr: u64 = 0x5555_0000_0000 + ((i as u64) << 32);
            for _ in 0..rng.gen_range(1..=5) {
                let pages = rng.gen_range(1..=64u64);
                process = process.region(vaddr, pages);
                for p in 0..pages {
                    // Roughly one page in six is left unmapped.
                    if rng.gen_ratio(1, 6) {
                        continue;
                    }
                    // Scattered frames break physical adjacency; the rest
                    // continue the current bump run.
                    if rng.gen_ratio(1, 4) {
                        next_frame += PAGE_SIZE * rng.gen_range(2..64);
                    } else {
                        next_frame += PAGE_SIZE;
                    }
                    process = process.map(vaddr + p * PAGE_SIZE, next_frame);
                }
                vaddr += (pages + rng.gen_range(1..16)) * PAGE_SIZE;
            }
            processes.push(process.build());
        }

        SyntheticSource { processes }
    }
}

impl ProcessSource for SyntheticSource {
    fn processes(&self) -> Result<Vec<ProcessInfo>, SourceError> {
        Ok(self.processes.clone())
    }
}
