//! Translation Lookaside Buffer (TLB).
//!
//! A small, ordered, fully associative cache of page-to-frame mappings owned by
//! one processor. Lookups scan in order; fills reuse the entry already holding
//! the page, then the first invalid entry, then a round-robin victim, so a valid
//! page never appears in two entries.

/// A single entry in the TLB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TlbEntry {
    /// Page-aligned virtual address (tag).
    pub page: u64,
    /// Local address of the frame holding the page.
    pub frame_base: u64,
    /// Frame number.
    pub frame: usize,
    /// Entry validity flag.
    pub valid: bool,
}

/// Translation Lookaside Buffer structure.
#[derive(Debug)]
pub struct Tlb {
    entries: Vec<TlbEntry>,
    next_victim: usize,
}

impl Tlb {
    /// Creates an empty TLB with `size` entries (at least one).
    pub fn new(size: usize) -> Self {
        Self { entries: vec![TlbEntry::default(); size.max(1)], next_victim: 0 }
    }

    /// Number of entries.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Finds the valid entry for `page`.
    pub fn lookup(&self, page: u64) -> Option<TlbEntry> {
        self.entries.iter().find(|e| e.valid && e.page == page).copied()
    }

    /// Installs or refreshes the mapping `page -> frame`.
    ///
    /// # Arguments
    ///
    /// * `page` - Page-aligned virtual address.
    /// * `frame` - Frame number.
    /// * `frame_base` - Local address of the frame.
    pub fn install(&mut self, page: u64, frame: usize, frame_base: u64) {
        let slot = self
            .entries
            .iter()
            .position(|e| e.valid && e.page == page)
            .or_else(|| self.entries.iter().position(|e| !e.valid))
            .unwrap_or_else(|| {
                let victim = self.next_victim;
                self.next_victim = (victim + 1) % self.entries.len();
                victim
            });
        self.entries[slot] = TlbEntry { page, frame_base, frame, valid: true };
    }

    /// Invalidates the entry for `page`; returns whether one existed.
    pub fn invalidate_page(&mut self, page: u64) -> bool {
        let mut hit = false;
        for e in self.entries.iter_mut().filter(|e| e.valid && e.page == page) {
            e.valid = false;
            hit = true;
        }
        hit
    }

    /// Invalidates every entry pointing at `frame`.
    pub fn invalidate_frame(&mut self, frame: usize) {
        for e in self.entries.iter_mut().filter(|e| e.valid && e.frame == frame) {
            e.valid = false;
        }
    }

    /// Invalidates every entry.
    pub fn flush(&mut self) {
        for e in &mut self.entries {
            e.valid = false;
        }
    }

    /// Pages of all valid entries, in table order.
    pub fn valid_pages(&self) -> Vec<u64> {
        self.entries.iter().filter(|e| e.valid).map(|e| e.page).collect()
    }
}
