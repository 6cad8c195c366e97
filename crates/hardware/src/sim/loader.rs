//! Global page-table construction.
//!
//! This module lays out the four-level page table processors walk on a hard
//! fault. It performs:
//! 1. **Table allocation:** Zeroed tables are carved from the table region on first use.
//! 2. **Page allocation:** Data pages are carved from the data region and linked into
//!    the level-four table.
//! 3. **Lookup:** Host-side resolution of a virtual page without charging ticks.
//!
//! Every entry is `GLOBAL_ENTRY_SIZE` bytes: an 8-byte little-endian pointer
//! followed by a flag byte. A zero pointer marks an unmapped entry.

use tracing::{debug, error};

use crate::common::constants::GLOBAL_ENTRY_PRESENT;
use crate::common::{SimError, SimResult, VirtAddr, bit_mask};
use crate::config::Config;
use crate::core::units::mmu::ptw::{self, WALK_LEVELS, WalkIndices};
use crate::soc::traits::ByteStore;

/// Bump allocator over the table and data regions of global memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalPageTables {
    tables_base: u64,
    next_table: u64,
    tables_end: u64,
    next_data: u64,
    data_end: u64,
    page_shift: u32,
}

impl GlobalPageTables {
    /// Reserves the root table at `global_tables_base`.
    ///
    /// The table region runs up to `global_data_base`; data pages run from
    /// there (page-aligned) to the end of global memory.
    pub fn new(config: &Config) -> Self {
        let shift = config.paging.page_shift;
        let tables_base = config.system.global_tables_base;
        let root = ptw::level_bytes(WALK_LEVELS[0], shift);
        let page_mask = bit_mask(shift);
        Self {
            tables_base,
            next_table: tables_base + root,
            tables_end: config.system.global_data_base,
            next_data: (config.system.global_data_base + page_mask) & !page_mask,
            data_end: config.system.global_memory_size,
            page_shift: shift,
        }
    }

    /// Root table address.
    pub const fn tables_base(&self) -> u64 {
        self.tables_base
    }

    /// Bytes still free in the data region.
    pub const fn free_data(&self) -> u64 {
        self.data_end.saturating_sub(self.next_data)
    }

    /// Maps the page containing `vaddr`, allocating tables and a data page as needed.
    ///
    /// Mapping an already-mapped page returns its existing global page.
    ///
    /// # Returns
    ///
    /// Global address of the page's first byte.
    pub fn map_page(&mut self, global: &mut dyn ByteStore, vaddr: u64) -> SimResult<u64> {
        let shift = self.page_shift;
        let indices = WalkIndices::decompose(vaddr, shift);
        let mut table = self.tables_base;
        for (depth, level) in WALK_LEVELS.into_iter().enumerate() {
            let index = indices.at(level);
            let (pointer, _) = ptw::read_entry(global, table, index)?;
            if pointer != 0 {
                table = pointer;
                continue;
            }
            let target = match WALK_LEVELS.get(depth + 1) {
                Some(&next) => self.alloc_table(global, ptw::level_bytes(next, shift))?,
                None => self.alloc_page()?,
            };
            let entry = ptw::entry_address(table, index);
            global.write_u64(entry, target)?;
            global.write_u8(entry + 8, GLOBAL_ENTRY_PRESENT)?;
            table = target;
        }
        debug!(vaddr = %format_args!("{:#x}", VirtAddr::new(vaddr).page_base(shift)), page = %format_args!("{table:#x}"), "Mapped page");
        Ok(table)
    }

    /// Maps every page overlapping `[start, start + len)`.
    pub fn map_range(&mut self, global: &mut dyn ByteStore, start: u64, len: u64) -> SimResult<()> {
        if len == 0 {
            return Ok(());
        }
        let shift = self.page_shift;
        let first = VirtAddr::new(start).page_number(shift);
        let last = VirtAddr::new(VirtAddr::new(start).last_byte(len)?).page_number(shift);
        for page in first..=last {
            let _ = self.map_page(global, page << shift)?;
        }
        Ok(())
    }

    /// Resolves `vaddr` without allocating.
    ///
    /// # Returns
    ///
    /// The global byte address, or `None` if any level is unmapped.
    pub fn lookup(&self, global: &dyn ByteStore, vaddr: u64) -> SimResult<Option<u64>> {
        match ptw::resolve(global, self.tables_base, vaddr, self.page_shift) {
            Ok(addr) => Ok(Some(addr)),
            Err(SimError::MalformedPageTable { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn alloc_table(&mut self, global: &mut dyn ByteStore, bytes: u64) -> SimResult<u64> {
        if self.next_table + bytes > self.tables_end {
            error!(needed = bytes, "Global table region exhausted");
            return Err(SimError::PageTableExhausted { needed: bytes });
        }
        let table = self.next_table;
        self.next_table += bytes;
        global.write_bytes(table, &vec![0u8; usize::try_from(bytes).unwrap_or(0)])?;
        Ok(table)
    }

    fn alloc_page(&mut self) -> SimResult<u64> {
        let bytes = 1u64 << self.page_shift;
        if self.next_data + bytes > self.data_end {
            error!(needed = bytes, "Global data region exhausted");
            return Err(SimError::PageTableExhausted { needed: bytes });
        }
        let page = self.next_data;
        self.next_data += bytes;
        Ok(page)
    }
}
