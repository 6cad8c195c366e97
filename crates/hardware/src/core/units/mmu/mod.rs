//! Memory Management Unit (MMU).
//!
//! This module holds the per-processor state of the software-managed virtual
//! memory engine. The translation and fault-handling protocols that drive it
//! live on the processor (`core::cpu::memory` and `core::cpu::trap`), since they
//! spend the processor's ticks; this module provides the data structures:
//! 1. **TLB:** Ordered page-to-frame cache.
//! 2. **Page Table:** 36-byte entries in local memory, one per frame.
//! 3. **Bitmaps:** Present and dirty bits per sub-block.
//! 4. **Frames:** Victim selection and the combo-pair partner relation.
//! 5. **Walk:** Global page-table index decomposition.
//! 6. **Layout:** Where each structure sits in local memory.

/// Present and dirty bitmaps.
pub mod bitmap;

/// Victim frame selection.
pub mod frames;

/// Local memory layout.
pub mod layout;

/// Local page-table entry codec.
pub mod page_table;

/// Global page-table walk geometry.
pub mod ptw;

/// Translation Lookaside Buffer (TLB) for caching page-to-frame mappings.
pub mod tlb;

use self::bitmap::Bitmaps;
use self::frames::Lcg;
use self::layout::LocalLayout;
use self::tlb::Tlb;
use crate::config::PagingConfig;

/// Per-processor virtual memory state.
#[derive(Debug)]
pub struct Mmu {
    /// Translation cache.
    pub tlb: Tlb,
    /// Local memory layout.
    pub layout: LocalLayout,
    /// Bitmap geometry.
    pub bitmaps: Bitmaps,
    /// Random-victim generator.
    pub lcg: Lcg,
    /// Next frame the CLOCK sweep examines.
    pub clock_cursor: usize,
    /// Frames examined per sweep.
    pub sweep_width: usize,
    /// log2 of the page size.
    pub page_shift: u32,
    /// log2 of the sub-block size.
    pub block_shift: u32,
}

impl Mmu {
    /// Creates the MMU state for one processor.
    ///
    /// # Arguments
    ///
    /// * `paging` - Paging geometry.
    /// * `seed` - Seed of the random-victim generator (the processor id keeps
    ///   processors from drawing identical sequences).
    pub fn new(paging: &PagingConfig, seed: u64) -> Self {
        let layout = LocalLayout::new(paging);
        Self {
            tlb: Tlb::new(paging.tlb_entries),
            bitmaps: Bitmaps::new(layout.present_base, layout.dirty_base, paging.blocks_per_page()),
            layout,
            lcg: Lcg::new(seed.wrapping_add(1)),
            clock_cursor: 0,
            sweep_width: paging.clock_sweep_width.min(paging.frames),
            page_shift: paging.page_shift,
            block_shift: paging.block_shift,
        }
    }

    /// Number of frames.
    pub const fn frames(&self) -> usize {
        self.layout.frames
    }

    /// Sub-block size in bytes.
    pub const fn block_size(&self) -> u64 {
        1 << self.block_shift
    }
}
