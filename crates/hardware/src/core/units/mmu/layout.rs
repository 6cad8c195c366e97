//! Local memory layout of a tile.
//!
//! `[kernel | page table | present bitmaps | dirty bitmaps | stack | frames]`,
//! with the frame region aligned to the page size.

use super::bitmap::Bitmaps;
use crate::common::constants::PTE_SIZE;
use crate::config::PagingConfig;

/// Addresses of every region in a tile's local memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalLayout {
    /// First byte of the page table.
    pub page_table_base: u64,
    /// First byte of the present bitmaps.
    pub present_base: u64,
    /// First byte of the dirty bitmaps.
    pub dirty_base: u64,
    /// Lowest stack address (stack grows upward).
    pub stack_base: u64,
    /// One past the highest stack address.
    pub stack_limit: u64,
    /// First byte of frame 0.
    pub frames_base: u64,
    /// Number of frames.
    pub frames: usize,
    /// log2 of the page size.
    pub page_shift: u32,
    /// Total local memory size.
    pub size: u64,
}

impl LocalLayout {
    /// Lays out local memory for `paging`.
    pub fn new(paging: &PagingConfig) -> Self {
        let frames = paging.frames as u64;
        let page_table_base = paging.kernel_bytes;
        let bitmap_bytes = frames * Bitmaps::bytes_for(paging.blocks_per_page());
        let present_base = page_table_base + frames * PTE_SIZE;
        let dirty_base = present_base + bitmap_bytes;
        let stack_base = dirty_base + bitmap_bytes;
        let stack_limit = stack_base + paging.stack_bytes;
        let frames_base = stack_limit.next_multiple_of(paging.page_size());
        Self {
            page_table_base,
            present_base,
            dirty_base,
            stack_base,
            stack_limit,
            frames_base,
            frames: paging.frames,
            page_shift: paging.page_shift,
            size: frames_base + (frames << paging.page_shift),
        }
    }

    /// Local address of the page-table entry for `frame`.
    pub const fn pte_address(&self, frame: usize) -> u64 {
        self.page_table_base + frame as u64 * PTE_SIZE
    }

    /// Local address of the first byte of `frame`.
    pub const fn frame_address(&self, frame: usize) -> u64 {
        self.frames_base + ((frame as u64) << self.page_shift)
    }
}
