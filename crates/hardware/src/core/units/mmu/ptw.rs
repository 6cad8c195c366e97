//! Global page-table walk geometry.
//!
//! This module slices a 48-bit virtual address into the indices of the
//! 4-level global radix table and reads entries out of global memory. The
//! levels are super-directory (11 bits at shift 37), directory (9 bits at
//! shift 28), super-table (9 bits at shift 19), and table (the page number
//! within a 512 KiB span; 9 bits at the default 1 KiB page). Each entry is a
//! u64 pointer followed by a u8 flag byte.

use crate::common::constants::{
    DIRECTORY_BITS, DIRECTORY_SHIFT, GLOBAL_ENTRY_SIZE, SUPER_DIRECTORY_BITS, SUPER_DIRECTORY_SHIFT,
    SUPER_TABLE_BITS, SUPER_TABLE_SHIFT, TABLE_SPAN_BITS,
};
use crate::common::error::WalkLevel;
use crate::common::{SimError, SimResult, bit_mask};
use crate::soc::traits::ByteStore;

/// Walk levels in lookup order.
pub const WALK_LEVELS: [WalkLevel; 4] =
    [WalkLevel::SuperDirectory, WalkLevel::Directory, WalkLevel::SuperTable, WalkLevel::Table];

/// Per-level indices of one virtual address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkIndices {
    /// Index into the super-directory.
    pub super_directory: u64,
    /// Index into the directory.
    pub directory: u64,
    /// Index into the super-table.
    pub super_table: u64,
    /// Index into the final table.
    pub table: u64,
}

impl WalkIndices {
    /// Slices `address` into walk indices.
    ///
    /// # Arguments
    ///
    /// * `address` - Virtual address.
    /// * `page_shift` - log2 of the page size; the final index is the page
    ///   number within the low 19 bits.
    pub const fn decompose(address: u64, page_shift: u32) -> Self {
        Self {
            super_directory: (address >> SUPER_DIRECTORY_SHIFT) & bit_mask(SUPER_DIRECTORY_BITS),
            directory: (address >> DIRECTORY_SHIFT) & bit_mask(DIRECTORY_BITS),
            super_table: (address >> SUPER_TABLE_SHIFT) & bit_mask(SUPER_TABLE_BITS),
            table: (address & bit_mask(TABLE_SPAN_BITS)) >> page_shift,
        }
    }

    /// Index used at `level`.
    pub const fn at(&self, level: WalkLevel) -> u64 {
        match level {
            WalkLevel::SuperDirectory => self.super_directory,
            WalkLevel::Directory => self.directory,
            WalkLevel::SuperTable => self.super_table,
            WalkLevel::Table => self.table,
        }
    }
}

/// Entries in a table at `level`.
pub const fn level_entries(level: WalkLevel, page_shift: u32) -> u64 {
    match level {
        WalkLevel::SuperDirectory => 1 << SUPER_DIRECTORY_BITS,
        WalkLevel::Directory => 1 << DIRECTORY_BITS,
        WalkLevel::SuperTable => 1 << SUPER_TABLE_BITS,
        WalkLevel::Table => 1 << (TABLE_SPAN_BITS - page_shift),
    }
}

/// Bytes occupied by a table at `level`.
pub const fn level_bytes(level: WalkLevel, page_shift: u32) -> u64 {
    level_entries(level, page_shift) * GLOBAL_ENTRY_SIZE
}

/// Global address of entry `index` of the table at `table`.
pub const fn entry_address(table: u64, index: u64) -> u64 {
    table + index * GLOBAL_ENTRY_SIZE
}

/// Reads the pointer and flag byte of one entry.
pub fn read_entry(global: &dyn ByteStore, table: u64, index: u64) -> SimResult<(u64, u8)> {
    let addr = entry_address(table, index);
    Ok((global.read_u64(addr)?, global.read_u8(addr + 8)?))
}

/// Resolves `address` to a global byte address without charging ticks.
///
/// # Returns
///
/// The global address, or `MalformedPageTable` naming the level where a
/// zero pointer was found.
pub fn resolve(global: &dyn ByteStore, tables_base: u64, address: u64, page_shift: u32) -> SimResult<u64> {
    let indices = WalkIndices::decompose(address, page_shift);
    let mut table = tables_base;
    for level in WALK_LEVELS {
        let (pointer, _) = read_entry(global, table, indices.at(level))?;
        if pointer == 0 {
            return Err(SimError::MalformedPageTable { level, address });
        }
        table = pointer;
    }
    Ok(table + (address & bit_mask(page_shift)))
}
