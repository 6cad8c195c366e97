//! Global System Constants.
//!
//! This module defines constants shared by the translator, the page-table
//! builder, and the processor. It includes:
//! 1. **Page-Table Entry Layout:** Field offsets of the 36-byte local entry.
//! 2. **Flag Bits:** VALID, FIXED, CLOCK, READ-ONLY, COMBO, and CHIGH.
//! 3. **Global Walk Geometry:** Level widths and shifts of the 4-level radix table.
//! 4. **Processor Constants:** Register file size and pseudo-random generator parameters.

/// Size in bytes of one local page-table entry.
pub const PTE_SIZE: u64 = 36;

/// Offset of the virtual page address field (u64).
pub const PTE_VADDR_OFFSET: u64 = 0;

/// Offset of the global (physical) page address field (u64).
pub const PTE_GLOBAL_OFFSET: u64 = 8;

/// Offset of the local frame number field (u64).
pub const PTE_FRAME_OFFSET: u64 = 16;

/// Offset of the flag word (u32).
pub const PTE_FLAGS_OFFSET: u64 = 24;

/// Offset of the last-access tick field (u64).
pub const PTE_CLOCK_OFFSET: u64 = 28;

/// Entry holds a live mapping.
pub const FLAG_VALID: u32 = 1 << 0;

/// Entry is pinned and never chosen for eviction.
pub const FLAG_FIXED: u32 = 1 << 1;

/// Entry was referenced since the last CLOCK sweep passed it.
pub const FLAG_CLOCK: u32 = 1 << 2;

/// Entry was filled by a read and has not been written since.
pub const FLAG_READ_ONLY: u32 = 1 << 3;

/// Entry is one half of a combo pair.
pub const FLAG_COMBO: u32 = 1 << 4;

/// Entry is the upper half of a combo pair.
pub const FLAG_CHIGH: u32 = 1 << 5;

/// Number of general-purpose registers spilled on interrupt entry.
pub const REGISTER_FILE_SIZE: usize = 32;

/// Size in bytes of one global page-table entry (u64 pointer + u8 flags).
pub const GLOBAL_ENTRY_SIZE: u64 = 9;

/// Flag byte written into present global page-table entries.
pub const GLOBAL_ENTRY_PRESENT: u8 = 0x01;

/// Width in bits of the super-directory index.
pub const SUPER_DIRECTORY_BITS: u32 = 11;

/// Shift of the super-directory index.
pub const SUPER_DIRECTORY_SHIFT: u32 = 37;

/// Width in bits of the directory index.
pub const DIRECTORY_BITS: u32 = 9;

/// Shift of the directory index.
pub const DIRECTORY_SHIFT: u32 = 28;

/// Width in bits of the super-table index.
pub const SUPER_TABLE_BITS: u32 = 9;

/// Shift of the super-table index.
pub const SUPER_TABLE_SHIFT: u32 = 19;

/// Number of low address bits covered by one final table.
pub const TABLE_SPAN_BITS: u32 = 19;

/// Multiplier of the victim-selection linear-congruential generator.
pub const LCG_MULTIPLIER: u64 = 6364136223846793005;

/// Increment of the victim-selection linear-congruential generator.
pub const LCG_INCREMENT: u64 = 1442695040888963407;
