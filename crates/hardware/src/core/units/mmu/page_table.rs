//! Local page-table entries.
//!
//! One 36-byte entry per frame lives in the tile's local memory:
//!
//! | offset | width | field |
//! |---|---|---|
//! | 0 | u64 | page-aligned virtual address |
//! | 8 | u64 | global page address |
//! | 16 | u64 | frame number |
//! | 24 | u32 | flags |
//! | 28 | u64 | last-access tick |

use crate::common::SimResult;
use crate::common::constants::{
    FLAG_CHIGH, FLAG_CLOCK, FLAG_COMBO, FLAG_FIXED, FLAG_READ_ONLY, FLAG_VALID, PTE_CLOCK_OFFSET,
    PTE_FLAGS_OFFSET, PTE_FRAME_OFFSET, PTE_GLOBAL_OFFSET, PTE_VADDR_OFFSET,
};
use crate::soc::traits::ByteStore;

/// Decoded local page-table entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageTableEntry {
    /// Page-aligned virtual address.
    pub vaddr: u64,
    /// Global address of the page.
    pub global: u64,
    /// Frame number.
    pub frame: u64,
    /// Flag bits.
    pub flags: u32,
    /// Tick of the last page-table hit.
    pub last_access: u64,
}

impl PageTableEntry {
    /// Reads the entry stored at `addr`.
    pub fn load(mem: &dyn ByteStore, addr: u64) -> SimResult<Self> {
        Ok(Self {
            vaddr: mem.read_u64(addr + PTE_VADDR_OFFSET)?,
            global: mem.read_u64(addr + PTE_GLOBAL_OFFSET)?,
            frame: mem.read_u64(addr + PTE_FRAME_OFFSET)?,
            flags: mem.read_u32(addr + PTE_FLAGS_OFFSET)?,
            last_access: mem.read_u64(addr + PTE_CLOCK_OFFSET)?,
        })
    }

    /// Writes the entry at `addr`.
    pub fn store(&self, mem: &mut dyn ByteStore, addr: u64) -> SimResult<()> {
        mem.write_u64(addr + PTE_VADDR_OFFSET, self.vaddr)?;
        mem.write_u64(addr + PTE_GLOBAL_OFFSET, self.global)?;
        mem.write_u64(addr + PTE_FRAME_OFFSET, self.frame)?;
        mem.write_u32(addr + PTE_FLAGS_OFFSET, self.flags)?;
        mem.write_u64(addr + PTE_CLOCK_OFFSET, self.last_access)
    }

    /// Reads only the flag word of the entry at `addr`.
    pub fn load_flags(mem: &dyn ByteStore, addr: u64) -> SimResult<u32> {
        mem.read_u32(addr + PTE_FLAGS_OFFSET)
    }

    /// Overwrites only the flag word of the entry at `addr`.
    pub fn store_flags(mem: &mut dyn ByteStore, addr: u64, flags: u32) -> SimResult<()> {
        mem.write_u32(addr + PTE_FLAGS_OFFSET, flags)
    }

    /// Entry holds a live mapping.
    pub const fn is_valid(&self) -> bool {
        self.flags & FLAG_VALID != 0
    }

    /// Entry is pinned.
    pub const fn is_fixed(&self) -> bool {
        self.flags & FLAG_FIXED != 0
    }

    /// Entry was referenced since the sweep last cleared it.
    pub const fn is_referenced(&self) -> bool {
        self.flags & FLAG_CLOCK != 0
    }

    /// Entry has not been written since it was filled.
    pub const fn is_read_only(&self) -> bool {
        self.flags & FLAG_READ_ONLY != 0
    }

    /// Entry belongs to a combo pair.
    pub const fn is_combo(&self) -> bool {
        self.flags & FLAG_COMBO != 0
    }

    /// Entry is the high half of a combo pair.
    pub const fn is_combo_high(&self) -> bool {
        self.flags & FLAG_CHIGH != 0
    }
}
