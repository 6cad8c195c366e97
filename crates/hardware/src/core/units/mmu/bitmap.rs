//! Residency and dirty bitmaps.
//!
//! Each frame owns two bitmaps in local memory with one bit per sub-block:
//! the present map (sub-block has been pulled in from global memory) and the
//! dirty map (sub-block written locally since its last write-back).

use crate::common::SimResult;
use crate::soc::traits::ByteStore;

/// Which of a frame's two bitmaps to touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitmapKind {
    /// Sub-block is resident locally.
    Present,
    /// Sub-block has been written since its last write-back.
    Dirty,
}

/// Location and geometry of the bitmaps in local memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bitmaps {
    present_base: u64,
    dirty_base: u64,
    bytes_per_frame: u64,
    blocks_per_page: usize,
}

impl Bitmaps {
    /// Describes bitmaps starting at `present_base` and `dirty_base`.
    pub const fn new(present_base: u64, dirty_base: u64, blocks_per_page: usize) -> Self {
        Self {
            present_base,
            dirty_base,
            bytes_per_frame: Self::bytes_for(blocks_per_page),
            blocks_per_page,
        }
    }

    /// Bytes needed per frame for `blocks_per_page` bits.
    pub const fn bytes_for(blocks_per_page: usize) -> u64 {
        blocks_per_page.div_ceil(8) as u64
    }

    /// Sub-blocks tracked per frame.
    pub const fn blocks_per_page(&self) -> usize {
        self.blocks_per_page
    }

    const fn locate(&self, kind: BitmapKind, frame: usize, block: usize) -> (u64, u8) {
        let base = match kind {
            BitmapKind::Present => self.present_base,
            BitmapKind::Dirty => self.dirty_base,
        };
        let addr = base + frame as u64 * self.bytes_per_frame + (block / 8) as u64;
        (addr, 1 << (block % 8))
    }

    /// Tests one bit.
    pub fn test(&self, mem: &dyn ByteStore, kind: BitmapKind, frame: usize, block: usize) -> SimResult<bool> {
        let (addr, bit) = self.locate(kind, frame, block);
        Ok(mem.read_u8(addr)? & bit != 0)
    }

    /// Sets one bit.
    pub fn set(&self, mem: &mut dyn ByteStore, kind: BitmapKind, frame: usize, block: usize) -> SimResult<()> {
        let (addr, bit) = self.locate(kind, frame, block);
        let byte = mem.read_u8(addr)?;
        mem.write_u8(addr, byte | bit)
    }

    /// Clears one bit.
    pub fn clear(&self, mem: &mut dyn ByteStore, kind: BitmapKind, frame: usize, block: usize) -> SimResult<()> {
        let (addr, bit) = self.locate(kind, frame, block);
        let byte = mem.read_u8(addr)?;
        mem.write_u8(addr, byte & !bit)
    }

    /// Clears both bitmaps of `frame`.
    pub fn reset_frame(&self, mem: &mut dyn ByteStore, frame: usize) -> SimResult<()> {
        let zeros = vec![0; self.bytes_per_frame as usize];
        let offset = frame as u64 * self.bytes_per_frame;
        mem.write_bytes(self.present_base + offset, &zeros)?;
        mem.write_bytes(self.dirty_base + offset, &zeros)
    }

    /// Indices of the set bits of one bitmap of `frame`, ascending.
    pub fn set_blocks(&self, mem: &dyn ByteStore, kind: BitmapKind, frame: usize) -> SimResult<Vec<usize>> {
        let mut blocks = Vec::new();
        for block in 0..self.blocks_per_page {
            if self.test(mem, kind, frame, block)? {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }
}
