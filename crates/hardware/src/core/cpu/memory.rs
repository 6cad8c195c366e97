//! Address translation and translated memory access.
//!
//! In VIRTUAL mode every access goes through `translate`:
//! 1. **TLB Hit:** Check the sub-block is present (else take a small fault), update
//!    the dirty bit on writes, and return the local address.
//! 2. **TLB Miss:** Scan the local page table. A match refreshes its CLOCK bit and
//!    reloads the TLB; a free half of a compatible combo pair takes the page as a
//!    combo page; anything else is a hard fault.
//!
//! Each step retries the lookup until it produces a local address. In REAL mode
//! addresses are local and pass through untouched.

use tracing::trace;

use super::Processor;
use crate::common::constants::{FLAG_CLOCK, FLAG_READ_ONLY};
use crate::common::{SimResult, VirtAddr, bit_mask};
use crate::core::arch::mode::ProcessorMode;
use crate::core::units::mmu::bitmap::BitmapKind;
use crate::core::units::mmu::frames::partner;
use crate::core::units::mmu::page_table::PageTableEntry;
use crate::events::SimEvent;
use crate::soc::packet::MemoryPacket;
use crate::soc::traits::ByteStore;

/// Outcome of a local page-table scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PageScan {
    /// The page is resident in this frame.
    Resident(usize),
    /// The page is absent; a frame that can take it as a combo page, if any.
    Absent(Option<usize>),
}

impl Processor {
    /// Translates `address` for a read.
    pub fn translate_for_read(&mut self, address: u64) -> SimResult<u64> {
        self.translate(address, false)
    }

    /// Translates `address` for a write.
    pub fn translate_for_write(&mut self, address: u64) -> SimResult<u64> {
        self.translate(address, true)
    }

    fn translate(&mut self, address: u64, write: bool) -> SimResult<u64> {
        if self.mode == ProcessorMode::Real {
            return Ok(address);
        }
        let va = VirtAddr::new(address);
        let shift = self.mmu.page_shift;
        let page = va.page_base(shift);
        let block = va.block_index(shift, self.mmu.block_shift);

        loop {
            self.charge(self.timing.tlb_lookup_ticks)?;
            if let Some(entry) = self.mmu.tlb.lookup(page) {
                if write {
                    let flags = self.load_flags(entry.frame)?;
                    if flags & FLAG_READ_ONLY != 0 {
                        self.store_flags(entry.frame, flags & !FLAG_READ_ONLY)?;
                    }
                }
                self.charge(self.timing.bitmap_ticks)?;
                if !self.mmu.bitmaps.test(&self.local, BitmapKind::Present, entry.frame, block)? {
                    self.small_fault(entry.frame, address)?;
                    continue;
                }
                if write {
                    self.mmu.bitmaps.set(&mut self.local, BitmapKind::Dirty, entry.frame, block)?;
                }
                return Ok(entry.frame_base + va.page_offset(shift));
            }

            match self.scan_page_table(page)? {
                PageScan::Resident(frame) => self.refresh(frame, page)?,
                PageScan::Absent(Some(frame)) => self.create_combo_page(frame, address, write)?,
                PageScan::Absent(None) => self.hard_fault(address, write)?,
            }
        }
    }

    /// Walks the local page table for `page`.
    ///
    /// Stops at the first valid match. Until then, remembers the first invalid
    /// frame whose partner holds the adjacent virtual page and is neither
    /// pinned nor already combined.
    fn scan_page_table(&mut self, page: u64) -> SimResult<PageScan> {
        let mut combo = None;
        for frame in 0..self.mmu.frames() {
            self.charge(self.timing.pte_access_ticks)?;
            let entry = self.page_table_entry(frame)?;
            if entry.is_valid() {
                if entry.vaddr == page {
                    return Ok(PageScan::Resident(frame));
                }
                continue;
            }
            if combo.is_none() && self.fits_combo(frame, page)? {
                combo = Some(frame);
            }
        }
        Ok(PageScan::Absent(combo))
    }

    /// Whether invalid `frame` can hold `page` as its partner's combo half.
    fn fits_combo(&self, frame: usize, page: u64) -> SimResult<bool> {
        let other = partner(frame);
        if other >= self.mmu.frames() {
            return Ok(false);
        }
        let neighbour = self.page_table_entry(other)?;
        if !neighbour.is_valid() || neighbour.is_fixed() || neighbour.is_combo() {
            return Ok(false);
        }
        let page_size = 1u64 << self.mmu.page_shift;
        let expected = if frame & 1 == 0 { page.checked_add(page_size) } else { page.checked_sub(page_size) };
        Ok(expected == Some(neighbour.vaddr))
    }

    /// Marks a resident page referenced and reloads its TLB entry.
    fn refresh(&mut self, frame: usize, page: u64) -> SimResult<()> {
        let addr = self.mmu.layout.pte_address(frame);
        let mut entry = PageTableEntry::load(&self.local, addr)?;
        entry.flags |= FLAG_CLOCK;
        entry.last_access = self.barrier.tick();
        entry.store(&mut self.local, addr)?;
        if entry.is_combo() {
            let other = partner(frame);
            let flags = self.load_flags(other)?;
            self.store_flags(other, flags | FLAG_CLOCK)?;
        }
        self.mmu.tlb.install(page, frame, self.mmu.layout.frame_address(frame));
        Ok(())
    }

    /// Pulls the missing sub-block of `address` into `frame`.
    fn small_fault(&mut self, frame: usize, address: u64) -> SimResult<()> {
        self.stats.small_faults += 1;
        self.events.publish(&SimEvent::SmallFault { processor: self.id, address });
        trace!(processor = self.id, address = %format_args!("{address:#x}"), frame, "Small fault");
        let entry = self.page_table_entry(frame)?;
        let block = VirtAddr::new(address).block_index(self.mmu.page_shift, self.mmu.block_shift);
        self.fill_block(frame, entry.global, block)
    }

    /// Reads sub-block `block` of the global page at `global_page` into `frame`.
    pub(crate) fn fill_block(&mut self, frame: usize, global_page: u64, block: usize) -> SimResult<()> {
        let size = self.mmu.block_size();
        let offset = block as u64 * size;
        let local = self.mmu.layout.frame_address(frame) + offset;
        let mut packet = MemoryPacket::read(self.id, global_page + offset, local, size as usize);
        self.route(&mut packet)?;
        self.local.write_bytes(local, &packet.payload)?;
        self.mmu.bitmaps.set(&mut self.local, BitmapKind::Present, frame, block)
    }

    /// Reads `buf.len()` bytes at `address`, translating each sub-block.
    pub fn load_bytes(&mut self, address: u64, buf: &mut [u8]) -> SimResult<()> {
        let _ = VirtAddr::new(address).last_byte(buf.len() as u64)?;
        let mut done = 0;
        while done < buf.len() {
            let addr = address + done as u64;
            let len = self.chunk_len(addr, buf.len() - done);
            let local = self.translate_for_read(addr)?;
            self.local.read_bytes(local, &mut buf[done..done + len])?;
            done += len;
        }
        Ok(())
    }

    /// Writes `data` at `address`, translating each sub-block.
    pub fn store_bytes(&mut self, address: u64, data: &[u8]) -> SimResult<()> {
        let _ = VirtAddr::new(address).last_byte(data.len() as u64)?;
        let mut done = 0;
        while done < data.len() {
            let addr = address + done as u64;
            let len = self.chunk_len(addr, data.len() - done);
            let local = self.translate_for_write(addr)?;
            self.local.write_bytes(local, &data[done..done + len])?;
            done += len;
        }
        Ok(())
    }

    /// Bytes from `addr` to the end of its sub-block, capped at `remaining`.
    fn chunk_len(&self, addr: u64, remaining: usize) -> usize {
        let left = self.mmu.block_size() - (addr & bit_mask(self.mmu.block_shift));
        usize::try_from(left).map_or(remaining, |left| left.min(remaining))
    }

    /// Loads one byte.
    pub fn load_u8(&mut self, address: u64) -> SimResult<u8> {
        let mut byte = [0u8; 1];
        self.load_bytes(address, &mut byte)?;
        Ok(byte[0])
    }

    /// Loads a little-endian doubleword.
    pub fn load_u64(&mut self, address: u64) -> SimResult<u64> {
        self.load_sized(address, 8)
    }

    /// Stores one byte.
    pub fn store_u8(&mut self, address: u64, value: u8) -> SimResult<()> {
        self.store_bytes(address, &[value])
    }

    /// Stores a little-endian doubleword.
    pub fn store_u64(&mut self, address: u64, value: u64) -> SimResult<()> {
        self.store_bytes(address, &value.to_le_bytes())
    }

    /// Loads `size` (1..=8) little-endian bytes, zero-extended.
    pub(crate) fn load_sized(&mut self, address: u64, size: usize) -> SimResult<u64> {
        let mut word = [0u8; 8];
        self.load_bytes(address, &mut word[..size.min(8)])?;
        Ok(u64::from_le_bytes(word))
    }

    /// Stores the low `size` (1..=8) bytes of `value`.
    pub(crate) fn store_sized(&mut self, address: u64, size: usize, value: u64) -> SimResult<()> {
        self.store_bytes(address, &value.to_le_bytes()[..size.min(8)])
    }
}
