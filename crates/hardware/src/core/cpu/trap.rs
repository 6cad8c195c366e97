//! Interrupt context and page-fault handling.
//!
//! Everything here runs inside the processor's own interrupt context, which
//! makes fault handling, combo creation, and CLOCK sweeps mutually exclusive
//! per processor. It provides:
//! 1. **Interrupt Context:** Register spill/restore on the local stack and the REAL-mode switch.
//! 2. **Hard Faults:** Victim selection, eviction with write-back, the four-level global
//!    walk, and installation of the new page.
//! 3. **Combo Pages:** Packing an adjacent virtual page into a free partner frame.
//! 4. **CLOCK:** The periodic reference-bit sweep.
//! 5. **Maintenance:** Flushing, dropping, pinning, and privileged global stores.

use tracing::{debug, error, trace};

use super::Processor;
use crate::common::constants::{
    FLAG_CHIGH, FLAG_CLOCK, FLAG_COMBO, FLAG_FIXED, FLAG_READ_ONLY, FLAG_VALID, REGISTER_FILE_SIZE,
};
use crate::common::{SimError, SimResult, VirtAddr, bit_mask};
use crate::core::arch::mode::ProcessorMode;
use crate::core::units::mmu::bitmap::BitmapKind;
use crate::core::units::mmu::frames::{partner, select_victim};
use crate::core::units::mmu::page_table::PageTableEntry;
use crate::core::units::mmu::ptw::{self, WALK_LEVELS, WalkIndices};
use crate::events::SimEvent;
use crate::soc::packet::MemoryPacket;
use crate::soc::traits::ByteStore;

impl Processor {
    /// Enters interrupt context.
    ///
    /// Saves the mode, switches to REAL, and spills every register to the
    /// local stack, paying `spill_ticks` per register.
    pub fn interrupt_begin(&mut self) -> SimResult<()> {
        self.saved_modes.push(self.mode);
        self.mode = ProcessorMode::Real;
        for idx in 0..REGISTER_FILE_SIZE {
            let value = self.regs.read(idx)?;
            self.push_stack(value)?;
            self.charge(self.timing.spill_ticks)?;
        }
        Ok(())
    }

    /// Leaves interrupt context, restoring registers and the saved mode.
    pub fn interrupt_end(&mut self) -> SimResult<()> {
        for idx in (0..REGISTER_FILE_SIZE).rev() {
            let value = self.pop_stack()?;
            self.regs.write(idx, value)?;
            self.charge(self.timing.spill_ticks)?;
        }
        self.mode = self.saved_modes.pop().unwrap_or(ProcessorMode::Virtual);
        Ok(())
    }

    /// Brings the page of `address` into a local frame.
    pub(crate) fn hard_fault(&mut self, address: u64, write: bool) -> SimResult<()> {
        self.stats.hard_faults += 1;
        self.events.publish(&SimEvent::HardFault { processor: self.id, address });
        trace!(processor = self.id, address = %format_args!("{address:#x}"), write, "Hard fault");

        self.interrupt_begin()?;
        let frame = self.get_free_frame()?;
        self.evict(frame)?;
        self.install_page(frame, address, write, 0)?;
        self.interrupt_end()
    }

    /// Installs the page of `address` into invalid `frame` as a combo half.
    pub(crate) fn create_combo_page(&mut self, frame: usize, address: u64, write: bool) -> SimResult<()> {
        self.stats.combo_faults += 1;
        self.events.publish(&SimEvent::ComboPage { processor: self.id, address, frame });
        trace!(processor = self.id, address = %format_args!("{address:#x}"), frame, "Combo page");

        self.interrupt_begin()?;
        self.install_page(frame, address, write, combo_flags(frame))?;
        let other = partner(frame);
        let flags = self.load_flags(other)?;
        self.store_flags(other, flags | combo_flags(other))?;
        self.interrupt_end()
    }

    /// Picks the frame that receives a new page.
    ///
    /// The first invalid frame wins outright; otherwise every entry is read
    /// and the replacement policy chooses among them.
    pub fn get_free_frame(&mut self) -> SimResult<usize> {
        let frames = self.mmu.frames();
        let mut flags = Vec::with_capacity(frames);
        for frame in 0..frames {
            self.charge(self.timing.pte_access_ticks)?;
            let entry = self.load_flags(frame)?;
            if entry & FLAG_VALID == 0 {
                return Ok(frame);
            }
            flags.push(entry);
        }
        select_victim(&flags, &mut self.mmu.lcg).ok_or_else(|| {
            error!(processor = self.id, "Every frame is pinned");
            SimError::NoEvictableFrame { processor: self.id }
        })
    }

    /// Empties a valid `frame`: splits its combo pair, writes it back, and
    /// drops its translation.
    fn evict(&mut self, frame: usize) -> SimResult<()> {
        let entry = self.page_table_entry(frame)?;
        if !entry.is_valid() {
            return Ok(());
        }
        self.clean_combo(frame)?;
        self.write_back_memory(frame)?;
        self.mmu.tlb.invalidate_frame(frame);
        self.stats.evictions += 1;
        debug!(processor = self.id, frame, page = %format_args!("{:#x}", entry.vaddr), "Evicted");
        Ok(())
    }

    /// Maps the page of `address` into `frame` and fetches its faulting sub-block.
    fn install_page(&mut self, frame: usize, address: u64, write: bool, extra: u32) -> SimResult<()> {
        let shift = self.mmu.page_shift;
        let va = VirtAddr::new(address);
        let global = self.map_to_global_address(address)?;
        let global_page = global & !bit_mask(shift);

        self.mmu.bitmaps.reset_frame(&mut self.local, frame)?;
        let mut flags = FLAG_VALID | FLAG_CLOCK | extra;
        if !write {
            flags |= FLAG_READ_ONLY;
        }
        let entry = PageTableEntry {
            vaddr: va.page_base(shift),
            global: global_page,
            frame: frame as u64,
            flags,
            last_access: self.barrier.tick(),
        };
        self.charge(self.timing.pte_access_ticks)?;
        entry.store(&mut self.local, self.mmu.layout.pte_address(frame))?;
        self.mmu.tlb.install(entry.vaddr, frame, self.mmu.layout.frame_address(frame));
        self.fill_block(frame, global_page, va.block_index(shift, self.mmu.block_shift))
    }

    /// Splits the combo pair `frame` belongs to, if any.
    pub fn clean_combo(&mut self, frame: usize) -> SimResult<()> {
        let flags = self.load_flags(frame)?;
        if flags & FLAG_COMBO == 0 {
            return Ok(());
        }
        self.store_flags(frame, flags & !(FLAG_COMBO | FLAG_CHIGH))?;
        let other = partner(frame);
        if other < self.mmu.frames() {
            let flags = self.load_flags(other)?;
            self.store_flags(other, flags & !(FLAG_COMBO | FLAG_CHIGH))?;
        }
        Ok(())
    }

    /// Copies every dirty sub-block of `frame` back to global memory.
    ///
    /// Read-only and invalid frames are left alone.
    pub fn write_back_memory(&mut self, frame: usize) -> SimResult<()> {
        let entry = self.page_table_entry(frame)?;
        if !entry.is_valid() || entry.is_read_only() {
            return Ok(());
        }
        self.charge(self.timing.bitmap_ticks)?;
        let dirty = self.mmu.bitmaps.set_blocks(&self.local, BitmapKind::Dirty, frame)?;
        let size = self.mmu.block_size();
        let base = self.mmu.layout.frame_address(frame);
        for &block in &dirty {
            let offset = block as u64 * size;
            let mut payload = vec![0u8; size as usize];
            self.local.read_bytes(base + offset, &mut payload)?;
            let mut packet = MemoryPacket::write(self.id, entry.global + offset, base + offset, payload);
            self.route(&mut packet)?;
            self.mmu.bitmaps.clear(&mut self.local, BitmapKind::Dirty, frame, block)?;
        }
        self.stats.write_backs += 1;
        self.stats.blocks_written_back += dirty.len() as u64;
        self.events.publish(&SimEvent::WriteBack { processor: self.id, frame, blocks: dirty.len() });
        trace!(processor = self.id, frame, blocks = dirty.len(), "Write-back");
        Ok(())
    }

    /// Resolves `address` through the four-level global page table.
    ///
    /// Each level costs one remote fetch; a zero pointer is fatal.
    pub fn map_to_global_address(&mut self, address: u64) -> SimResult<u64> {
        let shift = self.mmu.page_shift;
        let indices = WalkIndices::decompose(address, shift);
        let mut table = self.tables_base;
        for level in WALK_LEVELS {
            let index = indices.at(level);
            self.fetch_to_register(ptw::entry_address(table, index))?;
            let (pointer, _) = ptw::read_entry(&*self.global.read(), table, index)?;
            if pointer == 0 {
                error!(
                    processor = self.id,
                    %level,
                    address = %format_args!("{address:#x}"),
                    "Malformed global page table"
                );
                return Err(SimError::MalformedPageTable { level, address });
            }
            table = pointer;
        }
        Ok(table + VirtAddr::new(address).page_offset(shift))
    }

    /// Runs one CLOCK sweep over the next `sweep_width` frames.
    ///
    /// Referenced, unpinned frames lose their CLOCK bit and their TLB entry.
    /// Does nothing inside an interrupt; the sweep stays due.
    pub fn activate_clock(&mut self) -> SimResult<()> {
        if self.in_interrupt() || self.in_clock {
            return Ok(());
        }
        self.in_clock = true;
        self.clock_due = false;
        self.interrupt_begin()?;

        let frames = self.mmu.frames();
        let start = self.mmu.clock_cursor;
        let mut cleared = 0;
        for step in 0..self.mmu.sweep_width {
            let frame = (start + step) % frames;
            self.charge(self.timing.pte_access_ticks)?;
            let flags = self.load_flags(frame)?;
            if flags & FLAG_VALID != 0 && flags & FLAG_FIXED == 0 && flags & FLAG_CLOCK != 0 {
                self.store_flags(frame, flags & !FLAG_CLOCK)?;
                self.mmu.tlb.invalidate_frame(frame);
                cleared += 1;
            }
        }
        self.mmu.clock_cursor = (start + self.mmu.sweep_width) % frames;
        self.stats.clock_sweeps += 1;
        trace!(processor = self.id, start, cleared, "CLOCK sweep");

        self.interrupt_end()?;
        self.in_clock = false;
        Ok(())
    }

    /// Writes back every frame.
    pub fn flush_pages(&mut self) -> SimResult<()> {
        self.interrupt_begin()?;
        for frame in 0..self.mmu.frames() {
            self.write_back_memory(frame)?;
        }
        self.interrupt_end()
    }

    /// Writes back and unmaps `frame`.
    pub fn drop_page(&mut self, frame: usize) -> SimResult<()> {
        if frame >= self.mmu.frames() {
            return Ok(());
        }
        self.evict(frame)?;
        self.mmu.bitmaps.reset_frame(&mut self.local, frame)?;
        PageTableEntry::default().store(&mut self.local, self.mmu.layout.pte_address(frame))
    }

    /// Drops the TLB entry for the page of `address`.
    ///
    /// # Returns
    ///
    /// Whether an entry was present.
    pub fn dump_page_from_tlb(&mut self, address: u64) -> bool {
        let page = VirtAddr::new(address).page_base(self.mmu.page_shift);
        self.mmu.tlb.invalidate_page(page)
    }

    /// Faults in the page of `address` and pins it against eviction.
    ///
    /// A pinned page leaves any combo pair it was part of.
    ///
    /// # Returns
    ///
    /// The pinned frame, or `None` in REAL mode where nothing is mapped.
    pub fn pin_page(&mut self, address: u64) -> SimResult<Option<usize>> {
        let _ = self.translate_for_read(address)?;
        let page = VirtAddr::new(address).page_base(self.mmu.page_shift);
        let Some(entry) = self.mmu.tlb.lookup(page) else {
            return Ok(None);
        };
        self.clean_combo(entry.frame)?;
        let flags = self.load_flags(entry.frame)?;
        self.store_flags(entry.frame, flags | FLAG_FIXED)?;
        Ok(Some(entry.frame))
    }

    /// Writes `data` straight into global memory at virtual `address`.
    ///
    /// Spins on the barrier's priority lock, one tick per failed attempt.
    pub fn privileged_store(&mut self, address: u64, data: &[u8]) -> SimResult<()> {
        while !self.barrier.try_acquire_priority_lock() {
            self.stats.blocks += 1;
            self.wait_a_tick()?;
        }
        let result = self.privileged_write(address, data);
        self.barrier.release_priority_lock();
        result
    }

    fn privileged_write(&self, address: u64, data: &[u8]) -> SimResult<()> {
        let shift = self.mmu.page_shift;
        let page_size = 1u64 << shift;
        let _ = VirtAddr::new(address).last_byte(data.len() as u64)?;
        let mut done = 0;
        while done < data.len() {
            let addr = address + done as u64;
            let left = page_size - VirtAddr::new(addr).page_offset(shift);
            let len = usize::try_from(left).map_or(data.len() - done, |left| left.min(data.len() - done));
            let target = ptw::resolve(&*self.global.read(), self.tables_base, addr, shift)?;
            self.global.write().write_bytes(target, &data[done..done + len])?;
            done += len;
        }
        Ok(())
    }
}

/// Combo flags a frame carries in its pair; odd frames are the high half.
const fn combo_flags(frame: usize) -> u32 {
    if frame & 1 == 1 { FLAG_COMBO | FLAG_CHIGH } else { FLAG_COMBO }
}
