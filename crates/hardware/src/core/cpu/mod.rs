//! Processor Definition and Initialization.
//!
//! This module defines the central `Processor` structure, which serves as the container for
//! the state of one tile's processor. It coordinates the following:
//! 1. **State Management:** Registers, program counter, local stack, and addressing mode.
//! 2. **Virtual Memory:** The MMU state and the tile's local memory it lives in.
//! 3. **Time:** Every tick the processor spends goes through the shared `Barrier`.
//! 4. **System Integration:** The interconnect route to global memory and the tile's power switch.

/// Tick accounting, lifecycle, workload execution, and power checkpoints.
pub mod execution;

/// Address translation and translated loads/stores.
pub mod memory;

/// Interrupt context, fault handling, eviction, write-back, and CLOCK sweeps.
pub mod trap;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::error;

use crate::common::{SimError, SimResult};
use crate::config::TimingConfig;
use crate::core::arch::gpr::Gpr;
use crate::core::arch::mode::ProcessorMode;
use crate::core::units::mmu::Mmu;
use crate::core::units::mmu::page_table::PageTableEntry;
use crate::events::EventBus;
use crate::sched::Barrier;
use crate::soc::memory::Memory;
use crate::soc::traits::ByteStore;
use crate::soc::{Interconnect, System, Tile};
use crate::stats::ProcessorStats;

/// One tile's processor.
///
/// Owns its registers, local memory, and MMU exclusively; shares the barrier,
/// interconnect, and global memory with every other processor.
#[derive(Debug)]
pub struct Processor {
    id: usize,
    regs: Gpr,
    pc: u64,
    sp: u64,
    mode: ProcessorMode,
    /// Modes to restore, one per open interrupt context.
    saved_modes: Vec<ProcessorMode>,
    in_clock: bool,
    clock_due: bool,
    uninterrupted_ticks: u64,
    clock_period: u64,
    local: Memory,
    mmu: Mmu,
    tile: Arc<Tile>,
    barrier: Arc<Barrier>,
    interconnect: Arc<Interconnect>,
    global: Arc<RwLock<Memory>>,
    events: EventBus,
    timing: TimingConfig,
    tables_base: u64,
    power_gating: bool,
    stats: ProcessorStats,
}

impl Processor {
    /// Creates processor `id` attached to `system`.
    ///
    /// The processor starts in REAL mode with zeroed registers and an empty
    /// local page table. It is not registered with the barrier; the caller
    /// registers one task per processor before `Barrier::begin`.
    ///
    /// # Arguments
    ///
    /// * `id` - Tile index.
    /// * `system` - Shared machine state.
    pub fn new(id: usize, system: &System) -> SimResult<Self> {
        let config = system.config();
        let tile = system
            .tile(id)
            .cloned()
            .ok_or_else(|| SimError::InvalidConfig(format!("no tile {id} in a {}-tile system", config.system.tiles)))?;
        let mmu = Mmu::new(&config.paging, id as u64);
        let local = Memory::new("LOCAL", mmu.layout.size)?;
        Ok(Self {
            id,
            regs: Gpr::new(),
            pc: 0,
            sp: mmu.layout.stack_base,
            mode: ProcessorMode::Real,
            saved_modes: Vec::new(),
            in_clock: false,
            clock_due: false,
            uninterrupted_ticks: 0,
            clock_period: config.paging.clock_period,
            local,
            mmu,
            tile,
            barrier: Arc::clone(system.barrier()),
            interconnect: Arc::clone(system.interconnect()),
            global: Arc::clone(system.global()),
            events: system.events().clone(),
            timing: config.timing.clone(),
            tables_base: config.system.global_tables_base,
            power_gating: config.power.enabled,
            stats: ProcessorStats::default(),
        })
    }

    /// Tile index of this processor.
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Current addressing mode.
    pub const fn mode(&self) -> ProcessorMode {
        self.mode
    }

    /// Whether an interrupt context is open.
    pub fn in_interrupt(&self) -> bool {
        !self.saved_modes.is_empty()
    }

    /// Status word; bit 0 is set in REAL mode.
    pub const fn status_word(&self) -> u64 {
        self.mode.to_status()
    }

    /// Sets the addressing mode from a status word.
    pub const fn set_status_word(&mut self, status: u64) {
        self.mode = ProcessorMode::from_status(status);
    }

    /// Switches to REAL addressing.
    pub const fn switch_mode_real(&mut self) {
        self.mode = ProcessorMode::Real;
    }

    /// Switches to VIRTUAL addressing.
    pub const fn switch_mode_virtual(&mut self) {
        self.mode = ProcessorMode::Virtual;
    }

    /// Flips between REAL and VIRTUAL addressing.
    pub const fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    /// Reads register `n`; register 0 is always zero.
    pub fn get_register(&self, n: usize) -> SimResult<u64> {
        self.regs.read(n).inspect_err(|_| error!(processor = self.id, index = n, "Bad register"))
    }

    /// Writes register `n`; writes to register 0 are discarded.
    pub fn set_register(&mut self, n: usize, value: u64) -> SimResult<()> {
        self.regs.write(n, value).inspect_err(|_| error!(processor = self.id, index = n, "Bad register"))
    }

    /// Current program counter.
    pub const fn get_program_counter(&self) -> u64 {
        self.pc
    }

    /// Moves the program counter to `addr`.
    pub const fn set_program_counter(&mut self, addr: u64) {
        self.pc = addr;
    }

    /// Advances the program counter by `count`.
    pub const fn advance_program_counter(&mut self, count: u64) {
        self.pc = self.pc.wrapping_add(count);
    }

    /// Current stack pointer (a local address).
    pub const fn stack_pointer(&self) -> u64 {
        self.sp
    }

    /// Pushes `value` on the local stack.
    pub fn push_stack(&mut self, value: u64) -> SimResult<()> {
        if self.sp + 8 > self.mmu.layout.stack_limit {
            error!(processor = self.id, sp = self.sp, "Stack overflow");
            return Err(SimError::StackOverflow { sp: self.sp });
        }
        self.local.write_u64(self.sp, value)?;
        self.sp += 8;
        Ok(())
    }

    /// Pops the top of the local stack.
    pub fn pop_stack(&mut self) -> SimResult<u64> {
        if self.sp < self.mmu.layout.stack_base + 8 {
            error!(processor = self.id, sp = self.sp, "Stack underflow");
            return Err(SimError::StackUnderflow { sp: self.sp });
        }
        self.sp -= 8;
        self.local.read_u64(self.sp)
    }

    /// Telemetry counters.
    pub const fn stats(&self) -> &ProcessorStats {
        &self.stats
    }

    /// Hard faults taken.
    pub const fn hard_fault_count(&self) -> u64 {
        self.stats.hard_faults
    }

    /// Small faults taken.
    pub const fn small_fault_count(&self) -> u64 {
        self.stats.small_faults
    }

    /// Blocked interconnect attempts and power stalls.
    pub const fn block_count(&self) -> u64 {
        self.stats.blocks
    }

    /// Ticks spent in memory-controller service.
    pub const fn service_time(&self) -> u64 {
        self.stats.service_time
    }

    /// Ticks consumed.
    pub const fn total_ticks(&self) -> u64 {
        self.stats.total_ticks
    }

    /// Zeroes the telemetry counters.
    pub fn reset_counters(&mut self) {
        self.stats.reset();
    }

    /// The MMU state.
    pub const fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    /// The tile's local memory.
    pub const fn local(&self) -> &Memory {
        &self.local
    }

    /// The tile this processor runs on.
    pub const fn tile(&self) -> &Arc<Tile> {
        &self.tile
    }

    /// Decodes the local page-table entry of `frame`.
    pub fn page_table_entry(&self, frame: usize) -> SimResult<PageTableEntry> {
        PageTableEntry::load(&self.local, self.mmu.layout.pte_address(frame))
    }

    fn store_flags(&mut self, frame: usize, flags: u32) -> SimResult<()> {
        PageTableEntry::store_flags(&mut self.local, self.mmu.layout.pte_address(frame), flags)
    }

    fn load_flags(&self, frame: usize) -> SimResult<u32> {
        PageTableEntry::load_flags(&self.local, self.mmu.layout.pte_address(frame))
    }
}
