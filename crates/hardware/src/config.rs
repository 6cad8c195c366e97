//! Configuration system for the tiled many-core simulator.
//!
//! This module defines all configuration structures used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline constants (tile count, paging geometry, interconnect delays).
//! 2. **Structures:** Hierarchical config for system, paging, timing, interconnect, power,
//!    and simulation passes.
//! 3. **Loading and Validation:** JSON parsing via `serde_json` and geometry checks.
//!
//! Configuration is supplied as JSON (`Config::from_json_str` / `Config::from_file`) or
//! built with `Config::default()`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::constants::TABLE_SPAN_BITS;
use crate::common::error::{SimError, SimResult};

/// Default configuration constants for the simulator.
///
/// These values define the baseline machine when not explicitly
/// overridden in a JSON configuration document.
mod defaults {
    /// Number of tiles (processors) in the grid.
    pub const TILES: usize = 8;

    /// Size of the shared global store (16 MiB).
    pub const GLOBAL_MEMORY_SIZE: u64 = 16 * 1024 * 1024;

    /// Global address of the super-directory.
    pub const GLOBAL_TABLES_BASE: u64 = 0x800;

    /// Global address where data pages start being allocated (1 MiB).
    ///
    /// Everything between `GLOBAL_TABLES_BASE` and this address is reserved
    /// for page-table levels.
    pub const GLOBAL_DATA_BASE: u64 = 0x10_0000;

    /// log2 of the page size (1 KiB pages, 9-bit final table index).
    pub const PAGE_SHIFT: u32 = 10;

    /// log2 of the sub-block ("bitmap") granularity (16 bytes).
    pub const BLOCK_SHIFT: u32 = 4;

    /// Number of local page frames per tile.
    pub const FRAMES: usize = 256;

    /// Number of TLB entries per processor.
    pub const TLB_ENTRIES: usize = 32;

    /// Bytes of local memory reserved for the interrupt stack.
    pub const STACK_BYTES: u64 = 1024;

    /// Bytes of local memory reserved for the resident kernel image.
    pub const KERNEL_BYTES: u64 = 1024;

    /// Uninterrupted ticks between CLOCK sweeps.
    pub const CLOCK_PERIOD: u64 = 2000;

    /// Frame slots examined per CLOCK sweep.
    pub const CLOCK_SWEEP_WIDTH: usize = 16;

    /// Memory-controller service delay in ticks.
    pub const MMU_DELAY: u64 = 50;

    /// Fixed crossing delay between controller and DDR in ticks.
    pub const DDR_DELAY: u64 = 8;

    /// Service-delay multiplier applied to writes.
    pub const WRITE_FACTOR: u64 = 2;

    /// Global clock slow-down factor applied to service delay.
    pub const GLOBAL_CLOCK_SLOW: u64 = 1;

    /// Ticks charged per TLB lookup.
    pub const TLB_LOOKUP_TICKS: u64 = 1;

    /// Ticks charged per local page-table entry touched.
    pub const PTE_ACCESS_TICKS: u64 = 1;

    /// Ticks charged per register spilled or restored.
    pub const SPILL_TICKS: u64 = 2;

    /// Ticks charged per dirty-bitmap word examined during write-back.
    pub const BITMAP_TICKS: u64 = 0;

    /// Tiles attached to each leaf bus.
    pub const TILES_PER_LEAF: usize = 16;

    /// Children per mux node above the leaves.
    pub const FAN_IN: usize = 2;

    /// Concurrent requests admitted by the memory controller.
    pub const ADMISSION_LIMIT: usize = 4;

    /// Exponent at which the backoff delay wraps back to one tick.
    pub const BACKOFF_CAP: u32 = 8;

    /// Maximum number of powered cores per tick.
    pub const MAX_ACTIVE: usize = 36;

    /// Number of times each workload is replayed.
    pub const PASSES: usize = 1;
}

/// Root configuration structure.
///
/// Aggregates every sub-configuration; each section may be omitted in JSON
/// and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Machine-level settings (tile count, global memory layout).
    pub system: SystemConfig,
    /// Per-tile paging geometry.
    pub paging: PagingConfig,
    /// Tick costs of translator and interconnect steps.
    pub timing: TimingConfig,
    /// Bus/mux tree shape and admission bound.
    pub interconnect: InterconnectConfig,
    /// Power-gating heuristic.
    pub power: PowerConfig,
    /// Workload replay settings.
    pub simulation: SimulationConfig,
}

impl Config {
    /// Parses a configuration from a JSON document and validates it.
    ///
    /// # Arguments
    ///
    /// * `json` - JSON text; missing sections and fields take their defaults.
    ///
    /// # Returns
    ///
    /// The validated `Config`, or `ConfigParse` / `InvalidConfig`.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that the geometry is internally consistent.
    ///
    /// # Returns
    ///
    /// `Ok(())` or `InvalidConfig` naming the first violated constraint.
    pub fn validate(&self) -> SimResult<()> {
        let p = &self.paging;
        let ensure = |ok: bool, msg: &str| {
            if ok { Ok(()) } else { Err(SimError::InvalidConfig(msg.to_string())) }
        };

        ensure(self.system.tiles > 0, "system.tiles must be non-zero")?;
        ensure(p.page_shift <= TABLE_SPAN_BITS, "paging.page_shift must be at most 19")?;
        ensure(p.block_shift <= p.page_shift, "paging.block_shift exceeds paging.page_shift")?;
        ensure(p.frames > 0, "paging.frames must be non-zero")?;
        ensure(p.tlb_entries > 0, "paging.tlb_entries must be non-zero")?;
        ensure(p.clock_period > 0, "paging.clock_period must be non-zero")?;
        ensure(p.clock_sweep_width > 0, "paging.clock_sweep_width must be non-zero")?;
        ensure(
            p.stack_bytes >= 8 && p.stack_bytes % 8 == 0,
            "paging.stack_bytes must be a non-zero multiple of 8",
        )?;
        ensure(self.interconnect.tiles_per_leaf > 0, "interconnect.tiles_per_leaf must be non-zero")?;
        ensure(self.interconnect.fan_in >= 2, "interconnect.fan_in must be at least 2")?;
        ensure(self.interconnect.admission_limit > 0, "interconnect.admission_limit must be non-zero")?;
        ensure(
            (1..=16).contains(&self.interconnect.backoff_cap),
            "interconnect.backoff_cap must be in 1..=16",
        )?;
        ensure(self.power.max_active > 0, "power.max_active must be non-zero")?;
        ensure(self.simulation.passes > 0, "simulation.passes must be non-zero")?;
        ensure(
            self.system.global_tables_base > 0
                && self.system.global_tables_base < self.system.global_data_base,
            "system.global_tables_base must lie below system.global_data_base",
        )?;
        ensure(
            self.system.global_data_base < self.system.global_memory_size,
            "system.global_data_base lies outside global memory",
        )?;
        Ok(())
    }
}

/// Machine-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SystemConfig {
    /// Number of tiles.
    #[serde(default = "SystemConfig::default_tiles")]
    pub tiles: usize,
    /// Size of the global store in bytes.
    #[serde(default = "SystemConfig::default_global_memory_size")]
    pub global_memory_size: u64,
    /// Global address of the super-directory.
    #[serde(default = "SystemConfig::default_global_tables_base")]
    pub global_tables_base: u64,
    /// Global address where data pages are allocated from.
    #[serde(default = "SystemConfig::default_global_data_base")]
    pub global_data_base: u64,
}

impl SystemConfig {
    const fn default_tiles() -> usize {
        defaults::TILES
    }
    const fn default_global_memory_size() -> u64 {
        defaults::GLOBAL_MEMORY_SIZE
    }
    const fn default_global_tables_base() -> u64 {
        defaults::GLOBAL_TABLES_BASE
    }
    const fn default_global_data_base() -> u64 {
        defaults::GLOBAL_DATA_BASE
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            tiles: defaults::TILES,
            global_memory_size: defaults::GLOBAL_MEMORY_SIZE,
            global_tables_base: defaults::GLOBAL_TABLES_BASE,
            global_data_base: defaults::GLOBAL_DATA_BASE,
        }
    }
}

/// Per-tile paging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PagingConfig {
    /// log2 of the page size.
    #[serde(default = "PagingConfig::default_page_shift")]
    pub page_shift: u32,
    /// log2 of the sub-block size tracked by the bitmaps.
    #[serde(default = "PagingConfig::default_block_shift")]
    pub block_shift: u32,
    /// Number of local frames.
    #[serde(default = "PagingConfig::default_frames")]
    pub frames: usize,
    /// Number of TLB entries.
    #[serde(default = "PagingConfig::default_tlb_entries")]
    pub tlb_entries: usize,
    /// Bytes reserved for the interrupt stack.
    #[serde(default = "PagingConfig::default_stack_bytes")]
    pub stack_bytes: u64,
    /// Bytes reserved for the resident kernel.
    #[serde(default = "PagingConfig::default_kernel_bytes")]
    pub kernel_bytes: u64,
    /// Uninterrupted ticks between CLOCK sweeps.
    #[serde(default = "PagingConfig::default_clock_period")]
    pub clock_period: u64,
    /// Frames examined per sweep.
    #[serde(default = "PagingConfig::default_clock_sweep_width")]
    pub clock_sweep_width: usize,
}

impl PagingConfig {
    const fn default_page_shift() -> u32 {
        defaults::PAGE_SHIFT
    }
    const fn default_block_shift() -> u32 {
        defaults::BLOCK_SHIFT
    }
    const fn default_frames() -> usize {
        defaults::FRAMES
    }
    const fn default_tlb_entries() -> usize {
        defaults::TLB_ENTRIES
    }
    const fn default_stack_bytes() -> u64 {
        defaults::STACK_BYTES
    }
    const fn default_kernel_bytes() -> u64 {
        defaults::KERNEL_BYTES
    }
    const fn default_clock_period() -> u64 {
        defaults::CLOCK_PERIOD
    }
    const fn default_clock_sweep_width() -> usize {
        defaults::CLOCK_SWEEP_WIDTH
    }

    /// Page size in bytes.
    pub const fn page_size(&self) -> u64 {
        1 << self.page_shift
    }

    /// Sub-block size in bytes.
    pub const fn block_size(&self) -> u64 {
        1 << self.block_shift
    }

    /// Sub-blocks per page.
    pub const fn blocks_per_page(&self) -> usize {
        1 << (self.page_shift - self.block_shift)
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_shift: defaults::PAGE_SHIFT,
            block_shift: defaults::BLOCK_SHIFT,
            frames: defaults::FRAMES,
            tlb_entries: defaults::TLB_ENTRIES,
            stack_bytes: defaults::STACK_BYTES,
            kernel_bytes: defaults::KERNEL_BYTES,
            clock_period: defaults::CLOCK_PERIOD,
            clock_sweep_width: defaults::CLOCK_SWEEP_WIDTH,
        }
    }
}

/// Tick costs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Memory-controller service delay.
    #[serde(default = "TimingConfig::default_mmu_delay")]
    pub mmu_delay: u64,
    /// Controller-to-DDR crossing delay.
    #[serde(default = "TimingConfig::default_ddr_delay")]
    pub ddr_delay: u64,
    /// Service multiplier for writes.
    #[serde(default = "TimingConfig::default_write_factor")]
    pub write_factor: u64,
    /// Global clock slow-down applied to service delay.
    #[serde(default = "TimingConfig::default_global_clock_slow")]
    pub global_clock_slow: u64,
    /// Ticks per TLB lookup.
    #[serde(default = "TimingConfig::default_tlb_lookup_ticks")]
    pub tlb_lookup_ticks: u64,
    /// Ticks per local page-table entry touched.
    #[serde(default = "TimingConfig::default_pte_access_ticks")]
    pub pte_access_ticks: u64,
    /// Ticks per register spilled or restored.
    #[serde(default = "TimingConfig::default_spill_ticks")]
    pub spill_ticks: u64,
    /// Ticks per dirty-bitmap word examined.
    #[serde(default = "TimingConfig::default_bitmap_ticks")]
    pub bitmap_ticks: u64,
}

impl TimingConfig {
    const fn default_mmu_delay() -> u64 {
        defaults::MMU_DELAY
    }
    const fn default_ddr_delay() -> u64 {
        defaults::DDR_DELAY
    }
    const fn default_write_factor() -> u64 {
        defaults::WRITE_FACTOR
    }
    const fn default_global_clock_slow() -> u64 {
        defaults::GLOBAL_CLOCK_SLOW
    }
    const fn default_tlb_lookup_ticks() -> u64 {
        defaults::TLB_LOOKUP_TICKS
    }
    const fn default_pte_access_ticks() -> u64 {
        defaults::PTE_ACCESS_TICKS
    }
    const fn default_spill_ticks() -> u64 {
        defaults::SPILL_TICKS
    }
    const fn default_bitmap_ticks() -> u64 {
        defaults::BITMAP_TICKS
    }

    /// Service delay of one request at the memory controller.
    ///
    /// # Arguments
    ///
    /// * `is_write` - Writes pay `write_factor` times the base delay.
    pub const fn service_delay(&self, is_write: bool) -> u64 {
        let base = self.mmu_delay * self.global_clock_slow;
        if is_write { base * self.write_factor } else { base }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            mmu_delay: defaults::MMU_DELAY,
            ddr_delay: defaults::DDR_DELAY,
            write_factor: defaults::WRITE_FACTOR,
            global_clock_slow: defaults::GLOBAL_CLOCK_SLOW,
            tlb_lookup_ticks: defaults::TLB_LOOKUP_TICKS,
            pte_access_ticks: defaults::PTE_ACCESS_TICKS,
            spill_ticks: defaults::SPILL_TICKS,
            bitmap_ticks: defaults::BITMAP_TICKS,
        }
    }
}

/// Bus/mux tree configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InterconnectConfig {
    /// Tiles attached to each leaf bus.
    #[serde(default = "InterconnectConfig::default_tiles_per_leaf")]
    pub tiles_per_leaf: usize,
    /// Children per mux node.
    #[serde(default = "InterconnectConfig::default_fan_in")]
    pub fan_in: usize,
    /// Concurrent requests admitted by the memory controller.
    #[serde(default = "InterconnectConfig::default_admission_limit")]
    pub admission_limit: usize,
    /// Backoff exponent wrap point.
    #[serde(default = "InterconnectConfig::default_backoff_cap")]
    pub backoff_cap: u32,
}

impl InterconnectConfig {
    const fn default_tiles_per_leaf() -> usize {
        defaults::TILES_PER_LEAF
    }
    const fn default_fan_in() -> usize {
        defaults::FAN_IN
    }
    const fn default_admission_limit() -> usize {
        defaults::ADMISSION_LIMIT
    }
    const fn default_backoff_cap() -> u32 {
        defaults::BACKOFF_CAP
    }
}

impl Default for InterconnectConfig {
    fn default() -> Self {
        Self {
            tiles_per_leaf: defaults::TILES_PER_LEAF,
            fan_in: defaults::FAN_IN,
            admission_limit: defaults::ADMISSION_LIMIT,
            backoff_cap: defaults::BACKOFF_CAP,
        }
    }
}

/// Power-gating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PowerConfig {
    /// Run the power checkpoint before every workload operation.
    #[serde(default)]
    pub enabled: bool,
    /// Maximum powered cores per tick.
    #[serde(default = "PowerConfig::default_max_active")]
    pub max_active: usize,
}

impl PowerConfig {
    const fn default_max_active() -> usize {
        defaults::MAX_ACTIVE
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self { enabled: false, max_active: defaults::MAX_ACTIVE }
    }
}

/// Workload replay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Times each workload is replayed; counters reset between passes.
    #[serde(default = "SimulationConfig::default_passes")]
    pub passes: usize,
}

impl SimulationConfig {
    const fn default_passes() -> usize {
        defaults::PASSES
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { passes: defaults::PASSES }
    }
}
