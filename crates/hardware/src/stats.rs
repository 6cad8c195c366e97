//! Per-processor statistics collection and reporting.
//!
//! This module tracks the telemetry counters each processor exposes. It provides:
//! 1. **Fault Counters:** Hard, small, and combo faults plus evictions.
//! 2. **Write-Back Counters:** Frames and sub-blocks written back to global memory.
//! 3. **Timing Counters:** Total ticks, blocked attempts, and controller service time.
//! 4. **Reporting:** A JSON rendering of the counters.

use serde::Serialize;

use crate::common::SimResult;

/// Telemetry counters of one processor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProcessorStats {
    /// Hard faults taken (full page-table misses).
    pub hard_faults: u64,
    /// Small faults taken (sub-block missing from a mapped page).
    pub small_faults: u64,
    /// Pages packed into the free half of a combo pair.
    pub combo_faults: u64,
    /// Valid frames evicted to make room for a new page.
    pub evictions: u64,
    /// Write-back invocations on frames that were not read-only.
    pub write_backs: u64,
    /// Sub-blocks transferred by write-back.
    pub blocks_written_back: u64,
    /// Failed interconnect attempts and power stalls.
    pub blocks: u64,
    /// Ticks spent in memory-controller service.
    pub service_time: u64,
    /// Ticks consumed by this processor.
    pub total_ticks: u64,
    /// CLOCK sweeps performed.
    pub clock_sweeps: u64,
    /// Times the tile powered down.
    pub power_downs: u64,
}

impl ProcessorStats {
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Renders the counters as a JSON object.
    pub fn to_json(&self) -> SimResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
