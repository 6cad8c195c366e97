//! Tick accounting and workload execution.
//!
//! This module drives a processor through time. It provides:
//! 1. **Ticks:** `wait_a_tick` signs in at the barrier and schedules CLOCK sweeps.
//! 2. **Lifecycle:** `start` and `finish` bracket a task's life on the barrier.
//! 3. **Execution:** One `MemoryOp` per call, behind the power checkpoint.
//! 4. **Routing:** Packets go to the interconnect with this processor as their clock.

use std::sync::Arc;

use tracing::{debug, error};

use super::Processor;
use crate::common::{AccessType, SimError, SimResult};
use crate::events::SimEvent;
use crate::sched::PowerAdmission;
use crate::sim::workload::MemoryOp;
use crate::soc::packet::{MemoryPacket, PacketClock};

/// Register that receives loaded values.
const LOAD_DESTINATION: usize = 1;

impl Processor {
    /// Spends one global tick.
    ///
    /// Outside interrupts, every `clock_period` ticks marks a CLOCK sweep as
    /// due; a due sweep runs as soon as the processor is outside an interrupt.
    pub fn wait_a_tick(&mut self) -> SimResult<()> {
        let _ = self.barrier.release_to_run()?;
        self.stats.total_ticks += 1;
        if self.in_interrupt() {
            return Ok(());
        }
        self.uninterrupted_ticks += 1;
        if self.uninterrupted_ticks % self.clock_period == 0 {
            self.clock_due = true;
        }
        if self.clock_due && !self.in_clock {
            self.activate_clock()?;
        }
        Ok(())
    }

    /// Spends `ticks` global ticks.
    pub fn charge(&mut self, ticks: u64) -> SimResult<()> {
        for _ in 0..ticks {
            self.wait_a_tick()?;
        }
        Ok(())
    }

    /// Waits for the begin signal and enters VIRTUAL mode.
    pub fn start(&mut self) -> SimResult<()> {
        self.barrier.wait_for_start()?;
        self.switch_mode_virtual();
        debug!(processor = self.id, "Processor started");
        Ok(())
    }

    /// Leaves the barrier; the tile's power slot goes to the oldest waiter.
    pub fn finish(&mut self) {
        self.barrier.release_power_slot();
        self.barrier.deregister_task();
        debug!(processor = self.id, ticks = self.stats.total_ticks, "Processor finished");
    }

    /// Executes one memory operation and spends its issue tick.
    ///
    /// Loads and read-modify-writes leave the old value in register 1. Sizes
    /// outside `1..=8` are rejected before any tick is spent.
    pub fn execute(&mut self, op: &MemoryOp) -> SimResult<()> {
        op.validate()?;
        if self.power_gating {
            self.power_checkpoint()?;
        }
        let size = op.size;
        match op.kind {
            AccessType::Fetch => {
                self.set_program_counter(op.address);
                let mut word = [0u8; 8];
                self.load_bytes(op.address, &mut word[..size])?;
                self.advance_program_counter(size as u64);
            }
            AccessType::Load => {
                let value = self.load_sized(op.address, size)?;
                self.set_register(LOAD_DESTINATION, value)?;
            }
            AccessType::Store => self.store_sized(op.address, size, op.value)?,
            AccessType::Modify => {
                let value = self.load_sized(op.address, size)?;
                self.store_sized(op.address, size, op.value)?;
                self.set_register(LOAD_DESTINATION, value)?;
            }
        }
        self.wait_a_tick()
    }

    /// Checks in with the power budget and stalls while queued for power.
    pub fn power_checkpoint(&mut self) -> SimResult<()> {
        if !self.barrier.check_power_sufficiency(self.tile.is_powered(), self.in_interrupt()) {
            self.tile.power_down();
            self.stats.power_downs += 1;
            self.events.publish(&SimEvent::PowerDown { processor: self.id });
            debug!(processor = self.id, "Power budget exceeded, tile powered down");
            self.barrier.rotate_power_queue(self.id);
        }
        while self.barrier.power_gate_admission(self.id) == PowerAdmission::Stall {
            self.record_block();
            self.wait_a_tick()?;
        }
        self.tile.power_up();
        Ok(())
    }

    /// Times a remote register fetch of `address`.
    pub fn fetch_to_register(&mut self, address: u64) -> SimResult<()> {
        let mut packet = MemoryPacket::fetch(self.id, address);
        self.route(&mut packet)
    }

    /// Sends `packet` through the interconnect on this processor's clock.
    pub(crate) fn route(&mut self, packet: &mut MemoryPacket) -> SimResult<()> {
        if !self.interconnect.can_admit_upstream(self.id) {
            error!(processor = self.id, "No route to the memory controller");
            return Err(SimError::AdmissionRejected { processor: self.id });
        }
        let interconnect = Arc::clone(&self.interconnect);
        interconnect.route_packet(packet, self)
    }
}

impl PacketClock for Processor {
    fn wait_global_tick(&mut self) -> SimResult<()> {
        self.wait_a_tick()
    }

    fn record_block(&mut self) {
        self.stats.blocks += 1;
        self.barrier.record_block();
    }

    fn record_service_tick(&mut self) {
        self.stats.service_time += 1;
    }
}
