use std::sync::Arc;

use tilesim_core::common::SimResult;
use tilesim_core::sched::Barrier;
use tilesim_core::soc::PacketClock;

/// A task that spends its ticks at a shared barrier and counts them.
pub struct TaskClock {
    barrier: Arc<Barrier>,
    pub ticks: u64,
    pub blocks: u64,
    pub service: u64,
}

impl TaskClock {
    pub fn new(barrier: Arc<Barrier>) -> Self {
        Self { barrier, ticks: 0, blocks: 0, service: 0 }
    }
}

impl PacketClock for TaskClock {
    fn wait_global_tick(&mut self) -> SimResult<()> {
        let _ = self.barrier.release_to_run()?;
        self.ticks += 1;
        Ok(())
    }

    fn record_block(&mut self) {
        self.blocks += 1;
        self.barrier.record_block();
    }

    fn record_service_tick(&mut self) {
        self.service += 1;
    }
}
