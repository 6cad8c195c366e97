use tilesim_core::config::Config;
use tilesim_core::core::Processor;
use tilesim_core::soc::System;

use super::init_tracing;

/// Default geometry with fast memory timing so fault-heavy tests stay quick.
pub fn small_config() -> Config {
    let mut config = Config::default();
    config.system.tiles = 2;
    config.system.global_memory_size = 4 * 1024 * 1024;
    config.timing.mmu_delay = 2;
    config.timing.ddr_delay = 1;
    config.timing.spill_ticks = 1;
    config
}

/// One system with processor 0 registered, begun, and started in VIRTUAL mode.
pub struct TestContext {
    pub system: System,
    pub processor: Processor,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(small_config())
    }

    pub fn with_config(config: Config) -> Self {
        let mut ctx = Self::unstarted(config);
        ctx.processor.start().unwrap();
        ctx
    }

    /// Registered and begun, but still in REAL mode.
    pub fn unstarted(config: Config) -> Self {
        init_tracing();
        let system = System::new(config).unwrap();
        let processor = system.processor(0).unwrap();
        system.barrier().register_task();
        system.barrier().begin();
        Self { system, processor }
    }

    /// Virtual address of page `n`.
    pub fn page(&self, n: u64) -> u64 {
        n << self.system.config().paging.page_shift
    }

    /// Maps pages `0..count` in the global page table.
    pub fn map_pages(&self, count: u64) {
        self.system.map_range(0, self.page(count)).unwrap();
    }

    /// Frame currently holding the page of `address`, if any.
    pub fn frame_of(&self, address: u64) -> Option<usize> {
        let page = address & !((1u64 << self.system.config().paging.page_shift) - 1);
        (0..self.processor.mmu().frames()).find(|&frame| {
            let entry = self.processor.page_table_entry(frame).unwrap();
            entry.is_valid() && entry.vaddr == page
        })
    }
}
