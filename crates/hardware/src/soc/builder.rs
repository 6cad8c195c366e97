//! Tiled machine construction and top-level `System` type.
//!
//! This module builds the shared part of the machine from configuration. It performs:
//! 1. **Global memory:** Allocates the store every tile reaches through the interconnect.
//! 2. **Interconnect:** Builds the bus/mux tree and its memory-controller gate.
//! 3. **Tiles:** Creates one power-switchable tile per processor.
//! 4. **Time:** Creates the barrier every processor signs in at.
//! 5. **Page tables:** Owns the global page-table allocator and host-side access
//!    to mapped global data.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::common::{SimResult, VirtAddr};
use crate::config::Config;
use crate::core::Processor;
use crate::core::units::mmu::ptw;
use crate::events::EventBus;
use crate::sched::Barrier;
use crate::sim::loader::GlobalPageTables;
use crate::soc::interconnect::Interconnect;
use crate::soc::memory::Memory;
use crate::soc::tile::Tile;
use crate::soc::traits::ByteStore;

/// Shared machine state: global memory, interconnect, tiles, and the barrier.
#[derive(Debug)]
pub struct System {
    config: Config,
    global: Arc<RwLock<Memory>>,
    tables: Mutex<GlobalPageTables>,
    interconnect: Arc<Interconnect>,
    tiles: Vec<Arc<Tile>>,
    barrier: Arc<Barrier>,
    events: EventBus,
}

impl System {
    /// Builds a system from `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated before anything is allocated.
    pub fn new(config: Config) -> SimResult<Self> {
        config.validate()?;
        let events = EventBus::new();
        let global = Arc::new(RwLock::new(Memory::new("GLOBAL", config.system.global_memory_size)?));
        let tiles_count = config.system.tiles;
        let interconnect = Arc::new(Interconnect::build(
            tiles_count,
            &config.interconnect,
            &config.timing,
            Arc::clone(&global),
        ));
        let tiles = (0..tiles_count)
            .map(|id| {
                let (leaf, port) = interconnect.attachment(id);
                Arc::new(Tile::new(id, leaf, port))
            })
            .collect();
        let barrier = Arc::new(Barrier::new(config.power.max_active, events.clone()));
        let tables = Mutex::new(GlobalPageTables::new(&config));
        info!(
            tiles = tiles_count,
            nodes = interconnect.node_count(),
            global_bytes = config.system.global_memory_size,
            "System built"
        );
        Ok(Self { config, global, tables, interconnect, tiles, barrier, events })
    }

    /// Configuration the system was built from.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Global memory.
    pub const fn global(&self) -> &Arc<RwLock<Memory>> {
        &self.global
    }

    /// The bus/mux tree.
    pub const fn interconnect(&self) -> &Arc<Interconnect> {
        &self.interconnect
    }

    /// The tick barrier.
    pub const fn barrier(&self) -> &Arc<Barrier> {
        &self.barrier
    }

    /// Event fan-out shared by the barrier and processors.
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Tile `id`, if it exists.
    pub fn tile(&self, id: usize) -> Option<&Arc<Tile>> {
        self.tiles.get(id)
    }

    /// Number of tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Creates the processor for tile `id`.
    pub fn processor(&self, id: usize) -> SimResult<Processor> {
        Processor::new(id, self)
    }

    /// Maps the page containing `vaddr` in the global page table.
    pub fn map_page(&self, vaddr: u64) -> SimResult<u64> {
        let mut tables = self.tables.lock();
        tables.map_page(&mut *self.global.write(), vaddr)
    }

    /// Maps every page overlapping `[start, start + len)`.
    pub fn map_range(&self, start: u64, len: u64) -> SimResult<()> {
        let mut tables = self.tables.lock();
        tables.map_range(&mut *self.global.write(), start, len)
    }

    /// Global address `vaddr` maps to, if mapped.
    pub fn lookup(&self, vaddr: u64) -> SimResult<Option<u64>> {
        let tables = self.tables.lock();
        tables.lookup(&*self.global.read(), vaddr)
    }

    /// Copies `data` into mapped global memory at virtual `vaddr`, mapping as needed.
    ///
    /// Spends no ticks; meant for seeding workloads before a run.
    pub fn write_virtual(&self, vaddr: u64, data: &[u8]) -> SimResult<()> {
        self.map_range(vaddr, data.len() as u64)?;
        self.for_each_page(vaddr, data.len(), |global, addr, range| {
            global.write().write_bytes(addr, &data[range])
        })
    }

    /// Reads mapped global memory at virtual `vaddr` into `buf`.
    ///
    /// Unmapped addresses fail with `MalformedPageTable`.
    pub fn read_virtual(&self, vaddr: u64, buf: &mut [u8]) -> SimResult<()> {
        let len = buf.len();
        self.for_each_page(vaddr, len, |global, addr, range| global.read().read_bytes(addr, &mut buf[range]))
    }

    /// Calls `f` with the global address and byte range of each page-sized piece.
    fn for_each_page<F>(&self, vaddr: u64, len: usize, mut f: F) -> SimResult<()>
    where
        F: FnMut(&RwLock<Memory>, u64, std::ops::Range<usize>) -> SimResult<()>,
    {
        let shift = self.config.paging.page_shift;
        let page_size = 1u64 << shift;
        let _ = VirtAddr::new(vaddr).last_byte(len as u64)?;
        let mut done = 0;
        while done < len {
            let addr = vaddr + done as u64;
            let left = page_size - VirtAddr::new(addr).page_offset(shift);
            let chunk = usize::try_from(left).map_or(len - done, |left| left.min(len - done));
            let global = ptw::resolve(&*self.global.read(), self.config.system.global_tables_base, addr, shift)?;
            f(&self.global, global, done..done + chunk)?;
            done += chunk;
        }
        Ok(())
    }
}
