//! Simulation event notification.
//!
//! Telemetry collaborators (displays, counters, test recorders) observe the core
//! through this module. It provides:
//! 1. **Events:** `SimEvent`, one variant per tick advance, fault, write-back, or power-down.
//! 2. **Sinks:** The `EventSink` observer trait and the `EventCounter` sink.
//! 3. **Fan-out:** `EventBus`, a cloneable handle shared by the barrier and processors.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Something observable happened inside the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimEvent {
    /// The global tick advanced to `tick`.
    TickAdvanced {
        /// New tick value.
        tick: u64,
    },
    /// A processor took a hard fault.
    HardFault {
        /// Faulting processor.
        processor: usize,
        /// Faulting virtual address.
        address: u64,
    },
    /// A processor pulled in a missing sub-block of a mapped page.
    SmallFault {
        /// Faulting processor.
        processor: usize,
        /// Faulting virtual address.
        address: u64,
    },
    /// A processor packed a page into the free half of a combo pair.
    ComboPage {
        /// Faulting processor.
        processor: usize,
        /// Faulting virtual address.
        address: u64,
        /// Frame that received the page.
        frame: usize,
    },
    /// A frame's dirty sub-blocks were written back to global memory.
    WriteBack {
        /// Owning processor.
        processor: usize,
        /// Frame written back.
        frame: usize,
        /// Sub-blocks transferred.
        blocks: usize,
    },
    /// A tile powered down to respect the power budget.
    PowerDown {
        /// Processor whose tile powered down.
        processor: usize,
    },
}

/// Observer of simulation events.
///
/// Sinks are called from processor threads, possibly concurrently, and must
/// not block on the simulation.
pub trait EventSink: Send + Sync {
    /// Receives one event.
    fn notify(&self, event: &SimEvent);
}

/// Fan-out of events to every subscribed sink.
#[derive(Clone, Default)]
pub struct EventBus {
    sinks: Arc<RwLock<Vec<Arc<dyn EventSink>>>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink; it receives every event published afterwards.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        self.sinks.write().push(sink);
    }

    /// Delivers `event` to every sink.
    pub fn publish(&self, event: &SimEvent) {
        for sink in self.sinks.read().iter() {
            sink.notify(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("sinks", &self.sinks.read().len()).finish()
    }
}

/// Sink that counts events by kind.
#[derive(Debug, Default)]
pub struct EventCounter {
    ticks: AtomicU64,
    hard_faults: AtomicU64,
    small_faults: AtomicU64,
    combo_pages: AtomicU64,
    write_backs: AtomicU64,
    power_downs: AtomicU64,
}

impl EventCounter {
    /// Creates a counter with all totals at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick advances observed.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Hard faults observed.
    pub fn hard_faults(&self) -> u64 {
        self.hard_faults.load(Ordering::Relaxed)
    }

    /// Small faults observed.
    pub fn small_faults(&self) -> u64 {
        self.small_faults.load(Ordering::Relaxed)
    }

    /// Combo pages created.
    pub fn combo_pages(&self) -> u64 {
        self.combo_pages.load(Ordering::Relaxed)
    }

    /// Write-backs observed.
    pub fn write_backs(&self) -> u64 {
        self.write_backs.load(Ordering::Relaxed)
    }

    /// Power-downs observed.
    pub fn power_downs(&self) -> u64 {
        self.power_downs.load(Ordering::Relaxed)
    }
}

impl EventSink for EventCounter {
    fn notify(&self, event: &SimEvent) {
        let counter = match event {
            SimEvent::TickAdvanced { .. } => &self.ticks,
            SimEvent::HardFault { .. } => &self.hard_faults,
            SimEvent::SmallFault { .. } => &self.small_faults,
            SimEvent::ComboPage { .. } => &self.combo_pages,
            SimEvent::WriteBack { .. } => &self.write_backs,
            SimEvent::PowerDown { .. } => &self.power_downs,
        };
        let _ = counter.fetch_add(1, Ordering::Relaxed);
    }
}
