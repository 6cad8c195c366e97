//! Simulation driver.
//!
//! Provides the global page-table allocator, the per-processor workload
//! streams, and the `Simulator` that runs one task per processor.

/// Global page-table construction and host-side lookup.
pub mod loader;

/// Threaded task runner and run reports.
pub mod simulator;

/// Memory-operation streams replayed by processors.
pub mod workload;

pub use loader::GlobalPageTables;
pub use simulator::{ProcessorReport, SimReport, Simulator};
pub use workload::{MemoryOp, Workload};
