//! Tiled many-core simulator library.
//!
//! This crate implements a cycle-approximate simulator of a tiled many-core machine with the following:
//! 1. **Time:** A global tick barrier every processor task signs in at, with power gating.
//! 2. **Virtual Memory:** Per-processor software-managed translation over a small local
//!    memory: TLB, local page table, sub-block present/dirty bitmaps, combo pages, and CLOCK.
//! 3. **Interconnect:** A bus/mux tree with exponential backoff and a bounded memory controller.
//! 4. **Simulation:** Global page tables, workload replay, configuration, and statistics.

/// Common types and constants (addresses, access types, PTE layout, errors).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// Processor core (architectural state, MMU, translation, fault handling).
pub mod core;
/// Observable simulation events and sinks.
pub mod events;
/// Global tick barrier and power gating.
pub mod sched;
/// Global page tables, workloads, and the threaded simulator.
pub mod sim;
/// Tiled machine (memories, interconnect, tiles, builder).
pub mod soc;
/// Per-processor statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// One tile's processor; holds registers, local memory, and MMU state.
pub use crate::core::Processor;
/// The tick barrier shared by every processor task.
pub use crate::sched::Barrier;
/// Runs one task per processor and reports per-pass counters.
pub use crate::sim::Simulator;
/// Shared machine state; construct with `System::new`.
pub use crate::soc::System;
