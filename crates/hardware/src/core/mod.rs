//! Core processor implementation.
//!
//! This module contains the per-tile processor: its architectural state
//! (registers, mode), its functional units (the MMU), and the `Processor`
//! type that ties translation, fault handling, and tick accounting together.

/// Architectural state (register file, processor modes).
pub mod arch;

/// Processor state and execution orchestration.
pub mod cpu;

/// Functional units (MMU).
pub mod units;

pub use self::cpu::Processor;
