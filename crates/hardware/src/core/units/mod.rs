//! Processor functional units.
//!
//! This module contains the units a processor drives while executing
//! workload memory operations; today that is the software-managed memory
//! management unit.

/// Memory Management Unit: TLB, local page table, bitmaps, victim selection, walk geometry.
pub mod mmu;
