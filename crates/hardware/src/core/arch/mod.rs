//! Processor architectural state.
//!
//! This module contains the architectural elements of a tile processor.
//! It includes the following modules:
//! 1. **GPRs:** General-purpose register file with register 0 fixed at zero.
//! 2. **Modes:** REAL/VIRTUAL addressing modes and the status word bit that selects them.

/// General-Purpose Register file implementation.
pub mod gpr;

/// Addressing mode definitions.
pub mod mode;
