//! # Unit Components
//!
//! This module serves as the central hub for the tests of every simulator layer,
//! from shared types and configuration through the barrier, the tiled machine,
//! and the processor, up to complete simulator runs.






/// Unit tests for the tiled machine: memories, the controller gate, and the interconnect.
pub mod soc;
