//! # Tiled Machine


/// Byte stores and the memory-controller gate.
pub mod memory;

/// Tile power switch and system construction.
pub mod tile;
