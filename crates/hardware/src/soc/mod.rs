//! System-on-Chip (SoC) Components.
//!
//! This module organizes the components that make up the simulated tiled machine:
//! the byte stores, the memory-controller admission gate, the bus/mux interconnect
//! tree, the tiles, and the builder that assembles them into a `System`.

/// System builder for assembling SoC components.
pub mod builder;

/// Bus/mux tree interconnect and packet routing.
pub mod interconnect;

/// Local and global stores and the memory-controller gate.
pub mod memory;

/// Memory request descriptors and the routing clock interface.
pub mod packet;

/// Tile identity, interconnect attachment, and power switch.
pub mod tile;

/// Byte-store trait shared by local and global memory.
pub mod traits;

pub use builder::System;
pub use interconnect::Interconnect;
pub use packet::{MemoryPacket, PacketClock};
pub use tile::Tile;
pub use traits::ByteStore;
