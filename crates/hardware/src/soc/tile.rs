//! Tile identity and power switch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::trace;

/// One tile of the grid: where its processor attaches to the interconnect
/// and whether it is currently powered.
#[derive(Debug)]
pub struct Tile {
    id: usize,
    leaf: usize,
    port: usize,
    powered: AtomicBool,
    power_downs: AtomicU64,
}

impl Tile {
    /// Creates a powered tile attached at `port` of leaf bus `leaf`.
    pub const fn new(id: usize, leaf: usize, port: usize) -> Self {
        Self { id, leaf, port, powered: AtomicBool::new(true), power_downs: AtomicU64::new(0) }
    }

    /// Tile (and processor) identifier.
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Leaf bus the tile is attached to.
    pub const fn leaf(&self) -> usize {
        self.leaf
    }

    /// Input port on the leaf bus.
    pub const fn port(&self) -> usize {
        self.port
    }

    /// Whether the tile is powered.
    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::Acquire)
    }

    /// Switches the tile off.
    pub fn power_down(&self) {
        if self.powered.swap(false, Ordering::AcqRel) {
            let _ = self.power_downs.fetch_add(1, Ordering::Relaxed);
            trace!(tile = self.id, "Tile powered down");
        }
    }

    /// Switches the tile back on.
    pub fn power_up(&self) {
        self.powered.store(true, Ordering::Release);
    }

    /// Times the tile has been switched off.
    pub fn power_downs(&self) -> u64 {
        self.power_downs.load(Ordering::Relaxed)
    }
}
