//! Bus/mux tree interconnect between tiles and global memory.
//!
//! This module implements the contention network a memory request crosses. It provides:
//! 1. **Topology:** An arena of nodes addressed by `NodeId`; leaf buses own one input
//!    slot per attached tile, mux nodes one slot per child, and the root feeds the
//!    memory controller.
//! 2. **Buffer Slots:** One occupancy flag per input, each behind its own mutex.
//! 3. **Backoff:** Failed claims spend `2^k` idle ticks, with `k` wrapping at the cap.
//! 4. **Arbitration:** A rotating gate per node picks which occupied input moves up first.
//! 5. **Admission:** The root admits into the bounded `AdmissionGate`, charges service
//!    and DDR crossing delay, then moves the bytes.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::common::{SimResult, VirtAddr};
use crate::config::{InterconnectConfig, TimingConfig};
use crate::soc::memory::Memory;
use crate::soc::memory::controller::AdmissionGate;
use crate::soc::packet::{MemoryPacket, PacketClock};
use crate::soc::traits::ByteStore;

/// Stable index of a node in the interconnect arena.
pub type NodeId = usize;

/// One bus or mux in the tree.
#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    /// Input slot this node occupies on its parent.
    parent_port: usize,
    children: Vec<NodeId>,
    slots: Vec<Mutex<bool>>,
    /// Input with arbitration priority.
    gate: Mutex<usize>,
}

impl Node {
    fn new(inputs: usize) -> Self {
        Self {
            parent: None,
            parent_port: 0,
            children: Vec::new(),
            slots: (0..inputs).map(|_| Mutex::new(false)).collect(),
            gate: Mutex::new(0),
        }
    }

    fn try_claim(&self, input: usize) -> bool {
        let mut occupied = self.slots[input].lock();
        if *occupied {
            return false;
        }
        *occupied = true;
        true
    }

    fn release(&self, input: usize) {
        *self.slots[input].lock() = false;
    }

    /// True if `input` is the first occupied input at or after the gate.
    fn has_priority(&self, input: usize) -> bool {
        let inputs = self.slots.len();
        if inputs == 1 {
            return true;
        }
        let gate = *self.gate.lock();
        for step in 0..inputs {
            let candidate = (gate + step) % inputs;
            if candidate == input {
                return true;
            }
            if *self.slots[candidate].lock() {
                return false;
            }
        }
        true
    }

    fn pass_gate(&self, input: usize) {
        *self.gate.lock() = (input + 1) % self.slots.len();
    }
}

/// Exponential backoff with a wrapping exponent.
#[derive(Clone, Copy, Debug)]
pub struct Backoff {
    exponent: u32,
    cap: u32,
}

impl Backoff {
    /// Starts at one idle tick; the exponent wraps to zero on reaching `cap`.
    pub const fn new(cap: u32) -> Self {
        Self { exponent: 0, cap }
    }

    /// Idle ticks for the next failed attempt, advancing the exponent.
    pub const fn next_delay(&mut self) -> u64 {
        let delay = 1 << self.exponent;
        self.exponent = (self.exponent + 1) % self.cap;
        delay
    }

    /// Records a failed attempt and spends its idle ticks.
    fn idle(&mut self, clock: &mut dyn PacketClock) -> SimResult<()> {
        clock.record_block();
        for _ in 0..self.next_delay() {
            clock.wait_global_tick()?;
        }
        Ok(())
    }
}

/// The tree of contention points between tiles and global memory.
#[derive(Debug)]
pub struct Interconnect {
    nodes: Vec<Node>,
    leaves: Vec<NodeId>,
    root: NodeId,
    tiles: usize,
    tiles_per_leaf: usize,
    backoff_cap: u32,
    timing: TimingConfig,
    controller: AdmissionGate,
    global: Arc<RwLock<Memory>>,
}

impl Interconnect {
    /// Builds the tree for `tiles` tiles.
    ///
    /// Leaves take `tiles_per_leaf` tiles each; nodes are then grouped
    /// `fan_in` at a time under new parents until a single root remains.
    ///
    /// # Arguments
    ///
    /// * `tiles` - Number of tiles to attach.
    /// * `config` - Tree shape, admission limit, and backoff cap.
    /// * `timing` - Service and crossing delays.
    /// * `global` - Global memory behind the controller.
    pub fn build(
        tiles: usize,
        config: &InterconnectConfig,
        timing: &TimingConfig,
        global: Arc<RwLock<Memory>>,
    ) -> Self {
        let per_leaf = config.tiles_per_leaf.max(1);
        let leaf_count = tiles.div_ceil(per_leaf).max(1);
        let mut nodes: Vec<Node> = (0..leaf_count).map(|_| Node::new(per_leaf)).collect();
        let leaves: Vec<NodeId> = (0..leaf_count).collect();

        let fan_in = config.fan_in.max(2);
        let mut level = leaves.clone();
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(fan_in));
            for group in level.chunks(fan_in) {
                let parent = nodes.len();
                let mut node = Node::new(group.len());
                node.children = group.to_vec();
                nodes.push(node);
                for (port, &child) in group.iter().enumerate() {
                    nodes[child].parent = Some(parent);
                    nodes[child].parent_port = port;
                }
                next.push(parent);
            }
            level = next;
        }

        Self {
            root: level[0],
            nodes,
            leaves,
            tiles,
            tiles_per_leaf: per_leaf,
            backoff_cap: config.backoff_cap.max(1),
            timing: timing.clone(),
            controller: AdmissionGate::new(config.admission_limit),
            global,
        }
    }

    /// Leaf bus and input port of a tile.
    pub const fn attachment(&self, tile: usize) -> (NodeId, usize) {
        (tile / self.tiles_per_leaf, tile % self.tiles_per_leaf)
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf buses.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Root node (the one feeding the memory controller).
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Parent of `node`, if any.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// Children of `node`.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map_or(&[], |n| n.children.as_slice())
    }

    /// The memory-controller admission gate.
    pub const fn controller(&self) -> &AdmissionGate {
        &self.controller
    }

    /// Checks that `tile` has a route from its leaf to the memory controller.
    pub fn can_admit_upstream(&self, tile: usize) -> bool {
        if tile >= self.tiles {
            return false;
        }
        let (leaf, port) = self.attachment(tile);
        let Some(node) = self.nodes.get(leaf) else {
            return false;
        };
        if port >= node.slots.len() {
            return false;
        }
        let mut current = leaf;
        for _ in 0..self.nodes.len() {
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => return current == self.root,
            }
        }
        false
    }

    /// Carries `packet` from its requester's leaf to global memory and back.
    ///
    /// Every tick spent (initial hop, backoff, service, DDR crossing) goes
    /// through `clock`. On return a read packet's payload holds `size` bytes
    /// of global memory; a write packet's payload has been stored.
    pub fn route_packet(&self, packet: &mut MemoryPacket, clock: &mut dyn PacketClock) -> SimResult<()> {
        let (mut node, mut input) = self.attachment(packet.requester);
        clock.wait_global_tick()?;

        let mut backoff = Backoff::new(self.backoff_cap);
        while !self.nodes[node].try_claim(input) {
            backoff.idle(clock)?;
        }

        while let Some(parent) = self.nodes[node].parent {
            let up = self.nodes[node].parent_port;
            let mut backoff = Backoff::new(self.backoff_cap);
            while !(self.nodes[node].has_priority(input) && self.nodes[parent].try_claim(up)) {
                backoff.idle(clock)?;
            }
            self.nodes[node].pass_gate(input);
            self.nodes[node].release(input);
            node = parent;
            input = up;
        }

        let mut backoff = Backoff::new(self.backoff_cap);
        while !(self.nodes[node].has_priority(input) && self.controller.try_admit()) {
            backoff.idle(clock)?;
        }
        self.nodes[node].pass_gate(input);
        self.nodes[node].release(input);
        trace!(
            requester = packet.requester,
            address = %format_args!("{:#x}", packet.remote_address),
            write = packet.is_write,
            "Admitted to memory controller"
        );

        let service = self.serve(packet, clock);
        self.controller.complete();
        service?;

        for _ in 0..self.timing.ddr_delay {
            clock.wait_global_tick()?;
        }
        self.transfer(packet)
    }

    fn serve(&self, packet: &MemoryPacket, clock: &mut dyn PacketClock) -> SimResult<()> {
        for _ in 0..self.timing.service_delay(packet.is_write) {
            clock.wait_global_tick()?;
            clock.record_service_tick();
        }
        Ok(())
    }

    /// Moves the packet's bytes one at a time.
    fn transfer(&self, packet: &mut MemoryPacket) -> SimResult<()> {
        if packet.size == 0 {
            return Ok(());
        }
        let _ = VirtAddr::new(packet.remote_address).last_byte(packet.size as u64)?;
        if packet.is_write {
            let mut global = self.global.write();
            for (offset, byte) in (0u64..).zip(&packet.payload[..packet.size]) {
                global.write_u8(packet.remote_address + offset, *byte)?;
            }
        } else {
            packet.payload.resize(packet.size, 0);
            let global = self.global.read();
            for (offset, byte) in (0u64..).zip(packet.payload.iter_mut()) {
                *byte = global.read_u8(packet.remote_address + offset)?;
            }
        }
        Ok(())
    }
}
