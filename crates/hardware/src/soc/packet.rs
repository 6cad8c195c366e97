//! Memory request descriptors.
//!
//! A `MemoryPacket` is what a processor hands to the interconnect; the
//! `PacketClock` trait is how the interconnect spends the requester's time.

use crate::common::SimResult;

/// One request travelling between a tile and global memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryPacket {
    /// Processor that issued the request.
    pub requester: usize,
    /// Global address read or written.
    pub remote_address: u64,
    /// Local address the data belongs to.
    pub local_address: u64,
    /// Bytes to transfer; zero for an address-only fetch.
    pub size: usize,
    /// Write packets deposit `payload` at `remote_address`.
    pub is_write: bool,
    /// Bytes read (filled on completion) or to be written.
    pub payload: Vec<u8>,
}

impl MemoryPacket {
    /// Builds a read of `size` bytes.
    pub const fn read(requester: usize, remote_address: u64, local_address: u64, size: usize) -> Self {
        Self { requester, remote_address, local_address, size, is_write: false, payload: Vec::new() }
    }

    /// Builds a write carrying `payload`.
    pub fn write(requester: usize, remote_address: u64, local_address: u64, payload: Vec<u8>) -> Self {
        Self { requester, remote_address, local_address, size: payload.len(), is_write: true, payload }
    }

    /// Builds the zero-size request used to time a remote register fetch.
    pub const fn fetch(requester: usize, remote_address: u64) -> Self {
        Self::read(requester, remote_address, 0, 0)
    }
}

/// Time source of the task routing a packet.
///
/// Every tick the interconnect spends on behalf of a request goes through
/// the requester's clock, so it is charged to the requester and counted by
/// the barrier.
pub trait PacketClock {
    /// Spends one global tick.
    fn wait_global_tick(&mut self) -> SimResult<()>;
    /// Counts one blocked attempt.
    fn record_block(&mut self);
    /// Counts one tick of memory-controller service.
    fn record_service_tick(&mut self);
}
