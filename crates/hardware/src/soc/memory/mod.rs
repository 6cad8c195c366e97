//! Local and Global Stores.
//!
//! This module implements the byte stores of the machine. It provides:
//! 1. **Buffer:** Backing storage (`DramBuffer`) for store contents.
//! 2. **Memory:** A named, bounds-checked `ByteStore` over a buffer; each tile owns a
//!    local one and all tiles share one global one.
//! 3. **Controller:** The bounded admission gate in front of global memory.

/// Lazily allocated backing storage.
pub mod buffer;

/// Memory-controller admission gate.
pub mod controller;

use self::buffer::DramBuffer;
use crate::common::{SimError, SimResult};
use crate::soc::traits::ByteStore;

/// A flat, zero-initialised store.
#[derive(Debug)]
pub struct Memory {
    name: &'static str,
    buffer: DramBuffer,
}

impl Memory {
    /// Creates a zeroed store.
    ///
    /// # Arguments
    ///
    /// * `name` - Label used in diagnostics.
    /// * `size` - Size in bytes.
    pub fn new(name: &'static str, size: u64) -> SimResult<Self> {
        let size = usize::try_from(size)
            .map_err(|_| SimError::InvalidConfig(format!("{name} size {size:#x} exceeds host address space")))?;
        Ok(Self { name, buffer: DramBuffer::new(size)? })
    }

    fn out_of_bounds(&self, address: u64, len: usize) -> SimError {
        SimError::OutOfBounds { store: self.name, address, len, size: self.buffer.len() as u64 }
    }

    fn offset(&self, address: u64, len: usize) -> SimResult<usize> {
        usize::try_from(address).map_err(|_| self.out_of_bounds(address, len))
    }
}

impl ByteStore for Memory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn size(&self) -> u64 {
        self.buffer.len() as u64
    }

    fn read_bytes(&self, addr: u64, buf: &mut [u8]) -> SimResult<()> {
        let offset = self.offset(addr, buf.len())?;
        let src = self.buffer.read_slice(offset, buf.len()).ok_or_else(|| self.out_of_bounds(addr, buf.len()))?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write_bytes(&mut self, addr: u64, data: &[u8]) -> SimResult<()> {
        let offset = self.offset(addr, data.len())?;
        let err = self.out_of_bounds(addr, data.len());
        let dst = self.buffer.slice_mut(offset, data.len()).ok_or(err)?;
        dst.copy_from_slice(data);
        Ok(())
    }
}
