//! Byte-store trait for local and global memory.
//!
//! This module defines the `ByteStore` trait implemented by every memory in the
//! simulator. It provides:
//! 1. **Identification:** `name` and `size` for diagnostics and bounds checks.
//! 2. **Access:** Byte, half, word, and doubleword read/write (little-endian).
//! 3. **Bulk Transfer:** Slice reads and writes used for block fills and write-backs.
//!
//! Every access is bounds-checked and reports `OutOfBounds` instead of panicking.

use crate::common::SimResult;

/// Flat byte-addressable store.
///
/// Implementors provide `read_bytes`/`write_bytes`; the typed accessors are
/// derived from them.
pub trait ByteStore: Send + Sync {
    /// Returns a short name for this store (e.g., `"LOCAL"`, `"GLOBAL"`).
    fn name(&self) -> &'static str;
    /// Returns the size of the store in bytes.
    fn size(&self) -> u64;
    /// Fills `buf` from `addr`.
    fn read_bytes(&self, addr: u64, buf: &mut [u8]) -> SimResult<()>;
    /// Writes `data` at `addr`.
    fn write_bytes(&mut self, addr: u64, data: &[u8]) -> SimResult<()>;

    /// Reads one byte.
    fn read_u8(&self, addr: u64) -> SimResult<u8> {
        let mut b = [0; 1];
        self.read_bytes(addr, &mut b)?;
        Ok(b[0])
    }
    /// Reads two bytes (little-endian).
    fn read_u16(&self, addr: u64) -> SimResult<u16> {
        let mut b = [0; 2];
        self.read_bytes(addr, &mut b)?;
        Ok(u16::from_le_bytes(b))
    }
    /// Reads four bytes (little-endian).
    fn read_u32(&self, addr: u64) -> SimResult<u32> {
        let mut b = [0; 4];
        self.read_bytes(addr, &mut b)?;
        Ok(u32::from_le_bytes(b))
    }
    /// Reads eight bytes (little-endian).
    fn read_u64(&self, addr: u64) -> SimResult<u64> {
        let mut b = [0; 8];
        self.read_bytes(addr, &mut b)?;
        Ok(u64::from_le_bytes(b))
    }
    /// Writes one byte.
    fn write_u8(&mut self, addr: u64, val: u8) -> SimResult<()> {
        self.write_bytes(addr, &[val])
    }
    /// Writes two bytes (little-endian).
    fn write_u16(&mut self, addr: u64, val: u16) -> SimResult<()> {
        self.write_bytes(addr, &val.to_le_bytes())
    }
    /// Writes four bytes (little-endian).
    fn write_u32(&mut self, addr: u64, val: u32) -> SimResult<()> {
        self.write_bytes(addr, &val.to_le_bytes())
    }
    /// Writes eight bytes (little-endian).
    fn write_u64(&mut self, addr: u64, val: u64) -> SimResult<()> {
        self.write_bytes(addr, &val.to_le_bytes())
    }
}
