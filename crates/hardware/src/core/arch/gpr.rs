//! General-Purpose Register File.
//!
//! This module implements the register file of a tile processor.
//! It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`r0`-`r31`).
//! 2. **Invariant Enforcement:** Ensures that register `r0` is hardwired to zero.
//! 3. **Bounds Checking:** Rejects indices outside the file with `RegisterOutOfRange`.

use crate::common::constants::REGISTER_FILE_SIZE;
use crate::common::{SimError, SimResult};

/// General-Purpose Register file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gpr {
    regs: [u64; REGISTER_FILE_SIZE],
}

impl Gpr {
    /// Creates a register file with all registers initialized to zero.
    pub const fn new() -> Self {
        Self { regs: [0; REGISTER_FILE_SIZE] }
    }

    /// Reads a register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    ///
    /// # Returns
    ///
    /// The value, always 0 for `r0`, or `RegisterOutOfRange`.
    pub fn read(&self, idx: usize) -> SimResult<u64> {
        match idx {
            0 => Ok(0),
            _ => self.regs.get(idx).copied().ok_or(SimError::RegisterOutOfRange { index: idx }),
        }
    }

    /// Writes a register; writes to `r0` are discarded.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 64-bit value to write.
    pub fn write(&mut self, idx: usize, val: u64) -> SimResult<()> {
        let slot = self.regs.get_mut(idx).ok_or(SimError::RegisterOutOfRange { index: idx })?;
        if idx != 0 {
            *slot = val;
        }
        Ok(())
    }
}
