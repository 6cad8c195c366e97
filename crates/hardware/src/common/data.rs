//! Memory Access Types.
//!
//! This module defines the classification of memory operations issued by workloads.
//! These types are used for the following:
//! 1. **Translation:** Choosing between read and write translation paths.
//! 2. **Fault Flags:** Deciding whether a freshly faulted page starts READ-ONLY.
//! 3. **Interconnect Timing:** Write packets pay the write service factor.

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Instruction fetch; moves the program counter and reads through translation.
    Fetch,

    /// Data load.
    Load,

    /// Data store.
    Store,

    /// Read-modify-write of the same location.
    Modify,
}

impl AccessType {
    /// Returns true if the access writes memory.
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Store | Self::Modify)
    }
}
