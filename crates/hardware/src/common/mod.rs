//! Common utilities and types used throughout the tiled many-core simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Address Types:** A strong type for virtual addresses and its bit-slicing helpers.
//! 2. **Constants:** Page-table entry layout, flag bits, and walk geometry.
//! 3. **Memory Access:** Classification of workload memory operations.
//! 4. **Error Handling:** The `SimError` taxonomy and `SimResult` alias.

/// Virtual address type definition.
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types for fatal simulation conditions.
pub mod error;

pub use addr::{VirtAddr, bit_mask};
pub use data::AccessType;
pub use error::{SimError, SimResult};
