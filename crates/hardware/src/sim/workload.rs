//! Per-processor memory-operation streams.
//!
//! A `Workload` is the ordered list of `MemoryOp`s one processor replays.
//! Workloads can be built in code or read from a JSON array such as
//! `[{"kind": "store", "address": 4096, "size": 8, "value": 7}]`.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{AccessType, SimError, SimResult, VirtAddr};

/// Widest single access in bytes.
pub const MAX_ACCESS_BYTES: usize = 8;

const fn default_size() -> usize {
    MAX_ACCESS_BYTES
}

/// One memory operation in virtual address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemoryOp {
    /// Kind of access.
    pub kind: AccessType,
    /// Virtual address.
    pub address: u64,
    /// Bytes accessed, 1 to 8.
    #[serde(default = "default_size")]
    pub size: usize,
    /// Value written by stores and read-modify-writes.
    #[serde(default)]
    pub value: u64,
}

impl MemoryOp {
    /// Instruction fetch of `size` bytes.
    pub const fn fetch(address: u64, size: usize) -> Self {
        Self { kind: AccessType::Fetch, address, size, value: 0 }
    }

    /// Load of `size` bytes.
    pub const fn load(address: u64, size: usize) -> Self {
        Self { kind: AccessType::Load, address, size, value: 0 }
    }

    /// Store of the low `size` bytes of `value`.
    pub const fn store(address: u64, size: usize, value: u64) -> Self {
        Self { kind: AccessType::Store, address, size, value }
    }

    /// Read-modify-write leaving `value` behind.
    pub const fn modify(address: u64, size: usize, value: u64) -> Self {
        Self { kind: AccessType::Modify, address, size, value }
    }

    /// Rejects sizes outside `1..=8`.
    pub fn validate(&self) -> SimResult<()> {
        if (1..=MAX_ACCESS_BYTES).contains(&self.size) {
            return Ok(());
        }
        Err(SimError::InvalidConfig(format!(
            "{:?} at {:#x} has size {}, expected 1 to {MAX_ACCESS_BYTES}",
            self.kind, self.address, self.size
        )))
    }
}

/// Ordered operations for one processor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Workload {
    ops: Vec<MemoryOp>,
}

impl Workload {
    /// Wraps `ops` in order.
    pub const fn new(ops: Vec<MemoryOp>) -> Self {
        Self { ops }
    }

    /// Parses a JSON array of operations and validates their sizes.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let workload: Self = serde_json::from_str(json)?;
        workload.validate()?;
        Ok(workload)
    }

    /// Reads a JSON array of operations from `path`.
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Operations in replay order.
    pub fn ops(&self) -> &[MemoryOp] {
        &self.ops
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether there are no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Checks every operation's size.
    pub fn validate(&self) -> SimResult<()> {
        self.ops.iter().try_for_each(MemoryOp::validate)
    }

    /// Appends one operation.
    pub fn push(&mut self, op: MemoryOp) {
        self.ops.push(op);
    }

    /// Page-aligned virtual addresses of every page the workload touches.
    ///
    /// Accesses running past the top of the address space stop at `u64::MAX`.
    pub fn footprint(&self, page_shift: u32) -> BTreeSet<u64> {
        let mut pages = BTreeSet::new();
        for op in &self.ops {
            let last = op.address.saturating_add(op.size.saturating_sub(1) as u64);
            let _ = pages.insert(VirtAddr::new(op.address).page_base(page_shift));
            let _ = pages.insert(VirtAddr::new(last).page_base(page_shift));
        }
        pages
    }
}

impl FromIterator<MemoryOp> for Workload {
    fn from_iter<I: IntoIterator<Item = MemoryOp>>(iter: I) -> Self {
        Self { ops: iter.into_iter().collect() }
    }
}
