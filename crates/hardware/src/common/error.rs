//! Simulation error definitions.
//!
//! This module defines the fatal conditions of the simulator. It provides:
//! 1. **Configuration Errors:** Malformed global page tables, bad register indices,
//!    stack bound violations, and topology admission failures.
//! 2. **Storage Errors:** Out-of-bounds accesses to a local or global store.
//! 3. **Coordination Errors:** Aborts raised by another task's fatal error.
//!
//! Expected conditions (TLB misses, faults, contention) are never errors.

use thiserror::Error;

/// Level of the global page-table walk, reported in `MalformedPageTable`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkLevel {
    /// Top level, indexed by bits 37..47.
    SuperDirectory,
    /// Second level, indexed by bits 28..36.
    Directory,
    /// Third level, indexed by bits 19..27.
    SuperTable,
    /// Final level, indexed by the page number within a 512 KiB span.
    Table,
}

impl std::fmt::Display for WalkLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::SuperDirectory => "SuperDirectory",
            Self::Directory => "Directory",
            Self::SuperTable => "SuperTable",
            Self::Table => "Table",
        };
        f.write_str(name)
    }
}

/// Fatal simulator errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// A zero pointer was found while walking the global page table.
    #[error("Bad {level}: {address:#x}")]
    MalformedPageTable {
        /// Level at which the zero pointer was read.
        level: WalkLevel,
        /// Virtual address being resolved.
        address: u64,
    },

    /// A register index outside the register file was used.
    #[error("register index {index} out of range")]
    RegisterOutOfRange {
        /// Offending index.
        index: usize,
    },

    /// A push would run past the top of the local stack.
    #[error("stack overflow at sp {sp:#x}")]
    StackOverflow {
        /// Stack pointer at the failed push.
        sp: u64,
    },

    /// A pop was issued on an empty stack.
    #[error("stack underflow at sp {sp:#x}")]
    StackUnderflow {
        /// Stack pointer at the failed pop.
        sp: u64,
    },

    /// The processor's route into the interconnect does not reach the memory controller.
    #[error("processor {processor} cannot be admitted upstream")]
    AdmissionRejected {
        /// Requesting processor.
        processor: usize,
    },

    /// An access fell outside a byte store.
    #[error("{store} access at {address:#x}+{len} exceeds size {size:#x}")]
    OutOfBounds {
        /// Name of the store.
        store: &'static str,
        /// First byte accessed.
        address: u64,
        /// Access length in bytes.
        len: usize,
        /// Size of the store in bytes.
        size: u64,
    },

    /// An access runs past the top of the 64-bit address space.
    #[error("access at {address:#x}+{len} wraps the address space")]
    AddressOverflow {
        /// First byte accessed.
        address: u64,
        /// Access length in bytes.
        len: u64,
    },

    /// Every frame of a processor is pinned.
    #[error("processor {processor} has no evictable frame")]
    NoEvictableFrame {
        /// Processor whose frames are all FIXED.
        processor: usize,
    },

    /// The global page-table region cannot hold another table.
    #[error("global page-table region exhausted ({needed} bytes requested)")]
    PageTableExhausted {
        /// Bytes requested for the new table or page.
        needed: u64,
    },

    /// The configuration is internally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// An I/O error (config file or host memory mapping).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A processor thread panicked.
    #[error("processor {processor} panicked")]
    TaskPanicked {
        /// Processor whose thread panicked.
        processor: usize,
    },

    /// The simulation was aborted by a fatal error on another task.
    #[error("simulation aborted")]
    Aborted,
}

/// Result alias used throughout the simulator.
pub type SimResult<T> = Result<T, SimError>;
