//! # Memories

/// mmap-backed buffer bounds.
pub mod buffer;
