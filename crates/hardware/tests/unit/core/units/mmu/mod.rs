//! # MMU




/// Global walk index decomposition.
pub mod ptw;

/// TLB fills and invalidation.
pub mod tlb;
