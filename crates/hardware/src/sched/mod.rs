//! Global tick scheduling.
//!
//! This module keeps every processor task on one logical clock. It provides:
//! 1. **Barrier:** Tick rendezvous with dynamic task registration, the begin signal,
//!    blocked-attempt bookkeeping, the priority lock, and simulation abort.
//! 2. **Power:** The per-tick power budget and the round-robin waiting queue.

/// Tick barrier and task registry.
pub mod barrier;

/// Power-gating bookkeeping shared with the barrier.
pub mod power;

pub use barrier::Barrier;
pub use power::PowerAdmission;
