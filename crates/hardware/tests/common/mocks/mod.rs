//! Mock collaborators.

/// Barrier-backed `PacketClock` for driving the interconnect without a processor.
pub mod clock;

/// Event sinks: a mockall mock and a recorder.
pub mod events;
