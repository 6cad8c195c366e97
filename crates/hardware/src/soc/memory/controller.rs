//! Memory-controller admission gate.
//!
//! Global memory accepts a bounded number of concurrent requests. The gate is a
//! monitor owning its counter: admission and completion are the only mutations,
//! each a single check-and-update under the gate's own lock.

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct GateState {
    in_flight: usize,
    high_water: usize,
    admitted: u64,
}

/// Bounded in-flight counter in front of global memory.
#[derive(Debug)]
pub struct AdmissionGate {
    limit: usize,
    state: Mutex<GateState>,
}

impl AdmissionGate {
    /// Creates a gate admitting at most `limit` concurrent requests.
    pub fn new(limit: usize) -> Self {
        Self { limit, state: Mutex::new(GateState::default()) }
    }

    /// Admission bound.
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Admits one request if the bound allows it.
    ///
    /// # Returns
    ///
    /// `true` if the request now holds a controller slot.
    pub fn try_admit(&self) -> bool {
        let mut state = self.state.lock();
        if state.in_flight >= self.limit {
            return false;
        }
        state.in_flight += 1;
        state.admitted += 1;
        state.high_water = state.high_water.max(state.in_flight);
        true
    }

    /// Releases a slot taken by `try_admit`.
    pub fn complete(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// Requests currently in service.
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Largest number of requests ever in service at once.
    pub fn high_water(&self) -> usize {
        self.state.lock().high_water
    }

    /// Total requests admitted.
    pub fn admitted(&self) -> u64 {
        self.state.lock().admitted
    }
}
