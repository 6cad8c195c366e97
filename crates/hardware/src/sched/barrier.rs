//! Global tick barrier.
//!
//! The barrier owns the simulation's only clock. It performs the following:
//! 1. **Rendezvous:** Every registered task calls `release_to_run` once per tick; the
//!    last arrival advances the tick and wakes the others.
//! 2. **Registry:** Tasks join with `register_task` and leave with `deregister_task`;
//!    a departure that completes the current tick advances it immediately.
//! 3. **Start Gate:** `begin` releases tasks parked in `wait_for_start`.
//! 4. **Power Gating:** The per-tick power budget and the waiting-for-power queue.
//! 5. **Priority Lock:** A non-blocking lock for privileged global-memory access.
//! 6. **Abort:** A sticky flag that unwinds every waiter after a fatal error.
//!
//! Lock order is run state before power state; the power lock is never held
//! while acquiring the run lock.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use super::power::{PowerAdmission, PowerState};
use crate::common::error::{SimError, SimResult};
use crate::events::{EventBus, SimEvent};

/// Tick and registry state guarded by the run lock.
#[derive(Debug, Default)]
struct RunState {
    tick: u64,
    registered: usize,
    signed_in: usize,
    blocked: u64,
    begun: bool,
    aborted: bool,
}

/// Tick barrier shared by every processor task.
#[derive(Debug)]
pub struct Barrier {
    run: Mutex<RunState>,
    wake: Condvar,
    power: Mutex<PowerState>,
    priority: AtomicBool,
    events: EventBus,
}

impl Barrier {
    /// Creates a barrier at tick zero with no registered tasks.
    ///
    /// # Arguments
    ///
    /// * `max_active` - Power budget: powered check-ins allowed per tick.
    /// * `events` - Bus that receives a `TickAdvanced` event per tick.
    pub fn new(max_active: usize, events: EventBus) -> Self {
        Self {
            run: Mutex::new(RunState::default()),
            wake: Condvar::new(),
            power: Mutex::new(PowerState::new(max_active)),
            priority: AtomicBool::new(false),
            events,
        }
    }

    /// Current tick.
    pub fn tick(&self) -> u64 {
        self.run.lock().tick
    }

    /// Number of registered tasks.
    pub fn registered(&self) -> usize {
        self.run.lock().registered
    }

    /// Number of tasks that have signed in for the current tick.
    pub fn signed_in(&self) -> usize {
        self.run.lock().signed_in
    }

    /// Blocked attempts recorded during the current tick.
    pub fn blocked(&self) -> u64 {
        self.run.lock().blocked
    }

    /// Whether the simulation has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.run.lock().aborted
    }

    /// Adds one task to the set that must sign in each tick.
    pub fn register_task(&self) {
        self.run.lock().registered += 1;
    }

    /// Removes one task from the registry.
    ///
    /// If every remaining task has already signed in for the current tick,
    /// the tick advances here so the waiters are not stranded. The last task
    /// leaving closes the current tick.
    pub fn deregister_task(&self) {
        let mut state = self.run.lock();
        state.registered = state.registered.saturating_sub(1);
        if state.signed_in >= state.registered {
            let tick = self.advance(&mut state);
            drop(state);
            self.events.publish(&SimEvent::TickAdvanced { tick });
        }
    }

    /// Signs the caller in for the current tick.
    ///
    /// The last task to sign in advances the tick and returns without blocking;
    /// every other caller sleeps until that advance.
    ///
    /// # Returns
    ///
    /// The tick the caller now observes, or `Aborted`.
    pub fn release_to_run(&self) -> SimResult<u64> {
        let mut state = self.run.lock();
        if state.aborted {
            return Err(SimError::Aborted);
        }
        state.signed_in += 1;
        if state.signed_in >= state.registered {
            let tick = self.advance(&mut state);
            drop(state);
            self.events.publish(&SimEvent::TickAdvanced { tick });
            return Ok(tick);
        }

        let target = state.tick;
        while state.tick == target && !state.aborted {
            self.wake.wait(&mut state);
        }
        if state.tick == target {
            return Err(SimError::Aborted);
        }
        Ok(state.tick)
    }

    /// Advances the tick; caller holds the run lock.
    fn advance(&self, state: &mut RunState) -> u64 {
        state.signed_in = 0;
        state.tick += 1;
        if state.blocked > 0 {
            debug!(tick = state.tick, blocks = state.blocked, "On tick");
        }
        state.blocked = 0;
        self.power.lock().active = 0;
        let _ = self.wake.notify_all();
        state.tick
    }

    /// Counts one blocked attempt for the current tick's diagnostics.
    pub fn record_block(&self) {
        self.run.lock().blocked += 1;
    }

    /// Raises the begin signal and seeds the power queue with every registered task.
    pub fn begin(&self) {
        let mut state = self.run.lock();
        self.power.lock().seed(state.registered);
        state.begun = true;
        let _ = self.wake.notify_all();
        debug!(tasks = state.registered, "Simulation begins");
    }

    /// Parks the caller until `begin` has been raised.
    ///
    /// The first task through hands power to the first `max_active` seeded
    /// tasks, leaving the rest queued.
    pub fn wait_for_start(&self) -> SimResult<()> {
        let mut state = self.run.lock();
        while !state.begun && !state.aborted {
            self.wake.wait(&mut state);
        }
        if state.aborted {
            return Err(SimError::Aborted);
        }
        self.power.lock().trim_seeded();
        Ok(())
    }

    /// Counts a powered check-in for this tick.
    ///
    /// # Arguments
    ///
    /// * `powered` - Whether the caller's tile is powered; dark tiles are not counted.
    /// * `in_interrupt` - Callers inside an interrupt are never told to power down.
    ///
    /// # Returns
    ///
    /// `false` when the budget is exceeded and the caller must power its tile down.
    pub fn check_power_sufficiency(&self, powered: bool, in_interrupt: bool) -> bool {
        self.power.lock().check_in(powered, in_interrupt)
    }

    /// Decides whether `task` may run or is still waiting for power.
    pub fn power_gate_admission(&self, task: usize) -> PowerAdmission {
        self.power.lock().admission(task)
    }

    /// Queues `task` for power and releases the oldest waiter.
    pub fn rotate_power_queue(&self, task: usize) {
        let released = self.power.lock().rotate(task);
        debug!(task, ?released, "Power queue rotated");
    }

    /// Gives a finishing task's power to the oldest waiter.
    ///
    /// Without this, tasks still queued when the powered ones finish would
    /// stall forever.
    pub fn release_power_slot(&self) {
        if let Some(task) = self.power.lock().hand_off() {
            debug!(task, "Power handed off");
        }
    }

    /// Tasks currently waiting for power, oldest first.
    pub fn power_queue(&self) -> Vec<usize> {
        self.power.lock().waiting.iter().copied().collect()
    }

    /// Tries to take the priority lock without blocking.
    pub fn try_acquire_priority_lock(&self) -> bool {
        self.priority.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed).is_ok()
    }

    /// Releases the priority lock.
    pub fn release_priority_lock(&self) {
        self.priority.store(false, Ordering::Release);
    }

    /// Aborts the simulation; every current and future waiter returns `Aborted`.
    pub fn abort(&self) {
        let mut state = self.run.lock();
        state.aborted = true;
        let _ = self.wake.notify_all();
        trace!(tick = state.tick, "Barrier aborted");
    }
}
