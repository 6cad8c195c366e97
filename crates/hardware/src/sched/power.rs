//! Power-gating bookkeeping.
//!
//! Models a fixed power budget: at most `max_active` cores may check in as
//! powered per tick, and cores that had to power down wait in a FIFO queue
//! until rotation hands power back to them.

use std::collections::VecDeque;

/// Outcome of a power-gate admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerAdmission {
    /// The task is not waiting for power and may run.
    Proceed,
    /// The task is queued for power and must spend a tick.
    Stall,
}

/// Power state guarded by the barrier's power lock.
#[derive(Debug)]
pub(crate) struct PowerState {
    /// Powered check-ins during the current tick.
    pub(crate) active: usize,
    /// Maximum powered check-ins per tick.
    pub(crate) max_active: usize,
    /// Tasks waiting for power, oldest first.
    pub(crate) waiting: VecDeque<usize>,
    /// Whether the start-up trim of the seeded queue has happened.
    pub(crate) trimmed: bool,
}

impl PowerState {
    pub(crate) const fn new(max_active: usize) -> Self {
        Self { active: 0, max_active, waiting: VecDeque::new(), trimmed: false }
    }

    /// Seeds the queue with every registered task.
    pub(crate) fn seed(&mut self, tasks: usize) {
        self.waiting = (0..tasks).collect();
        self.trimmed = false;
    }

    /// Hands power to the first `max_active` seeded tasks, once.
    pub(crate) fn trim_seeded(&mut self) {
        if self.trimmed {
            return;
        }
        let granted = self.max_active.min(self.waiting.len());
        drop(self.waiting.drain(..granted));
        self.trimmed = true;
    }

    /// Counts one powered check-in; false once the budget is exceeded.
    ///
    /// A dark tile draws nothing and is not counted.
    pub(crate) const fn check_in(&mut self, powered: bool, in_interrupt: bool) -> bool {
        if !powered {
            return true;
        }
        self.active += 1;
        self.active <= self.max_active || in_interrupt
    }

    pub(crate) fn admission(&self, task: usize) -> PowerAdmission {
        if self.waiting.contains(&task) { PowerAdmission::Stall } else { PowerAdmission::Proceed }
    }

    /// Appends `task` and releases the oldest waiter.
    pub(crate) fn rotate(&mut self, task: usize) -> Option<usize> {
        self.waiting.push_back(task);
        self.waiting.pop_front()
    }

    /// Releases the oldest waiter into a departing task's power slot.
    pub(crate) fn hand_off(&mut self) -> Option<usize> {
        self.waiting.pop_front()
    }
}
