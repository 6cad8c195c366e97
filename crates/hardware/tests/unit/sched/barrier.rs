//! Barrier Tests.
//!
//! Verifies the global tick rendezvous:
//! - Single-task advance and tick monotonicity
//! - No missed wake-ups across many tasks
//! - Deregistration completing a tick
//! - Start gate, priority lock, and abort

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use tilesim_core::common::SimError;
use tilesim_core::events::{EventBus, EventCounter};
use tilesim_core::sched::Barrier;

fn barrier() -> Arc<Barrier> {
    Arc::new(Barrier::new(4, EventBus::new()))
}

fn wait_until(check: impl Fn() -> bool) {
    while !check() {
        thread::yield_now();
    }
}

// ══════════════════════════════════════════════════════════
// 1. Rendezvous
// ══════════════════════════════════════════════════════════

#[test]
fn single_task_advances_without_blocking() {
    let barrier = barrier();
    barrier.register_task();
    assert_eq!(barrier.release_to_run().unwrap(), 1);
    assert_eq!(barrier.release_to_run().unwrap(), 2);
    assert_eq!(barrier.tick(), 2);
}

#[test]
fn tick_waits_for_every_registered_task() {
    let barrier = barrier();
    barrier.register_task();
    barrier.register_task();
    let waiter = {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || barrier.release_to_run())
    };
    wait_until(|| barrier.signed_in() == 1);
    assert_eq!(barrier.tick(), 0);
    assert_eq!(barrier.release_to_run().unwrap(), 1);
    assert_eq!(waiter.join().unwrap().unwrap(), 1);
}

#[test]
fn every_tick_publishes_an_event() {
    let events = EventBus::new();
    let counter = Arc::new(EventCounter::new());
    events.subscribe(counter.clone());
    let barrier = Barrier::new(1, events);
    barrier.register_task();
    for _ in 0..5 {
        let _ = barrier.release_to_run().unwrap();
    }
    assert_eq!(counter.ticks(), 5);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn ticks_are_monotonic_and_nobody_is_stranded(tasks in 1usize..=64, rounds in 1u64..=20) {
        let barrier = barrier();
        for _ in 0..tasks {
            barrier.register_task();
        }
        let handles: Vec<_> = (0..tasks)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    for _ in 0..rounds {
                        seen.push(barrier.release_to_run().unwrap());
                    }
                    seen
                })
            })
            .collect();
        for handle in handles {
            let seen = handle.join().unwrap();
            prop_assert!(seen.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(seen.len() as u64, rounds);
        }
        prop_assert_eq!(barrier.tick(), rounds);
    }
}

// ══════════════════════════════════════════════════════════
// 2. Registry
// ══════════════════════════════════════════════════════════

#[test]
fn deregistration_completes_a_tick_exactly_once() {
    let barrier = barrier();
    for _ in 0..3 {
        barrier.register_task();
    }
    let waiters: Vec<_> = (0..2)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || barrier.release_to_run())
        })
        .collect();
    wait_until(|| barrier.signed_in() == 2);
    barrier.deregister_task();
    for waiter in waiters {
        assert_eq!(waiter.join().unwrap().unwrap(), 1);
    }
    assert_eq!(barrier.tick(), 1);
    assert_eq!(barrier.registered(), 2);
}

#[test]
fn deregistration_without_sign_ins_waits_for_remaining_tasks() {
    let barrier = barrier();
    barrier.register_task();
    barrier.register_task();
    barrier.deregister_task();
    assert_eq!(barrier.tick(), 0);
    assert_eq!(barrier.registered(), 1);
}

#[test]
fn last_task_leaving_closes_the_tick_once() {
    let barrier = barrier();
    barrier.register_task();
    barrier.deregister_task();
    assert_eq!(barrier.tick(), 1);
    assert_eq!(barrier.registered(), 0);
    assert_eq!(barrier.signed_in(), 0);
}

#[test]
fn blocked_attempts_reset_each_tick() {
    let barrier = barrier();
    barrier.register_task();
    barrier.record_block();
    barrier.record_block();
    assert_eq!(barrier.blocked(), 2);
    let _ = barrier.release_to_run().unwrap();
    assert_eq!(barrier.blocked(), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Start Gate, Priority Lock, Abort
// ══════════════════════════════════════════════════════════

#[test]
fn wait_for_start_parks_until_begin() {
    let barrier = barrier();
    barrier.register_task();
    let starter = {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || barrier.wait_for_start())
    };
    barrier.begin();
    starter.join().unwrap().unwrap();
    barrier.wait_for_start().unwrap();
}

#[test]
fn priority_lock_is_exclusive() {
    let barrier = barrier();
    assert!(barrier.try_acquire_priority_lock());
    assert!(!barrier.try_acquire_priority_lock());
    barrier.release_priority_lock();
    assert!(barrier.try_acquire_priority_lock());
}

#[test]
fn abort_unwinds_waiters() {
    let barrier = barrier();
    barrier.register_task();
    barrier.register_task();
    let waiter = {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || barrier.release_to_run())
    };
    wait_until(|| barrier.signed_in() == 1);
    barrier.abort();
    assert!(matches!(waiter.join().unwrap(), Err(SimError::Aborted)));
    assert!(matches!(barrier.release_to_run(), Err(SimError::Aborted)));
    assert!(barrier.is_aborted());
}
