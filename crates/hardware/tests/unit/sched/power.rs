//! Power Gating Tests.

use tilesim_core::events::EventBus;
use tilesim_core::sched::{Barrier, PowerAdmission};

fn begun(max_active: usize, tasks: usize) -> Barrier {
    let barrier = Barrier::new(max_active, EventBus::new());
    for _ in 0..tasks {
        barrier.register_task();
    }
    barrier.begin();
    barrier.wait_for_start().unwrap();
    barrier
}

#[test]
fn start_grants_power_to_first_tasks() {
    let barrier = begun(2, 5);
    assert_eq!(barrier.power_queue(), vec![2, 3, 4]);
    assert_eq!(barrier.power_gate_admission(0), PowerAdmission::Proceed);
    assert_eq!(barrier.power_gate_admission(3), PowerAdmission::Stall);
}

#[test]
fn budget_is_per_tick() {
    let barrier = begun(1, 1);
    assert!(barrier.check_power_sufficiency(true, false));
    assert!(!barrier.check_power_sufficiency(true, false));
    assert!(barrier.check_power_sufficiency(true, true));
    let _ = barrier.release_to_run().unwrap();
    assert!(barrier.check_power_sufficiency(true, false));
}

#[test]
fn dark_tiles_do_not_use_the_budget() {
    let barrier = begun(1, 2);
    assert!(barrier.check_power_sufficiency(false, false));
    assert!(barrier.check_power_sufficiency(false, false));
    assert!(barrier.check_power_sufficiency(true, false));
    assert!(!barrier.check_power_sufficiency(true, false));
}

#[test]
fn rotation_is_round_robin() {
    let barrier = begun(1, 3);
    assert_eq!(barrier.power_queue(), vec![1, 2]);
    barrier.rotate_power_queue(0);
    assert_eq!(barrier.power_queue(), vec![2, 0]);
    assert_eq!(barrier.power_gate_admission(1), PowerAdmission::Proceed);
    barrier.rotate_power_queue(1);
    assert_eq!(barrier.power_queue(), vec![0, 1]);
}

#[test]
fn finishing_task_hands_power_to_oldest_waiter() {
    let barrier = begun(1, 3);
    barrier.release_power_slot();
    assert_eq!(barrier.power_queue(), vec![2]);
    assert_eq!(barrier.power_gate_admission(1), PowerAdmission::Proceed);
}
