//! S4: sleep_until issued by several threads at staggered ticks. Each must
//! wake no earlier than its requested tick, and waking order must track
//! ascending wake time rather than the order threads went to sleep in.

#![cfg(feature = "std-shim")]

use preempt_sched::arch::NoOpArch;
use preempt_sched::{Scheduler, SchedulingPolicy, StackSizeClass, ThreadState};

extern "C" fn noop_entry(_arg: usize) -> ! {
    loop {}
}

fn new_scheduler() -> Scheduler<NoOpArch> {
    Scheduler::new(SchedulingPolicy::Priority)
}

fn advance(scheduler: &Scheduler<NoOpArch>, n: u64) {
    for _ in 0..n {
        scheduler.on_tick();
    }
}

/// Each of five threads sleeps for exactly 10 ticks from its own staggered
/// start tick; none may be woken before its absolute wake tick arrives.
#[test]
fn s4_threads_never_wake_before_their_requested_tick() {
    let scheduler = new_scheduler();
    let harness = scheduler
        .create(None, 63, StackSizeClass::Small, noop_entry, 0)
        .unwrap();
    assert_eq!(scheduler.start_for_test(), harness);

    let sleepers: [_; 5] = core::array::from_fn(|_| {
        scheduler.create(None, 10, StackSizeClass::Small, noop_entry, 0).unwrap()
    });

    // Start ticks 0, 2, 4, 6, 8; each sleeps 10 ticks, so wake ticks are
    // 10, 12, 14, 16, 18.
    for &sleeper in &sleepers {
        scheduler.set_current_for_test(sleeper);
        let now = scheduler.ticks_now();
        scheduler.sleep_until(now + 10);
        advance(&scheduler, 2);
    }

    // Clock is at 10 already (5 * 2 advances); sleepers[0]'s wake tick.
    assert_eq!(scheduler.ticks_now().0, 10);
    assert_eq!(scheduler.state_for_test(sleepers[0]), Some(ThreadState::Ready));
    for &still_asleep in &sleepers[1..] {
        assert_eq!(scheduler.state_for_test(still_asleep), Some(ThreadState::Blocked));
    }

    advance(&scheduler, 2); // tick 12
    assert_eq!(scheduler.state_for_test(sleepers[1]), Some(ThreadState::Ready));
    assert_eq!(scheduler.state_for_test(sleepers[2]), Some(ThreadState::Blocked));

    advance(&scheduler, 2); // tick 14
    assert_eq!(scheduler.state_for_test(sleepers[2]), Some(ThreadState::Ready));

    advance(&scheduler, 2); // tick 16
    assert_eq!(scheduler.state_for_test(sleepers[3]), Some(ThreadState::Ready));

    advance(&scheduler, 2); // tick 18
    assert_eq!(scheduler.state_for_test(sleepers[4]), Some(ThreadState::Ready));
}

/// Threads go to sleep in an order that does not match their eventual wake
/// order; wake order must follow ascending wake time regardless.
#[test]
fn s4_wake_order_follows_wake_time_not_insertion_order() {
    let scheduler = new_scheduler();
    let harness = scheduler
        .create(None, 63, StackSizeClass::Small, noop_entry, 0)
        .unwrap();
    assert_eq!(scheduler.start_for_test(), harness);

    let a = scheduler.create(None, 10, StackSizeClass::Small, noop_entry, 0).unwrap();
    let b = scheduler.create(None, 10, StackSizeClass::Small, noop_entry, 0).unwrap();
    let c = scheduler.create(None, 10, StackSizeClass::Small, noop_entry, 0).unwrap();

    // All three go to sleep at tick 0, but request wake ticks 30, 10, 20 —
    // inserted in an order (a, b, c) that disagrees with ascending wake
    // order (b, c, a).
    scheduler.set_current_for_test(a);
    scheduler.sleep_until(scheduler.ticks_now() + 30);
    scheduler.set_current_for_test(b);
    scheduler.sleep_until(scheduler.ticks_now() + 10);
    scheduler.set_current_for_test(c);
    scheduler.sleep_until(scheduler.ticks_now() + 20);

    advance(&scheduler, 10);
    assert_eq!(scheduler.state_for_test(b), Some(ThreadState::Ready));
    assert_eq!(scheduler.state_for_test(c), Some(ThreadState::Blocked));
    assert_eq!(scheduler.state_for_test(a), Some(ThreadState::Blocked));

    advance(&scheduler, 10);
    assert_eq!(scheduler.state_for_test(c), Some(ThreadState::Ready));
    assert_eq!(scheduler.state_for_test(a), Some(ThreadState::Blocked));

    advance(&scheduler, 10);
    assert_eq!(scheduler.state_for_test(a), Some(ThreadState::Ready));
}
