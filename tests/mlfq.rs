//! S5: under the MLFQ discipline, a thread with a higher `nice` value must
//! receive a strictly smaller share of the CPU than an otherwise identical
//! thread with `nice = 0`.

#![cfg(feature = "std-shim")]

use preempt_sched::arch::NoOpArch;
use preempt_sched::{Scheduler, SchedulingPolicy, StackSizeClass};

extern "C" fn noop_entry(_arg: usize) -> ! {
    loop {}
}

#[test]
fn s5_lower_nice_thread_gets_more_cpu_share() {
    let scheduler: Scheduler<NoOpArch> = Scheduler::new(SchedulingPolicy::Mlfq);

    let harness = scheduler
        .create(None, 31, StackSizeClass::Small, noop_entry, 0)
        .unwrap();
    assert_eq!(scheduler.start_for_test(), harness);

    let nice0 = scheduler.create(None, 31, StackSizeClass::Small, noop_entry, 0).unwrap();
    let nice5 = scheduler.create(None, 31, StackSizeClass::Small, noop_entry, 0).unwrap();
    scheduler.set_nice(nice5, 5);

    // With identical recent_cpu, the nicer thread's priority formula term
    // (2 * nice) alone puts it strictly below the nice=0 thread.
    assert!(scheduler.effective_priority_for_test(nice5) < scheduler.effective_priority_for_test(nice0));

    scheduler.exit_current_for_test(); // retire the setup harness

    // Simulate 10 seconds of two CPU-bound threads, letting on_tick's MLFQ
    // recompute and preemption check drive who actually gets to run.
    let mut ticks_run = [0u64; 2];
    for _ in 0..(10 * u64::from(preempt_sched::TIMER_FREQ)) {
        match scheduler.current() {
            Some(id) if id == nice0 => ticks_run[0] += 1,
            Some(id) if id == nice5 => ticks_run[1] += 1,
            _ => {}
        }
        if scheduler.on_tick() {
            scheduler.yield_now();
        }
    }

    assert!(
        ticks_run[1] < ticks_run[0],
        "nice=5 thread got {} ticks, nice=0 got {} ticks",
        ticks_run[1],
        ticks_run[0]
    );
}
