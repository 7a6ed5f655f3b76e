//! Strict-priority scheduling with priority donation.
//!
//! The ready queue always runs the highest `effective_priority` thread
//! available; among threads at the same priority, the one waiting longest
//! runs first (plain FIFO within a bucket) and a running thread's quantum
//! expiring yields to any other ready thread at its own priority level.
//! `effective_priority` — not `base_priority` — is what's compared, so a
//! donation (see [`crate::sync`]) immediately changes scheduling order.

use crate::thread::TIME_SLICE;

/// Per-tick bookkeeping for the currently running thread under this
/// discipline: decrement the quantum, report whether it has expired.
///
/// Expiry alone doesn't force a switch — only to a peer at the *same*
/// priority, since a strictly higher-priority ready thread always
/// preempts immediately regardless of the quantum (handled by the core
/// scheduler comparing priorities directly, not through this function).
pub fn tick_quantum(ticks_left: &mut u32) -> bool {
    *ticks_left = ticks_left.saturating_sub(1);
    if *ticks_left == 0 {
        *ticks_left = TIME_SLICE;
        true
    } else {
        false
    }
}
