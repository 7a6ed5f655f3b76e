//! Priority donation and the `Lock` primitive used to exercise it.
//!
//! Donation only matters under [`crate::sched::SchedulingPolicy::Priority`]:
//! MLFQ recomputes `effective_priority` on its own schedule and ignores
//! donation entirely (spec.md §4.6's Non-goal). [`Lock`] is the minimal
//! external collaborator needed to make the donation chain testable —
//! a mutex with no fairness guarantee beyond "highest donated priority
//! among waiters wins when the holder releases".

extern crate alloc;
use alloc::vec::Vec;

use crate::arch::Arch;
use crate::list::{LinkKind, List};
use crate::sched::ReadyQueue;
use crate::thread::{Arena, LockId, ThreadId, ThreadState};

/// A single lock: who holds it, and who is waiting.
pub struct Lock {
    id: LockId,
    holder: Option<ThreadId>,
    waiters: List,
}

impl Lock {
    fn new(id: LockId) -> Self {
        Self {
            id,
            holder: None,
            waiters: List::new(LinkKind::Sched),
        }
    }

    pub fn id(&self) -> LockId {
        self.id
    }

    pub fn holder(&self) -> Option<ThreadId> {
        self.holder
    }

    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }

    pub fn waiters<'a, A: Arch>(&self, arena: &'a Arena<A>) -> impl Iterator<Item = ThreadId> + 'a {
        self.waiters.iter(arena)
    }
}

/// Arena of locks, mirroring [`Arena`]'s slab-by-id design at a much
/// smaller scale (locks are never freed individually in this scheduler
/// core; callers create them for the lifetime of the subsystem that uses
/// them).
pub struct LockTable {
    locks: Vec<Lock>,
}

impl LockTable {
    pub const fn new() -> Self {
        Self { locks: Vec::new() }
    }

    pub fn create(&mut self) -> LockId {
        let id = LockId(self.locks.len());
        self.locks.push(Lock::new(id));
        id
    }

    pub fn get(&self, id: LockId) -> &Lock {
        &self.locks[id.0]
    }

    fn get_mut(&mut self, id: LockId) -> &mut Lock {
        &mut self.locks[id.0]
    }
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of attempting to acquire a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Lock was free; caller now owns it and may keep running.
    Acquired,
    /// Lock was held; caller has been enqueued as a waiter and must block.
    MustBlock,
}

/// Attempt to acquire `lock_id` on behalf of `thread`. If the lock is
/// held, registers `thread` as a waiter and donates its priority up the
/// holder's chain; the caller is responsible for actually transitioning
/// `thread` to [`ThreadState::Blocked`] when this returns `MustBlock`.
pub fn acquire<A: Arch>(
    arena: &mut Arena<A>,
    ready: &mut ReadyQueue,
    locks: &mut LockTable,
    lock_id: LockId,
    thread: ThreadId,
) -> AcquireOutcome {
    let holder = locks.get(lock_id).holder();

    match holder {
        None => {
            locks.get_mut(lock_id).holder = Some(thread);
            if let Some(tcb) = arena.get_mut(thread) {
                tcb.owned_locks.push(lock_id);
            }
            AcquireOutcome::Acquired
        }
        Some(holder) => {
            locks.get_mut(lock_id).waiters.push_back(arena, thread);
            if let Some(tcb) = arena.get_mut(thread) {
                tcb.waiting_on = Some(lock_id);
            }
            let priority = arena.get(thread).map(|t| t.effective_priority).unwrap_or(0);
            donate(arena, ready, locks, holder, priority);
            AcquireOutcome::MustBlock
        }
    }
}

/// Release `lock_id`, held by `owner`, and hand it directly to the
/// highest-priority waiter (oldest first among ties), if any: that waiter
/// becomes the new holder right here, not merely "woken to go retry" — a
/// caller resuming from a blocked `lock_acquire` must already own the lock
/// by the time it runs again, since nothing re-attempts the acquire for
/// it. Also recomputes `owner`'s `effective_priority` now that it may no
/// longer be borrowing priority from this lock's waiters, and has any
/// remaining waiters re-donate to the new holder.
///
/// Returns the thread that now holds the lock, if the wait list was
/// non-empty, so the caller can move it to the ready queue.
pub fn release<A: Arch>(
    arena: &mut Arena<A>,
    ready: &mut ReadyQueue,
    locks: &mut LockTable,
    lock_id: LockId,
    owner: ThreadId,
) -> Vec<ThreadId> {
    {
        let lock = locks.get_mut(lock_id);
        debug_assert_eq!(lock.holder, Some(owner), "release by non-holder");
        lock.holder = None;
    }
    if let Some(tcb) = arena.get_mut(owner) {
        tcb.owned_locks.retain(|&id| id != lock_id);
    }
    recompute_after_release(arena, ready, locks, owner);

    let winner = {
        let lock = locks.get(lock_id);
        let mut best: Option<(ThreadId, u8)> = None;
        for waiter in lock.waiters.iter(arena) {
            let priority = arena.get(waiter).map(|t| t.effective_priority).unwrap_or(0);
            if best.map(|(_, best_priority)| priority > best_priority).unwrap_or(true) {
                best = Some((waiter, priority));
            }
        }
        best.map(|(id, _)| id)
    };

    let Some(winner) = winner else {
        return Vec::new();
    };

    {
        let lock = locks.get_mut(lock_id);
        lock.waiters.remove(arena, winner);
        lock.holder = Some(winner);
    }
    if let Some(tcb) = arena.get_mut(winner) {
        tcb.owned_locks.push(lock_id);
        tcb.waiting_on = None;
    }

    // Anyone still waiting on this lock was donating to `owner`; re-point
    // that donation at the new holder.
    let remaining: Vec<ThreadId> = locks.get(lock_id).waiters(arena).collect();
    for waiter in remaining {
        let priority = arena.get(waiter).map(|t| t.effective_priority).unwrap_or(0);
        donate(arena, ready, locks, winner, priority);
    }

    alloc::vec![winner]
}

/// Recompute `owner`'s effective priority as
/// `max(base_priority, highest effective priority among all threads still
/// waiting on locks `owner` holds)`, reordering it in the ready queue if
/// it changed and it is currently ready.
fn recompute_after_release<A: Arch>(arena: &mut Arena<A>, ready: &mut ReadyQueue, locks: &LockTable, owner: ThreadId) {
    let (base_priority, old_priority, state, owned_locks) = {
        let tcb = match arena.get(owner) {
            Some(t) => t,
            None => return,
        };
        (tcb.base_priority, tcb.effective_priority, tcb.state, tcb.owned_locks.clone())
    };

    let mut new_priority = base_priority;
    for lock_id in owned_locks {
        for waiter in locks.get(lock_id).waiters(arena) {
            if let Some(w) = arena.get(waiter) {
                new_priority = new_priority.max(w.effective_priority);
            }
        }
    }

    if new_priority == old_priority {
        return;
    }
    if let Some(tcb) = arena.get_mut(owner) {
        tcb.effective_priority = new_priority;
    }
    if state == ThreadState::Ready {
        ready.reorder(arena, owner, old_priority, new_priority);
    }
}

/// Donate `priority` to `receiver`, propagating transitively through any
/// lock chain `receiver` is itself blocked on — the nested-donation case
/// (a thread's priority boost rippling through several lock holders).
pub fn donate<A: Arch>(arena: &mut Arena<A>, ready: &mut ReadyQueue, locks: &LockTable, receiver: ThreadId, priority: u8) {
    let mut current = receiver;
    loop {
        let (old_priority, state, waiting_on) = {
            let tcb = match arena.get(current) {
                Some(t) => t,
                None => return,
            };
            if priority <= tcb.effective_priority {
                return;
            }
            (tcb.effective_priority, tcb.state, tcb.waiting_on)
        };

        if let Some(tcb) = arena.get_mut(current) {
            tcb.effective_priority = priority;
        }
        if state == ThreadState::Ready {
            ready.reorder(arena, current, old_priority, priority);
        }

        match waiting_on {
            Some(lock_id) => match locks.get(lock_id).holder() {
                Some(next) => current = next,
                None => return,
            },
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::NoOpArch;
    use crate::mem::{StackPool, StackSizeClass};
    use crate::thread::PRI_DEFAULT;

    fn spawn(arena: &mut Arena<NoOpArch>, priority: u8) -> ThreadId {
        let pool = StackPool::new();
        let stack = pool.allocate(StackSizeClass::Small).unwrap();
        arena.insert(None, priority, stack, Default::default())
    }

    #[test]
    fn uncontended_acquire_succeeds_immediately() {
        let mut arena = Arena::new();
        let mut ready = ReadyQueue::new();
        let mut locks = LockTable::new();
        let lock_id = locks.create();
        let t = spawn(&mut arena, PRI_DEFAULT);

        let outcome = acquire(&mut arena, &mut ready, &mut locks, lock_id, t);
        assert_eq!(outcome, AcquireOutcome::Acquired);
        assert_eq!(locks.get(lock_id).holder(), Some(t));
    }

    #[test]
    fn low_priority_holder_is_boosted_by_waiter() {
        let mut arena = Arena::new();
        let mut ready = ReadyQueue::new();
        let mut locks = LockTable::new();
        let lock_id = locks.create();

        let low = spawn(&mut arena, 10);
        let high = spawn(&mut arena, 50);

        assert_eq!(acquire(&mut arena, &mut ready, &mut locks, lock_id, low), AcquireOutcome::Acquired);
        assert_eq!(acquire(&mut arena, &mut ready, &mut locks, lock_id, high), AcquireOutcome::MustBlock);

        assert_eq!(arena.get(low).unwrap().effective_priority, 50);
    }

    #[test]
    fn release_restores_base_priority_with_no_other_waiters() {
        let mut arena = Arena::new();
        let mut ready = ReadyQueue::new();
        let mut locks = LockTable::new();
        let lock_id = locks.create();

        let low = spawn(&mut arena, 10);
        let high = spawn(&mut arena, 50);
        acquire(&mut arena, &mut ready, &mut locks, lock_id, low);
        acquire(&mut arena, &mut ready, &mut locks, lock_id, high);

        let woken = release(&mut arena, &mut ready, &mut locks, lock_id, low);
        assert_eq!(woken, alloc::vec![high]);
        assert_eq!(arena.get(low).unwrap().effective_priority, 10);
    }

    #[test]
    fn nested_donation_propagates_through_chain() {
        let mut arena = Arena::new();
        let mut ready = ReadyQueue::new();
        let mut locks = LockTable::new();
        let lock_a = locks.create();
        let lock_b = locks.create();

        let low = spawn(&mut arena, 10);
        let mid = spawn(&mut arena, 20);
        let high = spawn(&mut arena, 50);

        acquire(&mut arena, &mut ready, &mut locks, lock_a, low);
        acquire(&mut arena, &mut ready, &mut locks, lock_b, mid);
        acquire(&mut arena, &mut ready, &mut locks, lock_a, mid);
        acquire(&mut arena, &mut ready, &mut locks, lock_b, high);

        assert_eq!(arena.get(mid).unwrap().effective_priority, 50);
        assert_eq!(arena.get(low).unwrap().effective_priority, 50);
    }
}
