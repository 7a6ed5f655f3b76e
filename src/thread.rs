//! Thread descriptors and the thread arena.
//!
//! Every thread the scheduler knows about lives in a single slab
//! (`Arena`), addressed by a stable [`ThreadId`]. Ready lists, the sleep
//! list, and lock waiter lists are all built out of the same intrusive
//! [`crate::list::List`] type, threaded through link fields stored
//! directly on the descriptor — nothing is copied in or out of a list,
//! only the small link fields are rewritten. This is the ownership-respecting
//! answer to "intrusive lists without a GC": the arena is the single owner,
//! `ThreadId` is a borrow-checker-friendly handle to it.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::arch::Arch;
use crate::fixed::Fixed;
use crate::mem::Stack;
use crate::time::Ticks;

/// Lowest valid priority.
pub const PRI_MIN: u8 = 0;
/// Highest valid priority.
pub const PRI_MAX: u8 = 63;
/// Priority threads start at absent an explicit request.
pub const PRI_DEFAULT: u8 = 31;
/// Lowest valid `nice` value.
pub const NICE_MIN: i32 = -20;
/// `nice` value new threads start at.
pub const NICE_DEFAULT: i32 = 0;
/// Highest valid `nice` value.
pub const NICE_MAX: i32 = 20;
/// Base time slice, in ticks, given to a thread before it is eligible for
/// preemption by a same-priority peer.
pub const TIME_SLICE: u32 = 4;

/// Sentinel written at a thread's stack base; checked on every reschedule
/// to catch stack overflow before it corrupts a neighboring allocation.
const STACK_CANARY: u64 = 0xDEAD_BEEF_CAFE_BABE;

/// Handle to a thread descriptor living in the [`Arena`]. Stable for the
/// thread's whole lifetime; never reused while the thread is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(usize);

impl ThreadId {
    fn from_index(index: usize) -> Self {
        ThreadId(index)
    }

    fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// A thread's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Running,
    Ready,
    Blocked,
    Dying,
}

/// Why a thread is [`ThreadState::Blocked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Not yet classified; set immediately after construction, never
    /// observed once a thread is actually blocked.
    Unknown,
    /// Sleeping until `wakeup` (see [`ThreadControlBlock::wakeup`]).
    Sleeping,
    /// Waiting to acquire a lock identified by [`LockId`].
    WaitingOnLock(LockId),
}

/// Opaque identifier for a lock, used only to record what a blocked thread
/// is waiting on for priority-donation bookkeeping (see [`crate::sync`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockId(pub usize);

/// Doubly-linked intrusive link. A thread sits on at most one "scheduling"
/// list at a time (ready queue, sleep list, or a lock's waiter list) plus
/// always on the all-threads list; those use separate link fields so the
/// two memberships never collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct Link {
    pub prev: Option<ThreadId>,
    pub next: Option<ThreadId>,
}

/// A thread descriptor.
pub struct ThreadControlBlock<A: Arch> {
    pub id: ThreadId,
    pub name: Option<String>,
    pub state: ThreadState,

    /// Priority as set by `create`/`set_priority`, ignoring donation.
    pub base_priority: u8,
    /// Priority currently in effect: `max(base_priority, donations)`. This
    /// is what the ready queue orders on.
    pub effective_priority: u8,

    /// `nice` value, MLFQ mode only.
    pub nice: i32,
    /// `recent_cpu`, MLFQ mode only: decayed measure of CPU time recently
    /// consumed, in 17.14 fixed point.
    pub recent_cpu: Fixed,

    pub block_reason: BlockReason,
    /// Absolute tick at which a sleeping thread should wake.
    pub wakeup: Ticks,

    /// Locks this thread currently holds, most-recently-acquired last.
    /// Used to walk the donation chain on release.
    pub owned_locks: Vec<LockId>,
    /// Lock this thread is blocked waiting to acquire, if any — the other
    /// end of a donation chain.
    pub waiting_on: Option<LockId>,

    /// Ticks remaining in the current time slice.
    pub ticks_left: u32,

    pub stack: Stack,
    pub context: <A as Arch>::SavedContext,

    pub sched_link: Link,
    pub all_link: Link,
}

impl<A: Arch> ThreadControlBlock<A> {
    /// Check the stack canary, returning `false` if it has been clobbered
    /// (stack overflow).
    pub fn check_stack(&self) -> bool {
        self.stack.check_canary(STACK_CANARY)
    }
}

/// The thread arena: a slab of descriptors addressed by [`ThreadId`].
///
/// IDs are never reused once assigned, so a stale `ThreadId` reliably
/// resolves to `None` rather than some other thread's descriptor.
pub struct Arena<A: Arch> {
    slots: Vec<Option<ThreadControlBlock<A>>>,
}

impl<A: Arch> Arena<A> {
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Allocate a fresh descriptor, installing the stack canary. Returns
    /// the new thread's id.
    pub fn insert(
        &mut self,
        name: Option<String>,
        priority: u8,
        mut stack: Stack,
        context: <A as Arch>::SavedContext,
    ) -> ThreadId {
        stack.install_canary(STACK_CANARY);
        let id = ThreadId::from_index(self.slots.len());
        self.slots.push(Some(ThreadControlBlock {
            id,
            name,
            state: ThreadState::Ready,
            base_priority: priority,
            effective_priority: priority,
            nice: NICE_DEFAULT,
            recent_cpu: Fixed::ZERO,
            block_reason: BlockReason::Unknown,
            wakeup: Ticks::ZERO,
            owned_locks: Vec::new(),
            waiting_on: None,
            ticks_left: TIME_SLICE,
            stack,
            context,
            sched_link: Link::default(),
            all_link: Link::default(),
        }));
        id
    }

    pub fn get(&self, id: ThreadId) -> Option<&ThreadControlBlock<A>> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: ThreadId) -> Option<&mut ThreadControlBlock<A>> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Remove a thread from the arena entirely. Callers must already have
    /// unlinked it from every list it was on.
    pub fn remove(&mut self, id: ThreadId) -> Option<ThreadControlBlock<A>> {
        self.slots.get_mut(id.index())?.take()
    }

    /// Iterate every live thread id, in arena order.
    pub fn ids(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| ThreadId::from_index(i)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl<A: Arch> Default for Arena<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::NoOpArch;
    use crate::mem::{StackPool, StackSizeClass};

    fn make_stack() -> Stack {
        StackPool::new().allocate(StackSizeClass::Small).unwrap()
    }

    #[test]
    fn insert_and_get() {
        let mut arena: Arena<NoOpArch> = Arena::new();
        let id = arena.insert(None, PRI_DEFAULT, make_stack(), Default::default());
        assert_eq!(arena.len(), 1);
        let tcb = arena.get(id).unwrap();
        assert_eq!(tcb.base_priority, PRI_DEFAULT);
        assert_eq!(tcb.state, ThreadState::Ready);
        assert!(tcb.check_stack());
    }

    #[test]
    fn remove_frees_slot_but_not_id() {
        let mut arena: Arena<NoOpArch> = Arena::new();
        let id = arena.insert(None, PRI_DEFAULT, make_stack(), Default::default());
        assert!(arena.remove(id).is_some());
        assert!(arena.get(id).is_none());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn ids_skip_removed_slots() {
        let mut arena: Arena<NoOpArch> = Arena::new();
        let a = arena.insert(None, PRI_DEFAULT, make_stack(), Default::default());
        let b = arena.insert(None, PRI_DEFAULT, make_stack(), Default::default());
        arena.remove(a);
        let ids: Vec<_> = arena.ids().collect();
        assert_eq!(ids, alloc::vec![b]);
    }
}
