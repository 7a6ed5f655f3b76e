//! The scheduler core: the single object that owns the thread arena, the
//! ready queue, the sleep list, and the lock table, and drives every
//! thread-lifecycle operation and the timer tick.
//!
//! Every public method here disables interrupts for its duration
//! ([`InterruptGuard`]) — that is the only synchronization this crate
//! uses. The `spin::Mutex` wrapping the scheduler's internal state exists
//! for the same reason the teacher crate reaches for one around its own
//! `current_thread`: a consistent locking API even though, on this single
//! CPU, the interrupt gate already rules out concurrent access.

extern crate alloc;
use alloc::string::String;

use crate::arch::{Arch, InterruptGuard};
use crate::errors::{SpawnError, ThreadResult};
use crate::list::{LinkKind, List};
use crate::mem::{StackPool, StackSizeClass};
use crate::sched::mlfq::Mlfq;
use crate::sched::{ReadyQueue, SchedulingPolicy};
use crate::sleep::SleepList;
use crate::sync::{self, LockTable};
use crate::thread::{Arena, BlockReason, LockId, ThreadId, ThreadState, PRI_MAX, PRI_MIN, TIME_SLICE};
use crate::time::{Ticks, TickCounter};

/// Idle thread body: halt until the next interrupt, forever. Lowest
/// priority in the system, so it only ever runs when nothing else is
/// ready.
extern "C" fn idle_entry<A: Arch>(_arg: usize) -> ! {
    loop {
        A::halt();
    }
}

macro_rules! sched_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "trace")]
        {
            extern crate std;
            std::eprintln!($($arg)*);
        }
        #[cfg(not(feature = "trace"))]
        {
            let _ = ($($arg)*,);
        }
    };
}

struct SchedulerState<A: Arch> {
    arena: Arena<A>,
    all: List,
    ready: ReadyQueue,
    sleep: SleepList,
    locks: LockTable,
    policy: SchedulingPolicy,
    mlfq: Mlfq,
    current: Option<ThreadId>,
    /// Singleton idle thread, created lazily on [`Scheduler::begin`]; always
    /// either current or sitting in the bottom ready bucket, so the ready
    /// queue is never truly empty once the scheduler has started.
    idle: Option<ThreadId>,
    /// The first thread ever scheduled. Its page is never freed even if it
    /// somehow reaches DYING (spec's lifecycle exception).
    initial: Option<ThreadId>,
    /// A just-retired DYING thread whose stack cannot be freed yet: it is
    /// still the thread physically switching away when `retire_current`
    /// runs, so freeing has to wait for the next switch, once some other
    /// thread's context is what's actually live.
    zombie: Option<ThreadId>,
}

/// The scheduler singleton. One per system (Non-goals exclude multi-CPU).
pub struct Scheduler<A: Arch> {
    state: spin::Mutex<SchedulerState<A>>,
    stack_pool: StackPool,
    ticks: TickCounter,
}

impl<A: Arch> Scheduler<A> {
    /// Build a scheduler under the given discipline. This is the crate's
    /// one boot-time configuration point — the equivalent of `-o mlfqs`.
    pub const fn new(policy: SchedulingPolicy) -> Self {
        Self {
            state: spin::Mutex::new(SchedulerState {
                arena: Arena::new(),
                all: List::new(LinkKind::All),
                ready: ReadyQueue::new(),
                sleep: SleepList::new(),
                locks: LockTable::new(),
                policy,
                mlfq: Mlfq::new(),
                current: None,
                idle: None,
                initial: None,
                zombie: None,
            }),
            stack_pool: StackPool::new(),
            ticks: TickCounter::new(),
        }
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.state.lock().policy
    }

    /// `round(100 * load_avg)` (spec.md §4.3's `get_load_avg`). MLFQ mode
    /// only; reads zero in priority mode, since `load_avg` is never
    /// updated there.
    pub fn get_load_avg(&self) -> i32 {
        let _guard = InterruptGuard::<A>::new();
        self.state.lock().mlfq.load_avg.mul_int(100).round()
    }

    /// `round(100 * recent_cpu)` of the calling thread (spec.md §4.3's
    /// `get_recent_cpu`). Returns 0 if called with no current thread.
    pub fn get_recent_cpu(&self) -> i32 {
        let _guard = InterruptGuard::<A>::new();
        let state = self.state.lock();
        state
            .current
            .and_then(|id| state.arena.get(id))
            .map(|t| t.recent_cpu.mul_int(100).round())
            .unwrap_or(0)
    }

    /// Create the idle thread the first time the scheduler is started.
    /// Idempotent; safe to call on every [`Self::begin`].
    fn ensure_idle(&self) {
        if self.state.lock().idle.is_some() {
            return;
        }
        let stack = self
            .stack_pool
            .allocate(StackSizeClass::Small)
            .expect("ensure_idle: could not allocate idle thread stack");
        let stack_top = stack.stack_bottom();
        let context = A::prepare_stack(stack_top, idle_entry::<A>, 0);

        let mut state = self.state.lock();
        if state.idle.is_some() {
            return;
        }
        let id = state.arena.insert(Some(String::from("idle")), PRI_MIN, stack, context);
        state.all.push_back(&mut state.arena, id);
        state.ready.push(&mut state.arena, id, PRI_MIN);
        state.idle = Some(id);
    }

    /// Free a previously-retired DYING thread's stack and arena slot, once
    /// it is safe to: not `except` (that thread's stack may still be live
    /// under an in-flight context switch) and not the initial thread
    /// (never freed, per spec's lifecycle exception).
    fn reap_zombie(state: &mut SchedulerState<A>, stack_pool: &StackPool, except: Option<ThreadId>) {
        let zombie = match state.zombie {
            Some(z) if Some(z) != except => z,
            _ => return,
        };
        state.zombie = None;
        if Some(zombie) == state.initial {
            return;
        }
        if let Some(tcb) = state.arena.remove(zombie) {
            stack_pool.deallocate(tcb.stack);
        }
    }

    /// Current tick count, as of the last call to [`Self::on_tick`].
    pub fn ticks_now(&self) -> Ticks {
        self.ticks.now()
    }

    /// Create a new thread, ready to run, at `priority`. `entry` is called
    /// with `arg` the first time it is switched to. Inherits `nice` and
    /// `recent_cpu` from the creating thread (MLFQ mode).
    ///
    /// Outside MLFQ mode, if the new thread's priority strictly exceeds
    /// the creator's effective priority, the creator yields immediately
    /// afterward to preserve "the highest-priority ready thread runs".
    pub fn create(
        &self,
        name: Option<String>,
        priority: u8,
        stack_size: StackSizeClass,
        entry: extern "C" fn(usize) -> !,
        arg: usize,
    ) -> ThreadResult<ThreadId> {
        if priority > PRI_MAX {
            return Err(SpawnError::InvalidPriority(priority).into());
        }

        let stack = self.stack_pool.allocate(stack_size).ok_or(SpawnError::OutOfMemory)?;
        let stack_top = stack.stack_bottom();
        let context = A::prepare_stack(stack_top, entry, arg);

        let (id, should_yield) = {
            let _guard = InterruptGuard::<A>::new();
            let mut state = self.state.lock();

            let inherited = state.current.and_then(|c| state.arena.get(c)).map(|c| (c.nice, c.recent_cpu));
            let creator_priority = state.current.and_then(|c| state.arena.get(c)).map(|t| t.effective_priority);

            let id = state.arena.insert(name, priority, stack, context);
            if let (Some((nice, recent_cpu)), Some(tcb)) = (inherited, state.arena.get_mut(id)) {
                tcb.nice = nice;
                tcb.recent_cpu = recent_cpu;
            }
            state.all.push_back(&mut state.arena, id);
            state.ready.push(&mut state.arena, id, priority);
            sched_trace!("create: {} priority={}", id, priority);

            let should_yield =
                state.policy == SchedulingPolicy::Priority && priority > creator_priority.unwrap_or(PRI_MAX);
            (id, should_yield)
        };

        if should_yield {
            self.yield_now();
        }
        Ok(id)
    }

    /// Currently running thread, if the scheduler has started. Asserts the
    /// running thread's stack canary is intact and that it is actually
    /// RUNNING — the portable stand-in for the original "locate by stack
    /// pointer, assert magic" contract (see DESIGN.md).
    pub fn current(&self) -> Option<ThreadId> {
        let _guard = InterruptGuard::<A>::new();
        let state = self.state.lock();
        if let Some(id) = state.current {
            let tcb = state.arena.get(id).expect("current: current thread missing from arena");
            assert!(tcb.check_stack(), "current: stack canary corrupted, thread {id} overflowed its stack");
            assert_eq!(tcb.state, ThreadState::Running, "current: current thread not Running");
        }
        state.current
    }

    /// Run `f` over every live thread id, interrupts disabled for the
    /// whole walk (matches the `all_list` critical-section rule).
    pub fn foreach(&self, mut f: impl FnMut(ThreadId)) {
        let _guard = InterruptGuard::<A>::new();
        let state = self.state.lock();
        for id in state.all.iter(&state.arena) {
            f(id);
        }
    }

    pub fn thread_stats(&self) -> (usize, usize, usize) {
        let _guard = InterruptGuard::<A>::new();
        let state = self.state.lock();
        let total = state.arena.len();
        let ready = state.ready.len();
        let blocked = state
            .all
            .iter(&state.arena)
            .filter(|&id| state.arena.get(id).map(|t| t.state == ThreadState::Blocked).unwrap_or(false))
            .count();
        (total, ready, blocked)
    }

    /// Set `id`'s base priority. Per the scheduler's design, this always
    /// yields immediately afterward, even if the change didn't raise the
    /// calling thread above anyone else — preserved from the original
    /// design rather than optimized away.
    pub fn set_priority(&self, id: ThreadId, new_base: u8) {
        let _guard = InterruptGuard::<A>::new();
        {
            let mut state = self.state.lock();
            let (old_priority, new_priority, state_kind) = {
                let tcb = state.arena.get_mut(id).expect("set_priority: unknown thread id");
                let old_priority = tcb.effective_priority;
                // A donation in effect (effective_priority above the old base)
                // still applies on top of the new base; a thread receiving no
                // donation tracks its base priority directly either way.
                let donated = old_priority > tcb.base_priority;
                tcb.base_priority = new_base;
                let new_priority = if donated { old_priority.max(new_base) } else { new_base };
                tcb.effective_priority = new_priority;
                (old_priority, new_priority, tcb.state)
            };
            if state_kind == ThreadState::Ready && old_priority != new_priority {
                state.ready.reorder(&mut state.arena, id, old_priority, new_priority);
            }
        }
        if self.current() == Some(id) {
            self.yield_now();
        }
    }

    /// MLFQ mode only: set `id`'s `nice` value.
    pub fn set_nice(&self, id: ThreadId, nice: i32) {
        let _guard = InterruptGuard::<A>::new();
        let mut state = self.state.lock();
        debug_assert_eq!(state.policy, SchedulingPolicy::Mlfq, "set_nice used outside MLFQ mode");
        let old_priority = state.arena.get(id).map(|t| t.effective_priority).unwrap_or(PRI_MIN);
        if let Some(new_priority) = state.mlfq.set_nice(&mut state.arena, id, nice) {
            let is_ready = state.arena.get(id).map(|t| t.state == ThreadState::Ready).unwrap_or(false);
            if is_ready {
                state.ready.reorder(&mut state.arena, id, old_priority, new_priority);
            }
        }
    }

    /// Block the current thread with the given reason. Must not be called
    /// from interrupt context (spec contract — enforced here, not
    /// recoverable).
    pub fn block_current(&self, reason: BlockReason) {
        assert!(A::interrupts_enabled(), "block_current: called from interrupt context");
        let _guard = InterruptGuard::<A>::new();
        let (prev, next) = {
            let mut state = self.state.lock();
            let prev = state.current.expect("block_current: no current thread");
            {
                let tcb = state.arena.get_mut(prev).expect("current thread must exist in arena");
                assert_eq!(tcb.state, ThreadState::Running, "block_current: current thread not Running");
                tcb.state = ThreadState::Blocked;
                tcb.block_reason = reason;
            }
            let next = state
                .ready
                .pop_highest(&mut state.arena)
                .expect("pop_highest returned empty: idle thread invariant broken");
            (prev, next)
        };
        self.context_switch_to(prev, next);
    }

    /// Block the current thread asleep until `wakeup`.
    pub fn sleep_until(&self, wakeup: Ticks) {
        assert!(A::interrupts_enabled(), "sleep_until: called from interrupt context");
        let _guard = InterruptGuard::<A>::new();
        let (prev, next) = {
            let mut state = self.state.lock();
            let prev = state.current.expect("sleep_until: no current thread");
            {
                let tcb = state.arena.get_mut(prev).expect("current thread must exist in arena");
                assert_eq!(tcb.state, ThreadState::Running, "sleep_until: current thread not Running");
                tcb.state = ThreadState::Blocked;
            }
            state.sleep.insert(&mut state.arena, prev, wakeup);
            let next = state
                .ready
                .pop_highest(&mut state.arena)
                .expect("pop_highest returned empty: idle thread invariant broken");
            (prev, next)
        };
        self.context_switch_to(prev, next);
    }

    /// Wake a blocked thread, returning `true` if it now outranks the
    /// running thread and a caller-initiated yield is warranted.
    pub fn unblock(&self, id: ThreadId) -> bool {
        let _guard = InterruptGuard::<A>::new();
        let mut state = self.state.lock();

        let priority = {
            let tcb = state.arena.get_mut(id).expect("unblock: unknown thread id");
            assert_eq!(tcb.state, ThreadState::Blocked, "unblock: thread not Blocked");
            tcb.state = ThreadState::Ready;
            tcb.block_reason = BlockReason::Unknown;
            tcb.effective_priority
        };
        state.ready.push(&mut state.arena, id, priority);

        let current_priority = state
            .current
            .and_then(|c| state.arena.get(c))
            .map(|t| t.effective_priority)
            .unwrap_or(PRI_MIN);
        priority > current_priority
    }

    /// Acquire `lock_id` on behalf of the current thread, blocking (and
    /// donating priority up the chain) if it is held.
    pub fn lock_acquire(&self, lock_id: LockId) {
        let current = self.current().expect("lock_acquire: no current thread");
        let outcome = {
            let _guard = InterruptGuard::<A>::new();
            let mut state = self.state.lock();
            sync::acquire(&mut state.arena, &mut state.ready, &mut state.locks, lock_id, current)
        };
        if outcome == sync::AcquireOutcome::MustBlock {
            self.block_current(BlockReason::WaitingOnLock(lock_id));
        }
    }

    /// Release `lock_id`, waking every waiter and yielding if one of them
    /// now outranks the calling thread.
    pub fn lock_release(&self, lock_id: LockId) {
        let current = self.current().expect("lock_release: no current thread");
        let mut should_yield = false;
        {
            let _guard = InterruptGuard::<A>::new();
            let mut state = self.state.lock();
            let woken = sync::release(&mut state.arena, &mut state.ready, &mut state.locks, lock_id, current);
            for id in woken {
                if let Some(tcb) = state.arena.get_mut(id) {
                    tcb.state = ThreadState::Ready;
                }
                let priority = state.arena.get(id).map(|t| t.effective_priority).unwrap_or(PRI_MIN);
                state.ready.push(&mut state.arena, id, priority);
                let current_priority = state.arena.get(current).map(|t| t.effective_priority).unwrap_or(PRI_MIN);
                should_yield |= priority > current_priority;
            }
        }
        if should_yield {
            self.yield_now();
        }
    }

    pub fn create_lock(&self) -> LockId {
        let _guard = InterruptGuard::<A>::new();
        self.state.lock().locks.create()
    }

    /// Voluntarily give up the CPU; the current thread stays Ready.
    pub fn yield_now(&self) {
        let _guard = InterruptGuard::<A>::new();
        let (prev, next) = {
            let mut state = self.state.lock();
            let prev = state.current.expect("yield_now: no current thread");
            let priority = state.arena.get(prev).map(|t| t.effective_priority).unwrap_or(PRI_MIN);
            if let Some(tcb) = state.arena.get_mut(prev) {
                tcb.state = ThreadState::Ready;
            }
            state.ready.push(&mut state.arena, prev, priority);
            let next = state
                .ready
                .pop_highest(&mut state.arena)
                .expect("pop_highest returned empty: idle thread invariant broken");
            if next == prev {
                if let Some(tcb) = state.arena.get_mut(next) {
                    tcb.state = ThreadState::Running;
                }
            }
            (prev, next)
        };
        if prev != next {
            self.context_switch_to(prev, next);
        }
    }

    /// Tear down the current thread. Never returns.
    pub fn exit_current(&self) -> ! {
        let (prev, _next) = self.retire_current();
        let next = self.state.lock().current.expect("retire_current sets current");
        self.context_switch_to(prev, next);
        unreachable!("a dying thread was resumed")
    }

    /// Shared bookkeeping for tearing down the current thread: mark it
    /// Dying, drop it from the all-threads list, and pick + install the
    /// next thread to run. Returns `(prev, next)`; the caller performs the
    /// actual register-level switch (or, for host tests, skips it).
    fn retire_current(&self) -> (ThreadId, ThreadId) {
        let _guard = InterruptGuard::<A>::new();
        let mut state = self.state.lock();
        Self::reap_zombie(&mut state, &self.stack_pool, None);
        let prev = state.current.expect("retire_current: no current thread");
        if let Some(tcb) = state.arena.get_mut(prev) {
            tcb.state = ThreadState::Dying;
        }
        state.all.remove(&mut state.arena, prev);
        state.zombie = Some(prev);
        let next = state
            .ready
            .pop_highest(&mut state.arena)
            .expect("pop_highest returned empty: idle thread invariant broken");
        if let Some(tcb) = state.arena.get_mut(next) {
            tcb.state = ThreadState::Running;
            tcb.ticks_left = TIME_SLICE;
        }
        state.current = Some(next);
        (prev, next)
    }

    /// Start running the first thread. Called once at boot, before
    /// interrupts are enabled.
    pub fn start(&self) -> ! {
        let next = self.begin();
        let next_ctx = {
            let state = self.state.lock();
            &state.arena.get(next).unwrap().context as *const <A as Arch>::SavedContext
        };
        let mut throwaway = <A as Arch>::SavedContext::default();
        unsafe {
            A::context_switch(&mut throwaway as *mut _, next_ctx);
        }
        unreachable!("start() context never returns")
    }

    /// Shared bookkeeping for picking and installing the first thread.
    fn begin(&self) -> ThreadId {
        self.ensure_idle();
        let mut state = self.state.lock();
        let next = state
            .ready
            .pop_highest(&mut state.arena)
            .expect("begin: no threads created yet, not even the idle thread");
        if let Some(tcb) = state.arena.get_mut(next) {
            tcb.state = ThreadState::Running;
        }
        state.current = Some(next);
        state.initial.get_or_insert(next);
        next
    }

    /// Host-test support: install the highest-priority ready thread as
    /// current without performing a real register-level context switch.
    /// [`NoOpArch`](crate::arch::NoOpArch) makes [`Self::start`] itself
    /// unusable on the host (its `context_switch` is a no-op, so the
    /// "never returns" assumption right after it does not hold) — this
    /// gives scenario tests a safe equivalent.
    #[cfg(feature = "std-shim")]
    pub fn start_for_test(&self) -> ThreadId {
        self.begin()
    }

    /// Host-test support: equivalent of [`Self::exit_current`] that
    /// returns instead of diverging, for the same reason as
    /// [`Self::start_for_test`].
    #[cfg(feature = "std-shim")]
    pub fn exit_current_for_test(&self) -> ThreadId {
        let (_prev, next) = self.retire_current();
        next
    }

    /// Host-test support: switch "current" to an arbitrary Ready thread
    /// without a real context switch, so a scenario test can script which
    /// thread calls into the scheduler next (e.g. "now M acquires B").
    /// The previously running thread, if any, goes back to Ready.
    #[cfg(feature = "std-shim")]
    pub fn set_current_for_test(&self, id: ThreadId) {
        let _guard = InterruptGuard::<A>::new();
        let mut state = self.state.lock();
        if let Some(prev) = state.current {
            if prev != id {
                let priority = state.arena.get(prev).map(|t| t.effective_priority).unwrap_or(PRI_MIN);
                if let Some(tcb) = state.arena.get_mut(prev) {
                    tcb.state = ThreadState::Ready;
                }
                state.ready.push(&mut state.arena, prev, priority);
            }
        }
        let priority = state.arena.get(id).map(|t| t.effective_priority).unwrap_or(PRI_MIN);
        state.ready.remove(&mut state.arena, id, priority);
        if let Some(tcb) = state.arena.get_mut(id) {
            tcb.state = ThreadState::Running;
        }
        state.current = Some(id);
    }

    /// Host-test support: read a thread's current effective priority, to
    /// assert on donation outcomes without exposing the arena itself.
    #[cfg(feature = "std-shim")]
    pub fn effective_priority_for_test(&self, id: ThreadId) -> Option<u8> {
        let _guard = InterruptGuard::<A>::new();
        self.state.lock().arena.get(id).map(|t| t.effective_priority)
    }

    /// Host-test support: read a thread's lifecycle state, to assert on
    /// wake/block outcomes without exposing the arena itself.
    #[cfg(feature = "std-shim")]
    pub fn state_for_test(&self, id: ThreadId) -> Option<ThreadState> {
        let _guard = InterruptGuard::<A>::new();
        self.state.lock().arena.get(id).map(|t| t.state)
    }

    /// Timer tick handler: advances the clock, wakes due sleepers, runs
    /// the MLFQ recompute schedule (if active), and reports whether the
    /// currently running thread's quantum expired (priority mode) or it
    /// was outranked (either mode) — i.e. whether the caller should
    /// invoke [`Self::yield_now`] before returning from the interrupt.
    pub fn on_tick(&self) -> bool {
        let _guard = InterruptGuard::<A>::new();
        let mut state = self.state.lock();
        let now = self.ticks.advance();

        let woken = state.sleep.wake_due(&mut state.arena, now);
        for &id in &woken {
            if let Some(tcb) = state.arena.get_mut(id) {
                tcb.state = ThreadState::Ready;
            }
            let priority = state.arena.get(id).map(|t| t.effective_priority).unwrap_or(PRI_MIN);
            state.ready.push(&mut state.arena, id, priority);
        }
        let mut should_preempt = false;

        if state.policy == SchedulingPolicy::Mlfq {
            let ready_len = state.ready.len();
            let running = state.current;
            let idle = state.idle;
            let changed = state.mlfq.on_tick(&mut state.arena, ready_len, running, idle, now);
            for (id, old_priority, new_priority) in changed {
                let is_ready = state.arena.get(id).map(|t| t.state == ThreadState::Ready).unwrap_or(false);
                if is_ready {
                    state.ready.reorder(&mut state.arena, id, old_priority, new_priority);
                }
            }
        }

        if let Some(current) = state.current {
            let current_priority = state.arena.get(current).map(|t| t.effective_priority).unwrap_or(PRI_MIN);
            if let Some(highest_ready) = state.ready.highest_ready_priority() {
                if highest_ready > current_priority {
                    should_preempt = true;
                }
            }

            if state.policy == SchedulingPolicy::Priority {
                if let Some(tcb) = state.arena.get_mut(current) {
                    let expired = crate::sched::priority::tick_quantum(&mut tcb.ticks_left);
                    if expired && state.ready.highest_ready_priority() == Some(current_priority) {
                        should_preempt = true;
                    }
                }
            }
        }

        should_preempt || !woken.is_empty()
    }

    fn context_switch_to(&self, prev: ThreadId, next: ThreadId) {
        let (prev_ctx, next_ctx) = {
            let mut state = self.state.lock();
            Self::reap_zombie(&mut state, &self.stack_pool, Some(prev));
            if let Some(tcb) = state.arena.get_mut(next) {
                tcb.state = ThreadState::Running;
                tcb.ticks_left = TIME_SLICE;
            }
            state.current = Some(next);
            let prev_ptr = &mut state.arena.get_mut(prev).expect("prev thread must exist").context
                as *mut <A as Arch>::SavedContext;
            let next_ptr =
                &state.arena.get(next).expect("next thread must exist").context as *const <A as Arch>::SavedContext;
            (prev_ptr, next_ptr)
        };
        sched_trace!("switch: {} -> {}", prev, next);
        unsafe {
            A::context_switch(prev_ctx, next_ctx);
        }
    }
}

unsafe impl<A: Arch> Send for Scheduler<A> {}
unsafe impl<A: Arch> Sync for Scheduler<A> {}

#[cfg(all(test, feature = "std-shim"))]
mod tests {
    use super::*;
    use crate::arch::NoOpArch;

    extern "C" fn noop_entry(_arg: usize) -> ! {
        loop {}
    }

    #[test]
    fn create_enqueues_at_requested_priority() {
        let scheduler: Scheduler<NoOpArch> = Scheduler::new(SchedulingPolicy::Priority);
        let id = scheduler
            .create(None, 40, StackSizeClass::Small, noop_entry, 0)
            .expect("create should succeed");
        let (total, ready, blocked) = scheduler.thread_stats();
        assert_eq!(total, 1);
        assert_eq!(ready, 1);
        assert_eq!(blocked, 0);
        assert!(scheduler.foreach_contains(id));
    }

    impl<A: Arch> Scheduler<A> {
        fn foreach_contains(&self, id: ThreadId) -> bool {
            let mut found = false;
            self.foreach(|t| found |= t == id);
            found
        }
    }
}
