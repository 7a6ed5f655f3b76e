#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![forbid(unreachable_pub)]

//! A preemptive thread scheduler core for a small kernel.
//!
//! This crate owns thread lifecycle (create/block/unblock/exit/yield),
//! the ready queue, and priority arbitration. It does not own paging, the
//! page allocator, the timer device driver, user-mode process creation,
//! or stdio — those are external collaborators the embedding kernel
//! supplies; this crate only needs a periodic tick callback and an
//! [`Arch`] implementation.
//!
//! # Scheduling disciplines
//!
//! Chosen once at construction via [`SchedulingPolicy`]:
//! - [`SchedulingPolicy::Priority`]: strict highest-priority-first, with
//!   priority donation across lock chains to avoid priority inversion.
//! - [`SchedulingPolicy::Mlfq`]: a multi-level feedback queue driven by
//!   `recent_cpu`/`nice`/`load_avg`, recomputed on the timer tick.
//!
//! # Features
//!
//! - `trace`: enable the `sched_trace!` breadcrumbs in [`kernel`] (off by
//!   default; costs nothing in release builds when disabled).
//! - `std-shim`: compatibility layer so the test suite can run on the
//!   host instead of a bare-metal target.
//!
//! # Quick start
//!
//! ```ignore
//! use preempt_sched::{DefaultArch, Scheduler, SchedulingPolicy, StackSizeClass};
//!
//! static SCHEDULER: Scheduler<DefaultArch> = Scheduler::new(SchedulingPolicy::Priority);
//!
//! extern "C" fn worker(_arg: usize) -> ! {
//!     loop {
//!         preempt_sched::yield_now(&SCHEDULER);
//!     }
//! }
//!
//! fn kernel_main() -> ! {
//!     SCHEDULER.create(None, 31, StackSizeClass::Small, worker, 0).unwrap();
//!     SCHEDULER.start();
//! }
//! ```

pub mod arch;
pub mod errors;
pub mod fixed;
pub mod kernel;
pub mod list;
pub mod mem;
pub mod sched;
pub mod sleep;
pub mod sync;
pub mod thread;
pub mod time;

#[cfg(test)]
extern crate std;

extern crate alloc;

#[cfg(all(not(test), not(feature = "std-shim")))]
use core::panic::PanicInfo;

#[cfg(all(not(test), not(feature = "std-shim")))]
#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    #[cfg(target_arch = "x86_64")]
    {
        arch::DefaultArch::disable_interrupts();
        loop {
            unsafe {
                core::arch::asm!("hlt", options(nomem, nostack));
            }
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    loop {}
}

// Architecture abstraction
pub use arch::{Arch, DefaultArch, InterruptGuard};

// Scheduler core
pub use kernel::Scheduler;
pub use sched::{ReadyQueue, SchedulingPolicy};

// Threads
pub use thread::{
    Arena, BlockReason, Link, LockId, ThreadControlBlock, ThreadId, ThreadState, NICE_DEFAULT,
    NICE_MAX, NICE_MIN, PRI_DEFAULT, PRI_MAX, PRI_MIN, TIME_SLICE,
};

// Memory management
pub use mem::{Stack, StackPool, StackSizeClass};

// Time
pub use time::{Ticks, TickCounter, TIMER_FREQ};

// Fixed-point arithmetic (MLFQ formulas)
pub use fixed::Fixed;

// Errors
pub use errors::{ScheduleError, SpawnError, ThreadError, ThreadResult};

/// Yield the current thread's time slice to the scheduler.
///
/// Cooperative: the calling thread remains ready and will be scheduled
/// again later. Requires a [`Scheduler`] to already be running; embedders
/// call this through their own global scheduler instance rather than
/// through a free function, since this crate keeps no global state of
/// its own (see [`kernel::Scheduler`]).
#[inline]
pub fn yield_now<A: Arch>(scheduler: &Scheduler<A>) {
    scheduler.yield_now();
}
