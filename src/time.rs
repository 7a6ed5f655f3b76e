//! Tick counting.
//!
//! The scheduler has no notion of wall-clock time; everything is driven by
//! the timer device's tick callback (§6 of the design: "periodic tick
//! callback with no arguments, invoked in interrupt context at `TIMER_FREQ`
//! Hz"). `Ticks` is a thin newtype so call sites can't confuse a tick count
//! with a thread count or a priority.

use portable_atomic::{AtomicU64, Ordering};

/// Timer frequency, in Hz. `TIME_SLICE` and the MLFQ per-second recompute
/// are both expressed in multiples of this.
pub const TIMER_FREQ: u32 = 100;

/// Ticks since system start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    pub fn saturating_sub(self, rhs: Ticks) -> Ticks {
        Ticks(self.0.saturating_sub(rhs.0))
    }
}

impl core::ops::Add<u64> for Ticks {
    type Output = Ticks;
    fn add(self, rhs: u64) -> Ticks {
        Ticks(self.0 + rhs)
    }
}

/// Monotonic tick counter, incremented once per timer interrupt.
///
/// This is the scheduler's only source of time. It is incremented from
/// interrupt context by [`TickCounter::advance`] and read from anywhere via
/// [`TickCounter::now`].
pub struct TickCounter {
    ticks: AtomicU64,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
        }
    }

    /// Advance the clock by one tick. Called once per timer interrupt,
    /// before any other tick-handler work.
    pub fn advance(&self) -> Ticks {
        let prev = self.ticks.fetch_add(1, Ordering::AcqRel);
        Ticks(prev + 1)
    }

    pub fn now(&self) -> Ticks {
        Ticks(self.ticks.load(Ordering::Acquire))
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_monotonically() {
        let counter = TickCounter::new();
        assert_eq!(counter.now(), Ticks::ZERO);
        assert_eq!(counter.advance(), Ticks(1));
        assert_eq!(counter.advance(), Ticks(2));
        assert_eq!(counter.now(), Ticks(2));
    }

    #[test]
    fn saturating_sub_never_wraps() {
        assert_eq!(Ticks(3).saturating_sub(Ticks(10)), Ticks::ZERO);
    }
}
