//! Error types for the scheduler's fallible surface.
//!
//! Most of the scheduler's contract is enforced with `assert!`/
//! `debug_assert!`: blocking from interrupt context, double-blocking a
//! thread, unblocking a thread that isn't blocked, and similar programming
//! errors are bugs, not recoverable conditions, so they panic rather than
//! return a `Result`. `ThreadError` covers what's left: allocation failure
//! on thread creation, and a handful of scheduler-state errors callers can
//! reasonably check for.

use core::fmt;

/// Result type for threading operations.
pub type ThreadResult<T> = Result<T, ThreadError>;

/// Top-level error type for all threading operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadError {
    /// Thread spawning errors.
    Spawn(SpawnError),
    /// Scheduling errors.
    Schedule(ScheduleError),
}

/// Errors that can occur during thread creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    /// No stack could be allocated for the new thread.
    OutOfMemory,
    /// `priority` (or `nice`) fell outside its valid range.
    InvalidPriority(u8),
}

/// Errors related to scheduling operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// Operation requires a `ThreadId` that does not name a live thread.
    UnknownThread,
}

impl fmt::Display for ThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadError::Spawn(e) => write!(f, "thread spawn error: {}", e),
            ThreadError::Schedule(e) => write!(f, "scheduling error: {}", e),
        }
    }
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::OutOfMemory => write!(f, "out of memory for thread stack"),
            SpawnError::InvalidPriority(p) => write!(f, "invalid priority: {}", p),
        }
    }
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::UnknownThread => write!(f, "unknown thread id"),
        }
    }
}

impl From<SpawnError> for ThreadError {
    fn from(error: SpawnError) -> Self {
        ThreadError::Spawn(error)
    }
}

impl From<ScheduleError> for ThreadError {
    fn from(error: ScheduleError) -> Self {
        ThreadError::Schedule(error)
    }
}
