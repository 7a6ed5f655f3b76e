//! Memory management for thread stacks.
//!
//! The page/stack allocator is treated as an external collaborator (the
//! scheduler never cares how a stack's backing memory was obtained, only
//! that it has a top, a bottom, and a canary slot). [`StackPool`] is the
//! concrete stand-in for that collaborator.

pub mod stack_pool;

pub use stack_pool::{Stack, StackPool, StackSizeClass};
