//! taskheap kernel.
//!
//! The ordering/selection structure that sits beneath a task scheduler:
//!
//! - **[`heap`]** -- Indexed binary max-heap supporting insert, extract-max
//!   and O(log n) priority changes of arbitrary resident tasks.
//! - **[`actor`]** -- Single-owner tokio worker that serialises access to one
//!   heap for concurrent callers.
//! - **[`config`]** -- Serde-backed tunables (tie-break policy, capacities).
//! - **[`error`]** -- Kernel error types via [`thiserror`].
//!
//! The kernel never executes, times, or preempts tasks; it only decides which
//! one comes next.

pub mod actor;
pub mod config;
pub mod error;
pub mod heap;

// Re-export the most commonly used types at the crate root for convenience.
pub use actor::HeapHandle;
pub use config::{HeapConfig, TieBreak};
pub use error::{KernelError, Result};
pub use heap::{PriorityHeap, Task};
