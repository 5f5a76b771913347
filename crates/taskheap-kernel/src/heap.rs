//! Indexed binary max-heap of tasks.
//!
//! [`PriorityHeap`] stores tasks in a `Vec` laid out as an implicit binary
//! tree (children of `i` at `2i + 1` and `2i + 2`, parent at `(i - 1) / 2`)
//! and keeps a side index from task identifier to slot position.  The index
//! is what makes [`PriorityHeap::change_priority`] O(log n): the task is
//! found in O(1) and then sifted in whichever direction the change requires.
//!
//! # Invariants
//!
//! - **Heap order**: every slot ranks at least as high as each of its
//!   children.
//! - **Index**: `position` holds exactly one entry per resident task, and
//!   that entry is the task's current slot.
//!
//! Only three private helpers move slots: `push_slot`, `pop_slot` and
//! `swap_slots`.  Each updates `position` together with the `Vec`, so the
//! index cannot drift from the storage.
//!
//! # Example
//!
//! ```rust
//! # use taskheap_kernel::heap::{PriorityHeap, Task};
//! let mut heap = PriorityHeap::new();
//! heap.insert(Task::new(1, 10)).unwrap();
//! heap.insert(Task::new(2, 20)).unwrap();
//!
//! heap.change_priority(&1, 30);
//! assert_eq!(heap.extract_max(), Some(Task::new(1, 30)));
//! assert_eq!(heap.extract_max(), Some(Task::new(2, 20)));
//! assert_eq!(heap.extract_max(), None);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::config::{HeapConfig, TieBreak};
use crate::error::{KernelError, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A schedulable unit: an identifier plus a mutable priority.
///
/// Higher priorities are extracted first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task<I = u64, P = i64> {
    /// Unique among the tasks resident in one heap.
    pub id: I,
    pub priority: P,
}

impl<I, P> Task<I, P> {
    pub fn new(id: I, priority: P) -> Self {
        Self { id, priority }
    }
}

/// Internal storage cell.  `seq` only matters under [`TieBreak::Fifo`].
#[derive(Debug)]
struct Slot<I, P> {
    task: Task<I, P>,
    seq: u64,
}

// ---------------------------------------------------------------------------
// PriorityHeap
// ---------------------------------------------------------------------------

/// Array-backed max-heap with an identifier index.
///
/// Not internally synchronised: all mutating methods take `&mut self`.  Use
/// [`HeapHandle`](crate::actor::HeapHandle) to share one heap between
/// concurrent callers.
#[derive(Debug)]
pub struct PriorityHeap<I = u64, P = i64> {
    slots: Vec<Slot<I, P>>,
    position: HashMap<I, usize>,
    tie_break: TieBreak,
    next_seq: u64,
}

impl<I, P> PriorityHeap<I, P> {
    /// Create an empty heap with unordered tie-breaking.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tie_break(TieBreak::Unordered)
    }

    #[must_use]
    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        Self {
            slots: Vec::new(),
            position: HashMap::new(),
            tie_break,
            next_seq: 0,
        }
    }

    /// Number of resident tasks.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The task [`extract_max`](Self::extract_max) would return next.
    pub fn peek(&self) -> Option<&Task<I, P>> {
        self.slots.first().map(|slot| &slot.task)
    }

    /// Iterate resident tasks in storage order (not priority order).
    pub fn iter(&self) -> impl Iterator<Item = &Task<I, P>> {
        self.slots.iter().map(|slot| &slot.task)
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}

impl<I, P> Default for PriorityHeap<I, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, P> PriorityHeap<I, P>
where
    I: Eq + Hash + Clone + Debug,
    P: Ord + Debug,
{
    /// Create an empty heap sized and ordered according to `config`.
    #[must_use]
    pub fn with_config(config: &HeapConfig) -> Self {
        Self {
            slots: Vec::with_capacity(config.initial_capacity),
            position: HashMap::with_capacity(config.initial_capacity),
            tie_break: config.tie_break,
            next_seq: 0,
        }
    }

    /// Add a task.
    ///
    /// Fails with [`KernelError::DuplicateIdentifier`] if a task with the
    /// same identifier is already resident; the heap is unchanged in that
    /// case.
    pub fn insert(&mut self, task: Task<I, P>) -> Result<()> {
        if self.position.contains_key(&task.id) {
            tracing::debug!(task_id = ?task.id, "rejecting duplicate task");
            return Err(KernelError::DuplicateIdentifier {
                identifier: format!("{:?}", task.id),
            });
        }

        tracing::trace!(task_id = ?task.id, priority = ?task.priority, "task inserted");

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        let index = self.push_slot(Slot { task, seq });
        self.sift_up(index);
        Ok(())
    }

    /// Remove and return the highest-priority task, or `None` when empty.
    ///
    /// Under [`TieBreak::Unordered`] the choice among equal priorities is
    /// unspecified.
    pub fn extract_max(&mut self) -> Option<Task<I, P>> {
        let last = self.slots.len().checked_sub(1)?;
        self.swap_slots(0, last);
        let slot = self.pop_slot()?;
        if !self.slots.is_empty() {
            self.sift_down(0);
        }

        tracing::trace!(task_id = ?slot.task.id, priority = ?slot.task.priority, "task extracted");
        Some(slot.task)
    }

    /// Set a resident task's priority and restore heap order.
    ///
    /// Unknown identifiers are ignored.
    pub fn change_priority(&mut self, id: &I, new_priority: P) {
        let Some(&index) = self.position.get(id) else {
            tracing::trace!(task_id = ?id, "priority change for unknown task ignored");
            return;
        };

        let old_priority = std::mem::replace(&mut self.slots[index].task.priority, new_priority);
        tracing::trace!(
            task_id = ?id,
            from = ?old_priority,
            to = ?self.slots[index].task.priority,
            "task priority changed"
        );

        if self.slots[index].task.priority > old_priority {
            self.sift_up(index);
        } else {
            self.sift_down(index);
        }
    }

    pub fn contains(&self, id: &I) -> bool {
        self.position.contains_key(id)
    }

    /// Current priority of a resident task.
    pub fn priority_of(&self, id: &I) -> Option<&P> {
        self.position
            .get(id)
            .map(|&index| &self.slots[index].task.priority)
    }

    /// Drop every resident task.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.position.clear();
        self.next_seq = 0;
    }

    /// Consume the heap, returning its tasks in extraction order.
    pub fn into_sorted_vec(mut self) -> Vec<Task<I, P>> {
        let mut sorted = Vec::with_capacity(self.slots.len());
        while let Some(task) = self.extract_max() {
            sorted.push(task);
        }
        sorted
    }

    // -- Ordering -----------------------------------------------------------

    /// Whether the slot at `a` must sit above the slot at `b`.
    fn outranks(&self, a: usize, b: usize) -> bool {
        let (lhs, rhs) = (&self.slots[a], &self.slots[b]);
        match lhs.task.priority.cmp(&rhs.task.priority) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.tie_break == TieBreak::Fifo && lhs.seq < rhs.seq,
        }
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.outranks(index, parent) {
                break;
            }
            self.swap_slots(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut largest = index;

            if left < len && self.outranks(left, largest) {
                largest = left;
            }
            if right < len && self.outranks(right, largest) {
                largest = right;
            }
            if largest == index {
                break;
            }

            self.swap_slots(index, largest);
            index = largest;
        }
    }

    // -- Slot movement (the only code that touches `position`) ---------------

    fn push_slot(&mut self, slot: Slot<I, P>) -> usize {
        let index = self.slots.len();
        self.position.insert(slot.task.id.clone(), index);
        self.slots.push(slot);
        index
    }

    fn pop_slot(&mut self) -> Option<Slot<I, P>> {
        let slot = self.slots.pop()?;
        self.position.remove(&slot.task.id);
        Some(slot)
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.slots.swap(a, b);
        for index in [a, b] {
            if let Some(entry) = self.position.get_mut(&self.slots[index].task.id) {
                *entry = index;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
