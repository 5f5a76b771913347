//! Heap configuration.
//!
//! [`HeapConfig`] is plain serde data so it can be embedded in a larger
//! config file (the CLI reads it from the `[heap]` table of
//! `config/default.toml`).  Every field has a default, so an empty table is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};

/// How tasks of equal priority are ordered relative to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// No guarantee: equal-priority tasks come out in whatever order the
    /// heap happens to hold them.
    #[default]
    Unordered,
    /// Equal-priority tasks come out in insertion order.
    Fifo,
}

/// Tunables for [`PriorityHeap`](crate::heap::PriorityHeap) and
/// [`HeapHandle`](crate::actor::HeapHandle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    /// Ordering among tasks of equal priority.
    pub tie_break: TieBreak,
    /// Number of task slots to reserve up front.
    pub initial_capacity: usize,
    /// Bound of the command channel in front of a heap worker.  Zero is
    /// treated as one.
    pub mailbox_capacity: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::Unordered,
            initial_capacity: 0,
            mailbox_capacity: 64,
        }
    }
}

impl HeapConfig {
    /// Parse a config from a standalone TOML document whose top-level keys
    /// are the fields of this struct.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| KernelError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// Channel bound actually used by the worker.
    pub fn effective_mailbox_capacity(&self) -> usize {
        self.mailbox_capacity.max(1)
    }
}
