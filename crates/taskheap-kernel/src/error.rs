//! Kernel error types.
//!
//! Every fallible API in this crate surfaces errors through [`KernelError`].
//! Note that two conditions a caller might expect here are deliberately not
//! errors: extracting from an empty heap yields `None`, and changing the
//! priority of an unknown task is a silent no-op.

/// Unified error type for the taskheap kernel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    // -- Heap errors --------------------------------------------------------
    /// A task with the same identifier is already resident in the heap.
    ///
    /// The rejected insert leaves the heap exactly as it was.
    #[error("duplicate task identifier: {identifier}")]
    DuplicateIdentifier {
        /// `Debug` rendering of the offending identifier.
        identifier: String,
    },

    // -- Handle errors ------------------------------------------------------
    /// The worker that owns the heap has stopped and no longer accepts
    /// commands.
    #[error("heap worker is closed")]
    HeapClosed,

    // -- Config errors ------------------------------------------------------
    /// The supplied configuration could not be parsed or is out of range.
    #[error("invalid heap config: {reason}")]
    InvalidConfig { reason: String },
}

/// Convenience alias used throughout the kernel crate.
pub type Result<T> = std::result::Result<T, KernelError>;
