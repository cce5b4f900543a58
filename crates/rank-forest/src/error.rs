//! Error taxonomy of the tree API.

use thiserror::Error;

/// Failure modes of [`RankTree`](crate::RankTree) operations.
///
/// Every fallible operation is deterministic and rejects before mutating:
/// an `Err` leaves the tree exactly as it was.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// Insertion found the key already bound to a value.
    #[error("key already present")]
    Duplicate,
    /// Search or deletion found no node with the requested key.
    #[error("key not found")]
    NotFound,
    /// A caller contract was violated, e.g. splitting around an absent key.
    #[error("operation precondition violated")]
    PreconditionViolated,
}
