use thiserror::Error;

/// Failure modes for [`crate::Nanocube`] operations.
///
/// `MalformedAddress` is rejected at the API boundary before any mutation
/// takes place. `InternalInvariantViolation` is raised (and validated for,
/// where possible, before any mutation) when an algorithmic precondition the
/// insertion recursion relies on does not hold; seeing one means the index's
/// sharing invariants have been violated by a prior bug, not by caller input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NanocubeError {
    #[error("address has {found} dimensions, expected {expected}")]
    MalformedAddress { found: usize, expected: usize },

    #[error("dimension {dim} path length {found} exceeds configured depth {max}")]
    PathTooLong { dim: usize, found: usize, max: usize },

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(&'static str),
}
