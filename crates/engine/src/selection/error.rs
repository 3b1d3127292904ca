//! Error types for endpoint selection.

use thiserror::Error;

/// Errors raised while choosing between candidate endpoints.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// Asked to pick from an empty candidate list.
    #[error("cannot select from an empty list of capabilities")]
    EmptyCandidates,

    /// A resolver returned an index outside the candidate list.
    #[error("selection {index} for {entity}.{action} is out of range (0-{max})", max = .candidates.saturating_sub(1))]
    OutOfRange {
        entity: String,
        action: String,
        index: usize,
        candidates: usize,
    },

    /// The resolver gave up (e.g. operator cancelled, input closed).
    #[error("selection cancelled: {0}")]
    Cancelled(String),
}
