use thiserror::Error;

/// Typed, recoverable errors raised at the boundary of a public entry point.
///
/// Every fallible function here validates its preconditions once, at the top,
/// never inside a hot loop (see the error handling discussion in the crate
/// docs). A disagreement between searchers is *not* one of these — that is
/// a programming-error-class bug and is reported via `panic!` instead, since
/// there is nothing a caller could do to recover from "the algorithm is wrong".
#[derive(Debug, Error)]
pub enum KnnError {
    #[error("shape mismatch: expected length {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}

pub type Result<T> = std::result::Result<T, KnnError>;

impl KnnError {
    pub(crate) fn shape(expected: usize, actual: usize) -> Self {
        KnnError::ShapeMismatch { expected, actual }
    }

    pub(crate) fn param(reason: impl Into<String>) -> Self {
        KnnError::InvalidParameter {
            reason: reason.into(),
        }
    }
}
