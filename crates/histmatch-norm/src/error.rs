//! Error types for histmatch-norm
//!
//! Every pipeline stage reports a typed error. Errors raised while a stack
//! is being processed are wrapped in [`NormError::Slice`] so the caller
//! learns which slice failed.

use thiserror::Error;

/// Errors that can occur during slice normalization
#[derive(Debug, Error)]
pub enum NormError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] histmatch_core::Error),

    /// The intensity range gives no usable bin width
    #[error("degenerate intensity range [{min}, {max}]: bin width must be positive")]
    DegenerateRange { min: f32, max: f32 },

    /// Too few histogram bins in the mode window to fit a Gaussian
    #[error("insufficient data: {points} points in mode window, need at least {required}")]
    InsufficientData { points: usize, required: usize },

    /// The least-squares solver failed or returned a degenerate Gaussian
    #[error("non-convergent fit: {0}")]
    NonConvergentFit(String),

    /// Normalization would divide by a zero or non-finite sigma
    #[error("division by zero: sigma = {sigma}")]
    DivisionByZero { sigma: f64 },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A slice of a stack failed
    #[error("slice {index}: {source}")]
    Slice {
        /// Zero-based slice index
        index: usize,
        /// Underlying error
        #[source]
        source: Box<NormError>,
    },

    /// Processing was cancelled between slices
    #[error("normalization cancelled")]
    Cancelled,
}

impl NormError {
    /// Innermost error, looking through slice wrappers
    pub fn kind(&self) -> &NormError {
        match self {
            NormError::Slice { source, .. } => source.kind(),
            other => other,
        }
    }

    /// Index of the failing slice, if this error came from a stack
    pub fn slice_index(&self) -> Option<usize> {
        match self {
            NormError::Slice { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub(crate) fn in_slice(self, index: usize) -> NormError {
        NormError::Slice {
            index,
            source: Box::new(self),
        }
    }
}

/// Result type for normalization operations
pub type NormResult<T> = Result<T, NormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_wrapper_kind() {
        let err = NormError::DegenerateRange { min: 0.0, max: 0.0 }.in_slice(4);
        assert_eq!(err.slice_index(), Some(4));
        assert!(matches!(err.kind(), NormError::DegenerateRange { .. }));
        assert!(err.to_string().starts_with("slice 4: degenerate"));
    }

    #[test]
    fn test_plain_error_has_no_index() {
        let err = NormError::Cancelled;
        assert_eq!(err.slice_index(), None);
        assert!(matches!(err.kind(), NormError::Cancelled));
    }
}
