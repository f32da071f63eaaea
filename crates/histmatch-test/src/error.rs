//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while preparing regression test data
#[derive(Debug, Error)]
pub enum TestError {
    /// Synthetic data description is unusable
    #[error("invalid synthetic data: {0}")]
    InvalidSynthetic(String),

    /// Core library error while building test data
    #[error("core error: {0}")]
    Core(#[from] histmatch_core::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
