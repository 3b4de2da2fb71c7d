//! Estimation error types.
//!
//! Structural problems (mismatched shapes, bad grouping) abort the whole
//! analysis. Data too small for a statistic fails that statistic; the
//! per-item estimators record it in-band. Zero-variance inputs are not errors:
//! they are reported through [`Estimate`](crate::statistics::Estimate).

use thiserror::Error;

/// Convenience alias used by every fallible function in this crate.
pub type Result<T> = std::result::Result<T, PsychometricError>;

/// Errors that can occur while estimating psychometric models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PsychometricError {
    /// A response vector or grouping vector disagrees with the expected length.
    #[error("shape mismatch: {what} has length {found}, expected {expected}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// The grouping vector does not induce exactly two distinct labels.
    #[error("DIF analysis requires exactly two groups, found {found}: {labels:?}")]
    InvalidGroupCount { found: usize, labels: Vec<String> },

    /// A requested reference group does not occur in the grouping vector.
    #[error("unknown group '{requested}', available: {available:?}")]
    UnknownGroup {
        requested: String,
        available: Vec<String>,
    },

    /// Too few examinees for the statistic to be defined.
    #[error("insufficient data for {statistic}: need at least {required} examinee(s), found {found}")]
    InsufficientData {
        statistic: String,
        required: usize,
        found: usize,
    },
}

impl PsychometricError {
    /// Returns `true` for errors caused by the structure of the input rather
    /// than by its size.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PsychometricError::ShapeMismatch { .. }
                | PsychometricError::InvalidGroupCount { .. }
                | PsychometricError::UnknownGroup { .. }
        )
    }

    pub(crate) fn insufficient(statistic: impl Into<String>, required: usize, found: usize) -> Self {
        PsychometricError::InsufficientData {
            statistic: statistic.into(),
            required,
            found,
        }
    }
}
