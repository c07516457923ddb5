//! Error taxonomy for the estimation engine.
//!
//! Stage functions return these errors; [`crate::StiffnessAnalyzer`] never
//! propagates them to its caller. Every failure is folded into the
//! [`crate::AnalysisReport`] next to a readable diagnostic line.

use crate::input::Axis;
use thiserror::Error;

/// Errors produced by individual analysis stages.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// Too few samples for a reliable estimate.
    #[error("insufficient data for {stage}: {actual} samples, at least {required} required")]
    InsufficientData {
        /// Stage that rejected the input.
        stage: &'static str,
        /// Minimum sample count for that stage.
        required: usize,
        /// Sample count that was supplied.
        actual: usize,
    },

    /// Time axis unusable for deriving a sample interval.
    #[error("invalid temporal grid: {reason}")]
    InvalidTemporalGrid {
        /// What was wrong with the time axis.
        reason: String,
    },

    /// No frequency bin survived masking for stiffness display.
    #[error("no valid frequency bins for dynamic stiffness")]
    NoValidFrequencyBins,

    /// A damping ratio fell outside its physically accepted range.
    #[error("implausible damping at {frequency_hz:.2} Hz: zeta={zeta:.4}")]
    ImplausibleDamping {
        /// Frequency of the rejected estimate.
        frequency_hz: f64,
        /// Rejected damping ratio.
        zeta: f64,
    },

    /// A column does not have the same length as the time axis.
    #[error("column '{column}' has {actual} samples, expected {expected}")]
    LengthMismatch {
        /// Column name.
        column: String,
        /// Length of the time axis.
        expected: usize,
        /// Length of the offending column.
        actual: usize,
    },

    /// The requested acceleration axis is not present in the record.
    #[error("acceleration axis '{}' not present in record", .0.column_name())]
    MissingAxis(Axis),

    /// Invalid cutting range.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Filter parameters that cannot be realized at the record's sample rate.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl AnalysisError {
    /// Create an insufficient data error.
    pub fn insufficient(stage: &'static str, required: usize, actual: usize) -> Self {
        AnalysisError::InsufficientData {
            stage,
            required,
            actual,
        }
    }

    /// Whether this is an [`AnalysisError::InsufficientData`] error.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData { .. })
    }
}
