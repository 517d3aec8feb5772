//! Error types for the estimators and the harness
//!
//! This module provides proper error handling instead of panics.

use std::fmt;

/// Errors that can occur during construction or filtering
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Matrix inversion failed (singular matrix)
    SingularMatrix {
        /// Description of which matrix failed
        context: String,
    },

    /// Dimension mismatch between expected and actual
    DimensionMismatch {
        /// What was expected
        expected: usize,
        /// What was received
        actual: usize,
        /// Context (e.g., "measurement dimension", "observation count")
        context: String,
    },

    /// Particle weights summed to zero or a non-finite value
    DegenerateWeights {
        /// The offending weight sum
        total: f64,
    },

    /// Configuration error
    Configuration {
        /// Description of the configuration issue
        description: String,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::SingularMatrix { context } => {
                write!(f, "Matrix inversion failed: {}", context)
            }
            FilterError::DimensionMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch for {}: expected {}, got {}",
                    context, expected, actual
                )
            }
            FilterError::DegenerateWeights { total } => {
                write!(f, "Degenerate particle weights: sum is {}", total)
            }
            FilterError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// A filter error attributed to a specific harness step
#[derive(Debug, Clone, PartialEq)]
pub struct StepError {
    /// Zero-based step index at which the failure occurred
    pub step: usize,
    /// Underlying failure
    pub source: FilterError,
}

impl StepError {
    /// Attach a step index to a filter error
    pub fn at(step: usize, source: FilterError) -> Self {
        Self { step, source }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}: {}", self.step, self.source)
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
