//! Error types shared by every transform

use thiserror::Error;

/// Absolute tolerance on the imaginary residue discarded by an inverse transform
pub const IMAG_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Invalid input shape: {0}")]
    InvalidShape(String),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Missing capability: {0} was not supplied")]
    MissingCapability(&'static str),

    #[error("Computation failed: {0}")]
    Computation(String),
}

impl DspError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        DspError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for errors the caller can fix by changing its input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DspError::InvalidShape(_) | DspError::InvalidParameter { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DspError>;

/// Non-fatal condition raised while reconstructing a real signal
///
/// Carried next to the result instead of aborting the operation.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("discarded imaginary residue {max_residue:.2e} exceeds tolerance {tolerance:.0e}; input spectrum may lack conjugate symmetry")]
pub struct NumericalWarning {
    /// Largest absolute imaginary component that was dropped
    pub max_residue: f64,

    /// Tolerance the residue was compared against
    pub tolerance: f64,
}

/// Reject lengths of zero with a uniform message
pub(crate) fn require_positive(name: &'static str, value: usize) -> Result<usize> {
    if value == 0 {
        Err(DspError::invalid(name, "must be greater than zero"))
    } else {
        Ok(value)
    }
}

/// Reject non-finite or non-positive rates and frequencies
pub(crate) fn require_positive_f64(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DspError::invalid(
            name,
            format!("must be a positive finite number (got {value})"),
        ))
    }
}
