//! Fluid property errors.

use crate::status::PointStatus;
use thiserror::Error;
use vm_core::CoreError;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value outside the domain where the model can produce anything at all.
    #[error("Value out of range for {what}")]
    OutOfRange { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Operation not supported by this model.
    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    /// Convergence failure (e.g., solving for T given P,h).
    #[error("Convergence failed for {what}")]
    ConvergenceFailed { what: &'static str },

    /// Backend (CoolProp) error.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Property name that does not parse.
    #[error("Unknown property name '{name}'")]
    UnknownProperty { name: String },

    /// Unknown gas in the catalog.
    #[error("Unknown gas '{name}'")]
    UnknownGas { name: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FluidError {
    /// Per-point status recorded when an evaluator fails hard at a point.
    pub fn status(&self) -> PointStatus {
        match self {
            FluidError::OutOfRange { .. } | FluidError::Backend { .. } => PointStatus::OutOfRange,
            FluidError::ConvergenceFailed { .. } => PointStatus::NonConvergence,
            FluidError::NotSupported { .. } => PointStatus::NotImplemented,
            FluidError::UnknownProperty { .. } | FluidError::UnknownGas { .. } => {
                PointStatus::InputProperty
            }
            FluidError::NonPhysical { .. } | FluidError::InvalidArg { .. } | FluidError::Core(_) => {
                PointStatus::NonPhysical
            }
        }
    }
}
