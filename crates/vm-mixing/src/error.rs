//! Error types for mixture evaluation.

use std::fmt;
use thiserror::Error;
use vm_core::CoreError;
use vm_fluids::{FluidError, PointStatus, Property};

/// Which iterative solver gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    /// Vapor/incondensable (Pv, hv) split.
    Split,
    /// Enthalpy search for a target temperature.
    Temperature,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverKind::Split => write!(f, "vapor split"),
            SolverKind::Temperature => write!(f, "temperature target"),
        }
    }
}

/// Errors that can occur while configuring or evaluating a mixture.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MixingError {
    #[error("Not implemented: {what}")]
    NotImplemented { what: String },

    #[error("Field '{what}' has {len} values, error field has {expected}")]
    DataNumber {
        what: String,
        len: usize,
        expected: usize,
    },

    #[error("Unsupported input set: {what}")]
    InputProperty { what: String },

    #[error("Output '{property}' is not available {context}")]
    UnsupportedOutput {
        property: Property,
        context: &'static str,
    },

    #[error("{solver} solver did not converge{} after {iterations} iterations", at_point(.point))]
    NonConvergence {
        solver: SolverKind,
        point: Option<usize>,
        iterations: usize,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

fn at_point(point: &Option<usize>) -> String {
    match point {
        Some(i) => format!(" at point {i}"),
        None => String::new(),
    }
}

pub type MixingResult<T> = Result<T, MixingError>;

impl MixingError {
    /// Per-point status this error stands for.
    pub fn status(&self) -> PointStatus {
        match self {
            MixingError::NotImplemented { .. } => PointStatus::NotImplemented,
            MixingError::DataNumber { .. } => PointStatus::DataNumber,
            MixingError::InputProperty { .. }
            | MixingError::UnsupportedOutput { .. }
            | MixingError::Config { .. } => PointStatus::InputProperty,
            MixingError::NonConvergence { .. } => PointStatus::NonConvergence,
            MixingError::Fluid(err) => err.status(),
            MixingError::Core(_) => PointStatus::NonPhysical,
        }
    }

    /// Attach the batch index to a non-convergence report.
    pub(crate) fn at(self, index: usize) -> Self {
        match self {
            MixingError::NonConvergence {
                solver, iterations, ..
            } => MixingError::NonConvergence {
                solver,
                point: Some(index),
                iterations,
            },
            other => other,
        }
    }

    pub(crate) fn not_implemented(what: impl Into<String>) -> Self {
        MixingError::NotImplemented { what: what.into() }
    }

    pub(crate) fn input_property(what: impl Into<String>) -> Self {
        MixingError::InputProperty { what: what.into() }
    }
}
