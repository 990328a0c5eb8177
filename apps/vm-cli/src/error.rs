use std::path::PathBuf;
use thiserror::Error;
use vm_fluids::{FluidError, UnitError};
use vm_mixing::MixingError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Unit(#[from] UnitError),

    #[error("{0}")]
    Fluid(#[from] FluidError),

    #[error("{0}")]
    Mixing(#[from] MixingError),

    #[error("Invalid case: {0}")]
    Case(String),
}
