//! vm-mixing: property evaluation for one condensable vapor mixed with perfect gases.
//!
//! Provides:
//! - The (Pv, hv) split solver under Dalton mixing
//! - Mixture properties and their derivatives along P, h and the gas fractions
//! - An enthalpy search for (P, T) inputs
//! - The [`Mixture`] facade selecting the compute mode from its constituents
//!
//! # Example
//!
//! ```
//! use vm_fluids::{Composition, IdealSteam, catalog};
//! use vm_mixing::{Component, Mixture, MixingMode};
//!
//! let mixture = Mixture::new(vec![
//!     Component::vapor(IdealSteam::new()),
//!     Component::gas(catalog::gas("air").unwrap()),
//! ])
//! .unwrap();
//! assert_eq!(mixture.mode(), MixingMode::PerfectGas);
//!
//! let c = Composition::new(&[0.95, 0.05]).unwrap();
//! let split = mixture.split_ph(1e5, 2.6e6, &c).unwrap();
//! assert!(split.pv < 1e5);
//! ```

pub mod component;
mod composer;
pub mod config;
pub mod error;
mod inputs;
pub mod legacy;
pub mod mixture;
pub mod point;
pub mod split;
mod temperature;

pub use component::{Component, ComponentKind, MixingMode, select_mode};
pub use config::{DiffusionConfig, SolverConfig, SplitConfig, TemperatureConfig};
pub use error::{MixingError, MixingResult, SolverKind};
pub use legacy::{LegacyFlavor, LegacyMixing};
pub use mixture::{Mixture, MixtureState};
pub use point::{GasPoint, MixturePoint, SaturationPoint, Sensitive};
pub use split::{PerfectGasMixing, Split};
