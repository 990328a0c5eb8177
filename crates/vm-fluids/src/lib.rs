//! vm-fluids: pure-fluid building blocks for vapor/incondensable mixtures.
//!
//! Provides:
//! - Property tags and their string names
//! - Borrowed batch fields and per-point error fields
//! - Mass-fraction compositions (one vapor + up to four gases)
//! - Evaluator traits for the condensable vapor and the incondensable gases
//! - A perfect-gas model with a small gas catalog
//! - Water vapor from CoolProp (rfluids), and an ideal-steam model for quick estimates
//!
//! # Example
//!
//! ```
//! use vm_fluids::{IdealSteam, IncondensableGas, VaporModel, catalog};
//!
//! let steam = IdealSteam::new();
//! let sat = steam.saturation(101_325.0).unwrap();
//! assert!((sat.value.t - 373.15).abs() < 1e-6);
//!
//! let air = catalog::gas("air").unwrap();
//! assert!(air.h_pt(1e5, 300.0).unwrap() > 0.0);
//! ```

pub mod catalog;
pub mod composition;
pub mod coolprop;
pub mod error;
pub mod field;
pub mod model;
pub mod perfect_gas;
pub mod property;
pub mod status;
pub mod steam;
pub mod units;

pub use catalog::GasCatalogEntry;
pub use composition::{Composition, MAX_COMPONENTS, MAX_INCONDENSABLES};
pub use coolprop::CoolPropSteam;
pub use error::{FluidError, FluidResult};
pub use field::{ErrorField, Field, FieldMut};
pub use model::{
    GasCoefficients, GasTable, IncondensableGas, ReferenceState, SaturationProps, VaporModel,
    VaporProps,
};
pub use perfect_gas::PerfectGas;
pub use property::{Derivative, Property, Quantity};
pub use status::{Flagged, PointStatus, Severity};
pub use steam::IdealSteam;
pub use units::{UnitError, UnitKind, parse_quantity};
