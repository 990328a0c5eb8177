//! vm-core: stable foundation for vapormix.
//!
//! Contains:
//! - units (uom SI types + constructors, physical constants)
//! - numeric (tolerance comparisons)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult, ensure_index};
pub use numeric::*;
pub use units::*;
