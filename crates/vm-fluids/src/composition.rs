//! Mass fractions of a vapor/incondensable mixture.

use crate::error::{FluidError, FluidResult};
use vm_core::numeric::{Tolerances, nearly_equal};

/// Maximum number of incondensable gases in a mixture.
pub const MAX_INCONDENSABLES: usize = 4;

/// Condensable vapor slot plus the incondensable slots.
pub const MAX_COMPONENTS: usize = MAX_INCONDENSABLES + 1;

/// Mass fractions `c_0..c_{n-1}`, slot 0 being the condensable vapor.
///
/// Slots past `len` are zero. The batch path builds compositions straight from caller
/// fields with [`Composition::from_fractions`] and does not check that they sum to one;
/// [`Composition::new`] validates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composition {
    fractions: [f64; MAX_COMPONENTS],
    len: usize,
}

impl Default for Composition {
    fn default() -> Self {
        Self::pure_vapor()
    }
}

impl Composition {
    /// Pure vapor.
    pub fn pure_vapor() -> Self {
        let mut fractions = [0.0; MAX_COMPONENTS];
        fractions[0] = 1.0;
        Self { fractions, len: 1 }
    }

    /// Create a composition from mass fractions.
    ///
    /// Validates the count and that all fractions are finite and non-negative. Fractions are
    /// kept as given; [`Composition::is_closed`] tells whether they sum to one.
    pub fn new(fractions: &[f64]) -> FluidResult<Self> {
        if fractions.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "empty composition",
            });
        }
        if fractions.len() > MAX_COMPONENTS {
            return Err(FluidError::InvalidArg {
                what: "too many constituents",
            });
        }
        for frac in fractions {
            if !frac.is_finite() {
                return Err(FluidError::NonPhysical {
                    what: "non-finite mass fraction",
                });
            }
            if *frac < 0.0 {
                return Err(FluidError::NonPhysical {
                    what: "negative mass fraction",
                });
            }
        }
        let mut slots = [0.0; MAX_COMPONENTS];
        slots[..fractions.len()].copy_from_slice(fractions);
        Ok(Self {
            fractions: slots,
            len: fractions.len(),
        })
    }

    /// Unchecked construction from a full slot array.
    pub fn from_fractions(fractions: [f64; MAX_COMPONENTS], len: usize) -> Self {
        let len = len.clamp(1, MAX_COMPONENTS);
        let mut fractions = fractions;
        for slot in fractions.iter_mut().skip(len) {
            *slot = 0.0;
        }
        Self { fractions, len }
    }

    /// Number of constituents, vapor included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of incondensable gases.
    pub fn gas_count(&self) -> usize {
        self.len - 1
    }

    /// Vapor fraction `c_0`.
    pub fn vapor(&self) -> f64 {
        self.fractions[0]
    }

    /// Fraction of slot `index` (0.0 past the constituent count).
    pub fn fraction(&self, index: usize) -> f64 {
        self.fractions.get(index).copied().unwrap_or(0.0)
    }

    /// Incondensable fractions `c_1..c_{n-1}`.
    pub fn gases(&self) -> &[f64] {
        &self.fractions[1..self.len]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.fractions[..self.len]
    }

    pub fn sum(&self) -> f64 {
        self.as_slice().iter().sum()
    }

    /// Check that the fractions sum to one within `tol`.
    pub fn is_closed(&self, tol: Tolerances) -> bool {
        nearly_equal(self.sum(), 1.0, tol)
    }
}
