//! Incondensable perfect gas with constant cp and quadratic transport laws.

use crate::error::{FluidError, FluidResult};
use crate::model::validation::{validate_cp, validate_enthalpy, validate_temperature};
use crate::model::{GasCoefficients, GasTable, IncondensableGas, ReferenceState};
use std::sync::Arc;

/// Perfect gas: `h = h_ref + cp·(T − T_ref)`, `ρ = p/(r·T)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PerfectGas {
    name: String,
    table: GasTable,
    coefficients: GasCoefficients,
    reference: ReferenceState,
}

impl PerfectGas {
    /// Create a gas anchored at `h = 0` for `T = 0 K`.
    pub fn new(name: impl Into<String>, coefficients: GasCoefficients) -> FluidResult<Self> {
        if !(coefficients.r.is_finite() && coefficients.r > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "gas constant must be positive",
            });
        }
        validate_cp(coefficients.cp)?;
        if !(coefficients.molar_mass.is_finite() && coefficients.molar_mass > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "molar mass must be positive",
            });
        }
        if !(coefficients.diffusion_volume.is_finite() && coefficients.diffusion_volume > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "diffusion volume must be positive",
            });
        }
        Ok(Self {
            name: name.into(),
            table: GasTable::PerfectGas,
            coefficients,
            reference: ReferenceState {
                t_ref: 0.0,
                h_ref: 0.0,
            },
        })
    }

    pub fn with_reference(mut self, reference: ReferenceState) -> Self {
        self.reference = reference;
        self
    }

    /// Declare which correlation family this gas stands for.
    pub fn with_table(mut self, table: GasTable) -> Self {
        self.table = table;
        self
    }

    pub fn reference(&self) -> ReferenceState {
        self.reference
    }

    pub fn density_pt(&self, p: f64, t: f64) -> FluidResult<f64> {
        validate_temperature(t)?;
        Ok(p / (self.coefficients.r * t))
    }

    fn poly(c: &[f64; 3], t: f64) -> f64 {
        c[0] + t * (c[1] + t * c[2])
    }

    fn dpoly(c: &[f64; 3], t: f64) -> f64 {
        c[1] + 2.0 * t * c[2]
    }
}

impl IncondensableGas for PerfectGas {
    fn name(&self) -> &str {
        &self.name
    }

    fn table(&self) -> GasTable {
        self.table
    }

    fn coefficients(&self) -> &GasCoefficients {
        &self.coefficients
    }

    fn h_pt(&self, _p: f64, t: f64) -> FluidResult<f64> {
        if !t.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "temperature must be finite",
            });
        }
        Ok(self.reference.h_ref + self.coefficients.cp * (t - self.reference.t_ref))
    }

    fn t_ph(&self, _p: f64, h: f64) -> FluidResult<f64> {
        validate_enthalpy(h)?;
        Ok((h - self.reference.h_ref) / self.coefficients.cp + self.reference.t_ref)
    }

    fn cp_pt(&self, _p: f64, _t: f64) -> FluidResult<f64> {
        Ok(self.coefficients.cp)
    }

    fn lambda_pt(&self, _p: f64, t: f64) -> FluidResult<f64> {
        Ok(Self::poly(&self.coefficients.conductivity, t))
    }

    fn dlambda_dt_pt(&self, _p: f64, t: f64) -> FluidResult<f64> {
        Ok(Self::dpoly(&self.coefficients.conductivity, t))
    }

    fn mu_pt(&self, _p: f64, t: f64) -> FluidResult<f64> {
        Ok(Self::poly(&self.coefficients.viscosity, t))
    }

    fn dmu_dt_pt(&self, _p: f64, t: f64) -> FluidResult<f64> {
        Ok(Self::dpoly(&self.coefficients.viscosity, t))
    }

    fn rebased(&self, reference: ReferenceState) -> Option<Arc<dyn IncondensableGas>> {
        Some(Arc::new(self.clone().with_reference(reference)))
    }
}
