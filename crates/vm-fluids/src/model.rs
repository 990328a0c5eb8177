//! Pure-fluid evaluator contracts consumed by the mixing solver.

use crate::error::{FluidError, FluidResult};
use crate::property::Quantity;
use crate::status::Flagged;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Saturation curve of the condensable species at one pressure.
///
/// Derivatives are taken along the curve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SaturationProps {
    pub p: f64,
    pub t: f64,
    pub dt_dp: f64,
    pub d2t_dp2: f64,
    pub h_l: f64,
    pub dh_l_dp: f64,
    pub h_v: f64,
    pub dh_v_dp: f64,
    pub rho_l: f64,
    pub drho_l_dp: f64,
    pub rho_v: f64,
    pub drho_v_dp: f64,
    pub cp_l: f64,
    pub dcp_l_dp: f64,
    pub cp_v: f64,
    pub dcp_v_dp: f64,
}

impl SaturationProps {
    /// Look up a saturation quantity; `order` 0 is the value, 1 the first pressure
    /// derivative, 2 the second (temperature only).
    pub fn get(&self, quantity: Quantity, order: u8) -> Option<f64> {
        let (value, slope) = match quantity {
            Quantity::SatPressure => (self.p, 1.0),
            Quantity::SatTemperature => {
                return match order {
                    0 => Some(self.t),
                    1 => Some(self.dt_dp),
                    2 => Some(self.d2t_dp2),
                    _ => None,
                };
            }
            Quantity::LiquidSatEnthalpy => (self.h_l, self.dh_l_dp),
            Quantity::VaporSatEnthalpy => (self.h_v, self.dh_v_dp),
            Quantity::LiquidSatDensity => (self.rho_l, self.drho_l_dp),
            Quantity::VaporSatDensity => (self.rho_v, self.drho_v_dp),
            Quantity::LiquidSatCp => (self.cp_l, self.dcp_l_dp),
            Quantity::VaporSatCp => (self.cp_v, self.dcp_v_dp),
            _ => return None,
        };
        match order {
            0 => Some(value),
            1 => Some(slope),
            _ => None,
        }
    }
}

/// Vapor properties at (Pv, hv) with their partials w.r.t. Pv and hv.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VaporProps {
    pub t: f64,
    pub dt_dp: f64,
    pub dt_dh: f64,
    pub rho: f64,
    pub drho_dp: f64,
    pub drho_dh: f64,
    pub cp: f64,
    pub dcp_dp: f64,
    pub dcp_dh: f64,
    pub lambda: f64,
    pub dlambda_dp: f64,
    pub dlambda_dh: f64,
    pub mu: f64,
    pub dmu_dp: f64,
    pub dmu_dh: f64,
    pub sigma: f64,
    pub dsigma_dp: f64,
    pub dsigma_dh: f64,
}

/// Enthalpy anchor: the temperature at which a model's enthalpy equals `h_ref`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceState {
    pub t_ref: f64,
    pub h_ref: f64,
}

/// Correlation family an incondensable gas belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GasTable {
    PerfectGas,
    Cathare,
}

/// Per-species constants used for Dalton mixing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GasCoefficients {
    /// Specific gas constant [J/(kg·K)]
    pub r: f64,
    /// Specific heat at constant pressure [J/(kg·K)]
    pub cp: f64,
    /// Molar mass [g/mol]
    pub molar_mass: f64,
    /// λ(T) = l0 + l1·T + l2·T² [W/(m·K)]
    pub conductivity: [f64; 3],
    /// μ(T) = m0 + m1·T + m2·T² [Pa·s]
    pub viscosity: [f64; 3],
    /// Fuller diffusion volume
    pub diffusion_volume: f64,
}

/// Condensable species, evaluated in its vapor phase.
///
/// Implementations must be thread-safe (Send + Sync). A `Flagged` result carries a soft
/// status (value produced outside validity bounds); an `Err` means no value at all.
pub trait VaporModel: Send + Sync {
    fn name(&self) -> &str;

    /// Molar mass [kg/mol].
    fn molar_mass(&self) -> f64;

    fn critical_temperature(&self) -> f64;

    /// Largest enthalpy the model accepts [J/kg].
    fn max_enthalpy(&self) -> f64;

    /// Enthalpy anchor the incondensables of a mixture should share, if any.
    fn reference_state(&self) -> Option<ReferenceState> {
        None
    }

    fn saturation(&self, p: f64) -> FluidResult<Flagged<SaturationProps>>;

    fn saturation_pressure(&self, t: f64) -> FluidResult<Flagged<f64>>;

    fn state_ph(&self, p: f64, h: f64) -> FluidResult<Flagged<VaporProps>>;

    fn temperature_ph(&self, p: f64, h: f64) -> FluidResult<Flagged<f64>> {
        Ok(self.state_ph(p, h)?.map(|s| s.t))
    }
}

/// Incondensable gas evaluated alone at (p, T).
pub trait IncondensableGas: Send + Sync {
    fn name(&self) -> &str;

    fn table(&self) -> GasTable {
        GasTable::PerfectGas
    }

    fn coefficients(&self) -> &GasCoefficients;

    /// Specific gas constant [J/(kg·K)].
    fn gas_constant(&self) -> f64 {
        self.coefficients().r
    }

    /// Molar mass [kg/mol].
    fn molar_mass(&self) -> f64 {
        self.coefficients().molar_mass * 1e-3
    }

    fn h_pt(&self, p: f64, t: f64) -> FluidResult<f64>;

    fn t_ph(&self, p: f64, h: f64) -> FluidResult<f64>;

    fn cp_pt(&self, p: f64, t: f64) -> FluidResult<f64>;

    fn dcp_dt_pt(&self, _p: f64, _t: f64) -> FluidResult<f64> {
        Ok(0.0)
    }

    fn lambda_pt(&self, p: f64, t: f64) -> FluidResult<f64>;

    fn dlambda_dt_pt(&self, p: f64, t: f64) -> FluidResult<f64>;

    fn mu_pt(&self, p: f64, t: f64) -> FluidResult<f64>;

    fn dmu_dt_pt(&self, p: f64, t: f64) -> FluidResult<f64>;

    /// Copy of this gas anchored at `reference`, when the model supports it.
    fn rebased(&self, _reference: ReferenceState) -> Option<Arc<dyn IncondensableGas>> {
        None
    }
}

/// Validation helpers for fluid properties.
pub(crate) mod validation {
    use super::*;

    /// Ensure pressure is positive and finite.
    pub fn validate_pressure(p: f64) -> FluidResult<()> {
        if !p.is_finite() || p <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure temperature is positive and finite.
    pub fn validate_temperature(t: f64) -> FluidResult<()> {
        if !t.is_finite() || t <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure specific heat capacity is positive and finite.
    pub fn validate_cp(cp: f64) -> FluidResult<()> {
        if !cp.is_finite() || cp <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "cp must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure enthalpy is finite (can be negative).
    pub fn validate_enthalpy(h: f64) -> FluidResult<()> {
        if !h.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "enthalpy must be finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn validate_positive_pressure() {
        assert!(validate_pressure(101325.0).is_ok());
        assert!(validate_pressure(-100.0).is_err());
        assert!(validate_pressure(0.0).is_err());
        assert!(validate_pressure(f64::NAN).is_err());
    }

    #[test]
    fn validate_positive_temperature() {
        assert!(validate_temperature(300.0).is_ok());
        assert!(validate_temperature(-10.0).is_err());
        assert!(validate_temperature(0.0).is_err());
    }

    #[test]
    fn validate_cp_and_enthalpy() {
        assert!(validate_cp(1000.0).is_ok());
        assert!(validate_cp(0.0).is_err());
        assert!(validate_enthalpy(-2.0e5).is_ok());
        assert!(validate_enthalpy(f64::INFINITY).is_err());
    }

    #[test]
    fn saturation_lookup_orders() {
        let sat = SaturationProps {
            p: 1e5,
            t: 372.8,
            dt_dp: 2.7e-4,
            d2t_dp2: -2e-9,
            h_v: 2.675e6,
            dh_v_dp: 0.5,
            ..Default::default()
        };
        assert_eq!(sat.get(Quantity::SatTemperature, 2), Some(-2e-9));
        assert_eq!(sat.get(Quantity::VaporSatEnthalpy, 1), Some(0.5));
        assert_eq!(sat.get(Quantity::VaporSatEnthalpy, 2), None);
        assert_eq!(sat.get(Quantity::SatPressure, 0), Some(1e5));
        assert_eq!(sat.get(Quantity::Density, 0), None);
    }
}
