//! Water vapor as an ideal gas with a Clausius-Clapeyron saturation curve.
//!
//! Good enough to drive the mixing solver over the usual steam/air range
//! (roughly 0.01 to 22 MPa, 273 to 1273 K). Outside that window values are still produced
//! and flagged [`PointStatus::OutOfRange`].

use crate::error::{FluidError, FluidResult};
use crate::model::validation::{validate_enthalpy, validate_pressure, validate_temperature};
use crate::model::{ReferenceState, SaturationProps, VaporModel, VaporProps};
use crate::status::{Flagged, PointStatus};
use vm_core::constants::R_UNIVERSAL;

/// Molar mass [kg/mol]
const MOLAR_MASS: f64 = 0.018_015_268;
/// Specific gas constant of water [J/(kg·K)]
const R: f64 = R_UNIVERSAL / MOLAR_MASS;
const T_CRIT: f64 = 647.096;
const P_CRIT: f64 = 22.064e6;

/// Normal boiling point anchoring the saturation curve and the enthalpy scale
const T0: f64 = 373.15;
const P0: f64 = 101_325.0;
const H_V0: f64 = 2.676e6;
/// Latent heat, held constant along the curve [J/kg]
const LATENT: f64 = 2.257e6;

/// cp(T) = CP_A + CP_B·(T − T0)
const CP_A: f64 = 2000.0;
const CP_B: f64 = 0.5;

const T_MIN: f64 = 273.16;
const T_MAX: f64 = 1273.15;

const RHO_L0: f64 = 958.4;
const BETA_L: f64 = 7.5e-4;
const CP_L0: f64 = 4216.0;
const CP_L1: f64 = 2.0;

const MU: [f64; 2] = [-2.8e-6, 4.0e-8];
const LAMBDA: [f64; 2] = [-1.1e-3, 7.0e-5];

/// IAPWS surface tension: σ = B·τ^μ·(1 + b·τ), τ = 1 − T/Tc
const SIGMA_B: f64 = 0.2358;
const SIGMA_SMALL_B: f64 = -0.625;
const SIGMA_MU: f64 = 1.256;

/// Ideal-gas steam model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdealSteam {
    reference: Option<ReferenceState>,
}

impl IdealSteam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask mixtures built on this vapor to anchor their gases at `reference`.
    pub fn with_reference(mut self, reference: ReferenceState) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Vapor enthalpy at temperature `t` [J/kg].
    pub fn enthalpy(t: f64) -> f64 {
        let x = t - T0;
        H_V0 + CP_A * x + 0.5 * CP_B * x * x
    }

    pub fn cp(t: f64) -> f64 {
        CP_A + CP_B * (t - T0)
    }

    /// Inverse of [`IdealSteam::enthalpy`].
    pub fn temperature(h: f64) -> FluidResult<f64> {
        validate_enthalpy(h)?;
        let dh = h - H_V0;
        let disc = CP_A * CP_A + 2.0 * CP_B * dh;
        if disc < 0.0 {
            return Err(FluidError::NonPhysical {
                what: "enthalpy below steam model range",
            });
        }
        // rationalized root, no cancellation near dh = 0
        let t = T0 + 2.0 * dh / (CP_A + disc.sqrt());
        validate_temperature(t)?;
        Ok(t)
    }

    /// Saturation temperature and its pressure slope.
    fn saturation_temperature(p: f64) -> FluidResult<(f64, f64)> {
        validate_pressure(p)?;
        let inv = 1.0 / T0 - (R / LATENT) * (p / P0).ln();
        if inv <= 0.0 {
            return Err(FluidError::OutOfRange {
                what: "saturation pressure",
            });
        }
        let t = 1.0 / inv;
        Ok((t, R * t * t / (LATENT * p)))
    }

    fn surface_tension(t_sat: f64) -> (f64, f64) {
        let tau = 1.0 - t_sat / T_CRIT;
        if tau <= 0.0 {
            return (0.0, 0.0);
        }
        let sigma = SIGMA_B * tau.powf(SIGMA_MU) * (1.0 + SIGMA_SMALL_B * tau);
        let dsigma_dtau = SIGMA_B
            * (SIGMA_MU * tau.powf(SIGMA_MU - 1.0) * (1.0 + SIGMA_SMALL_B * tau)
                + SIGMA_SMALL_B * tau.powf(SIGMA_MU));
        (sigma, -dsigma_dtau / T_CRIT)
    }

    fn range_status(p: f64, t: f64) -> PointStatus {
        if !(T_MIN..=T_MAX).contains(&t) || p > P_CRIT {
            PointStatus::OutOfRange
        } else {
            PointStatus::Good
        }
    }
}

impl VaporModel for IdealSteam {
    fn name(&self) -> &str {
        "ideal steam"
    }

    fn molar_mass(&self) -> f64 {
        MOLAR_MASS
    }

    fn critical_temperature(&self) -> f64 {
        T_CRIT
    }

    fn max_enthalpy(&self) -> f64 {
        Self::enthalpy(T_MAX)
    }

    fn reference_state(&self) -> Option<ReferenceState> {
        self.reference
    }

    fn saturation(&self, p: f64) -> FluidResult<Flagged<SaturationProps>> {
        let (t, dt_dp) = Self::saturation_temperature(p)?;
        let d2t_dp2 = (R / LATENT) * (2.0 * t * dt_dp / p - t * t / (p * p));

        let h_v = Self::enthalpy(t);
        let dh_v_dp = Self::cp(t) * dt_dp;
        let rho_v = p / (R * t);
        let drho_v_dp = 1.0 / (R * t) - rho_v / t * dt_dp;

        let props = SaturationProps {
            p,
            t,
            dt_dp,
            d2t_dp2,
            h_l: h_v - LATENT,
            dh_l_dp: dh_v_dp,
            h_v,
            dh_v_dp,
            rho_l: RHO_L0 * (1.0 - BETA_L * (t - T0)),
            drho_l_dp: -RHO_L0 * BETA_L * dt_dp,
            rho_v,
            drho_v_dp,
            cp_l: CP_L0 + CP_L1 * (t - T0),
            dcp_l_dp: CP_L1 * dt_dp,
            cp_v: Self::cp(t),
            dcp_v_dp: CP_B * dt_dp,
        };
        let status = if p > P_CRIT || t < T_MIN {
            PointStatus::OutOfRange
        } else {
            PointStatus::Good
        };
        Ok(Flagged::new(props, status))
    }

    fn saturation_pressure(&self, t: f64) -> FluidResult<Flagged<f64>> {
        validate_temperature(t)?;
        let p = P0 * ((LATENT / R) * (1.0 / T0 - 1.0 / t)).exp();
        let status = if (T_MIN..=T_CRIT).contains(&t) {
            PointStatus::Good
        } else {
            PointStatus::OutOfRange
        };
        Ok(Flagged::new(p, status))
    }

    fn state_ph(&self, p: f64, h: f64) -> FluidResult<Flagged<VaporProps>> {
        validate_pressure(p)?;
        let t = Self::temperature(h)?;
        let cp = Self::cp(t);
        let dt_dh = 1.0 / cp;
        let rho = p / (R * t);

        let (sigma, dsigma_dp) = match Self::saturation_temperature(p) {
            Ok((t_sat, dtsat_dp)) => {
                let (sigma, dsigma_dt) = Self::surface_tension(t_sat);
                (sigma, dsigma_dt * dtsat_dp)
            }
            Err(_) => (0.0, 0.0),
        };

        let props = VaporProps {
            t,
            dt_dp: 0.0,
            dt_dh,
            rho,
            drho_dp: 1.0 / (R * t),
            drho_dh: -rho / t * dt_dh,
            cp,
            dcp_dp: 0.0,
            dcp_dh: CP_B * dt_dh,
            lambda: LAMBDA[0] + LAMBDA[1] * t,
            dlambda_dp: 0.0,
            dlambda_dh: LAMBDA[1] * dt_dh,
            mu: MU[0] + MU[1] * t,
            dmu_dp: 0.0,
            dmu_dh: MU[1] * dt_dh,
            sigma,
            dsigma_dp,
            dsigma_dh: 0.0,
        };
        Ok(Flagged::new(props, Self::range_status(p, t)))
    }

    fn temperature_ph(&self, p: f64, h: f64) -> FluidResult<Flagged<f64>> {
        validate_pressure(p)?;
        let t = Self::temperature(h)?;
        Ok(Flagged::new(t, Self::range_status(p, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boiling_point_at_one_atmosphere() {
        let sat = IdealSteam::new().saturation(P0).unwrap();
        assert_eq!(sat.status, PointStatus::Good);
        assert!((sat.value.t - T0).abs() < 1e-9);
        assert!((sat.value.h_v - H_V0).abs() < 1e-6);
        assert!((sat.value.h_v - sat.value.h_l - LATENT).abs() < 1e-6);
    }

    #[test]
    fn saturation_pressure_inverts_curve() {
        let steam = IdealSteam::new();
        let p = steam.saturation_pressure(420.0).unwrap().value;
        let sat = steam.saturation(p).unwrap().value;
        assert!((sat.t - 420.0).abs() < 1e-8);
    }

    #[test]
    fn temperature_inverts_enthalpy() {
        for t in [280.0, 373.15, 500.0, 1200.0] {
            let h = IdealSteam::enthalpy(t);
            assert!((IdealSteam::temperature(h).unwrap() - t).abs() < 1e-8);
        }
    }

    #[test]
    fn saturation_slopes_match_finite_differences() {
        let steam = IdealSteam::new();
        let p = 5.0e5;
        let dp = 1.0;
        let lo = steam.saturation(p - dp).unwrap().value;
        let mid = steam.saturation(p).unwrap().value;
        let hi = steam.saturation(p + dp).unwrap().value;
        let fd = |a: f64, b: f64| (b - a) / (2.0 * dp);
        assert!((fd(lo.t, hi.t) - mid.dt_dp).abs() < 1e-9);
        assert!((fd(lo.h_v, hi.h_v) - mid.dh_v_dp).abs() < 1e-4);
        assert!((fd(lo.rho_v, hi.rho_v) - mid.drho_v_dp).abs() < 1e-9);
        assert!((fd(lo.dt_dp, hi.dt_dp) - mid.d2t_dp2).abs() < 1e-14);
    }

    #[test]
    fn state_partials_match_finite_differences() {
        let steam = IdealSteam::new();
        let (p, h) = (9.0e4, 2.72e6);
        let base = steam.state_ph(p, h).unwrap().value;
        let dh = 10.0;
        let up = steam.state_ph(p, h + dh).unwrap().value;
        let down = steam.state_ph(p, h - dh).unwrap().value;
        assert!(((up.t - down.t) / (2.0 * dh) - base.dt_dh).abs() < 1e-9);
        assert!(((up.rho - down.rho) / (2.0 * dh) - base.drho_dh).abs() < 1e-12);
        let dp = 10.0;
        let up = steam.state_ph(p + dp, h).unwrap().value;
        let down = steam.state_ph(p - dp, h).unwrap().value;
        assert!(((up.rho - down.rho) / (2.0 * dp) - base.drho_dp).abs() < 1e-12);
        assert!(((up.sigma - down.sigma) / (2.0 * dp) - base.dsigma_dp).abs() < 1e-12);
    }

    #[test]
    fn out_of_window_is_flagged_not_refused() {
        let steam = IdealSteam::new();
        let hot = steam.state_ph(1e5, 5.5e6).unwrap();
        assert_eq!(hot.status, PointStatus::OutOfRange);
        assert!(hot.value.t > T_MAX);
        assert!(steam.state_ph(-1.0, 2.6e6).is_err());
        assert!(steam.state_ph(1e5, -9.0e6).is_err());
    }
}
