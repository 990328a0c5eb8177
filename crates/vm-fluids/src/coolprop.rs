//! Water vapor evaluated with CoolProp through rfluids.
//!
//! CoolProp gives values only, so the partials the mixing solver needs are central
//! differences of the backend state. Below the dew line the vapor is extended linearly from
//! the dry side and flagged [`PointStatus::OutOfRange`].

use crate::error::{FluidError, FluidResult};
use crate::model::validation::{validate_enthalpy, validate_pressure, validate_temperature};
use crate::model::{ReferenceState, SaturationProps, VaporModel, VaporProps};
use crate::status::{Flagged, PointStatus};
use rfluids::prelude::*;
use std::fmt::Display;

const T_TRIPLE: f64 = 273.16;
/// Upper end of the validity window used for status flags [K]
const T_MAX: f64 = 1273.15;
/// Pressure at which the enthalpy cap is taken [Pa]
const P_CAP: f64 = 1.0e5;

/// Relative pressure step for first derivatives
const DP_REL: f64 = 1e-4;
/// Relative pressure step for the second saturation derivative
const DP2_REL: f64 = 1e-3;
/// Enthalpy step [J/kg]
const DH: f64 = 10.0;
/// Dry-side offset from the saturated-vapor enthalpy [J/kg]
const DEW_MARGIN: f64 = 50.0;
/// Span of the secant used below the dew line [J/kg]
const DEW_SPAN: f64 = 1.0e3;

fn backend_error(what: &str, err: impl Display) -> FluidError {
    FluidError::Backend {
        message: format!("rfluids error {what}: {err}"),
    }
}

/// Single-phase vapor quantities at one (p, h).
#[derive(Clone, Copy, Debug)]
struct DryState {
    t: f64,
    rho: f64,
    cp: f64,
    lambda: f64,
    mu: f64,
}

impl DryState {
    fn zip(self, other: DryState, f: impl Fn(f64, f64) -> f64) -> DryState {
        DryState {
            t: f(self.t, other.t),
            rho: f(self.rho, other.rho),
            cp: f(self.cp, other.cp),
            lambda: f(self.lambda, other.lambda),
            mu: f(self.mu, other.mu),
        }
    }

    /// Central difference between `up` and `down` taken `2·step` apart.
    fn slope(up: DryState, down: DryState, step: f64) -> DryState {
        up.zip(down, |u, d| (u - d) / (2.0 * step))
    }
}

/// Saturated liquid and vapor at one pressure.
#[derive(Clone, Copy, Debug)]
struct SatLine {
    t: f64,
    h_l: f64,
    h_v: f64,
    rho_l: f64,
    rho_v: f64,
    cp_l: f64,
    cp_v: f64,
}

/// CoolProp `Water` (IAPWS-95) as the condensable vapor.
#[derive(Clone, Debug, PartialEq)]
pub struct CoolPropSteam {
    molar_mass: f64,
    t_crit: f64,
    p_crit: f64,
    p_triple: f64,
    h_max: f64,
    reference: Option<ReferenceState>,
}

impl CoolPropSteam {
    /// Query the fixed points of water from the backend.
    pub fn new() -> FluidResult<Self> {
        let mut water = Fluid::from(Pure::Water);
        let molar_mass = water
            .molar_mass()
            .map_err(|e| backend_error("getting molar mass", e))?;
        let t_crit = water
            .critical_temperature()
            .map_err(|e| backend_error("getting critical temperature", e))?;
        let p_crit = water
            .critical_pressure()
            .map_err(|e| backend_error("getting critical pressure", e))?;
        let p_triple = Self::at_tq(T_TRIPLE, 1.0)?
            .pressure()
            .map_err(|e| backend_error("getting triple-point pressure", e))?;
        let h_max = Fluid::from(Pure::Water)
            .in_state(FluidInput::pressure(P_CAP), FluidInput::temperature(T_MAX))
            .map_err(|e| backend_error(&format!("at P={P_CAP} Pa, T={T_MAX} K"), e))?
            .enthalpy()
            .map_err(|e| backend_error("getting enthalpy", e))?;
        Ok(Self {
            molar_mass,
            t_crit,
            p_crit,
            p_triple,
            h_max,
            reference: None,
        })
    }

    /// Ask mixtures built on this vapor to anchor their gases at `reference`.
    pub fn with_reference(mut self, reference: ReferenceState) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn critical_pressure(&self) -> f64 {
        self.p_crit
    }

    fn at_ph(p: f64, h: f64) -> FluidResult<Fluid> {
        Fluid::from(Pure::Water)
            .in_state(FluidInput::pressure(p), FluidInput::enthalpy(h))
            .map_err(|e| backend_error(&format!("at P={p} Pa, h={h} J/kg"), e))
    }

    fn at_pq(p: f64, q: f64) -> FluidResult<Fluid> {
        Fluid::from(Pure::Water)
            .in_state(FluidInput::pressure(p), FluidInput::quality(q))
            .map_err(|e| backend_error(&format!("at P={p} Pa, Q={q}"), e))
    }

    fn at_tq(t: f64, q: f64) -> FluidResult<Fluid> {
        Fluid::from(Pure::Water)
            .in_state(FluidInput::temperature(t), FluidInput::quality(q))
            .map_err(|e| backend_error(&format!("at T={t} K, Q={q}"), e))
    }

    fn dry_state(p: f64, h: f64) -> FluidResult<DryState> {
        let mut fluid = Self::at_ph(p, h)?;
        Ok(DryState {
            t: fluid
                .temperature()
                .map_err(|e| backend_error("getting temperature", e))?,
            rho: fluid
                .density()
                .map_err(|e| backend_error("getting density", e))?,
            cp: fluid
                .specific_heat()
                .map_err(|e| backend_error("getting specific heat", e))?,
            lambda: fluid
                .conductivity()
                .map_err(|e| backend_error("getting conductivity", e))?,
            mu: fluid
                .dynamic_viscosity()
                .map_err(|e| backend_error("getting viscosity", e))?,
        })
    }

    fn has_dew_line(&self, p: f64) -> bool {
        p >= self.p_triple && p < self.p_crit
    }

    /// Vapor state at (p, h), extended linearly below the dew line.
    fn vapor_state(&self, p: f64, h: f64) -> FluidResult<Flagged<DryState>> {
        if !self.has_dew_line(p) {
            let state = Self::dry_state(p, h)?;
            return Ok(Flagged::new(state, self.range_status(p, state.t)));
        }
        let h_dew = Self::at_pq(p, 1.0)?
            .enthalpy()
            .map_err(|e| backend_error("getting dew enthalpy", e))?
            + DEW_MARGIN;
        if h >= h_dew {
            let state = Self::dry_state(p, h)?;
            return Ok(Flagged::new(state, self.range_status(p, state.t)));
        }

        let near = Self::dry_state(p, h_dew)?;
        let far = Self::dry_state(p, h_dew + DEW_SPAN)?;
        let x = (h - h_dew) / DEW_SPAN;
        let state = near.zip(far, |a, b| a + x * (b - a));
        if state.t <= 0.0 || state.rho <= 0.0 {
            return Err(FluidError::OutOfRange {
                what: "vapor enthalpy far below the dew line",
            });
        }
        Ok(Flagged::new(state, PointStatus::OutOfRange))
    }

    fn sat_line(&self, p: f64) -> FluidResult<SatLine> {
        if !self.has_dew_line(p) {
            return Err(FluidError::OutOfRange {
                what: "saturation pressure",
            });
        }
        let mut liquid = Self::at_pq(p, 0.0)?;
        let mut vapor = Self::at_pq(p, 1.0)?;
        Ok(SatLine {
            t: vapor
                .temperature()
                .map_err(|e| backend_error("getting saturation temperature", e))?,
            h_l: liquid
                .enthalpy()
                .map_err(|e| backend_error("getting liquid enthalpy", e))?,
            h_v: vapor
                .enthalpy()
                .map_err(|e| backend_error("getting vapor enthalpy", e))?,
            rho_l: liquid
                .density()
                .map_err(|e| backend_error("getting liquid density", e))?,
            rho_v: vapor
                .density()
                .map_err(|e| backend_error("getting vapor density", e))?,
            cp_l: liquid
                .specific_heat()
                .map_err(|e| backend_error("getting liquid specific heat", e))?,
            cp_v: vapor
                .specific_heat()
                .map_err(|e| backend_error("getting vapor specific heat", e))?,
        })
    }

    /// Surface tension on the saturation line at `p`; zero where there is none.
    fn surface_tension(&self, p: f64) -> f64 {
        if !self.has_dew_line(p) {
            return 0.0;
        }
        Self::at_pq(p, 0.0)
            .and_then(|mut fluid| {
                fluid
                    .surface_tension()
                    .map_err(|e| backend_error("getting surface tension", e))
            })
            .unwrap_or(0.0)
    }

    fn range_status(&self, p: f64, t: f64) -> PointStatus {
        if (T_TRIPLE..=T_MAX).contains(&t) && p <= self.p_crit {
            PointStatus::Good
        } else {
            PointStatus::OutOfRange
        }
    }
}

impl VaporModel for CoolPropSteam {
    fn name(&self) -> &str {
        "CoolProp water"
    }

    fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    fn critical_temperature(&self) -> f64 {
        self.t_crit
    }

    fn max_enthalpy(&self) -> f64 {
        self.h_max
    }

    fn reference_state(&self) -> Option<ReferenceState> {
        self.reference
    }

    fn saturation(&self, p: f64) -> FluidResult<Flagged<SaturationProps>> {
        validate_pressure(p)?;
        let dp = DP_REL * p;
        let mid = self.sat_line(p)?;
        let up = self.sat_line(p + dp)?;
        let down = self.sat_line(p - dp)?;
        let d = |u: f64, l: f64| (u - l) / (2.0 * dp);

        let dp2 = DP2_REL * p;
        let up2 = self.sat_line(p + dp2)?;
        let down2 = self.sat_line(p - dp2)?;

        let props = SaturationProps {
            p,
            t: mid.t,
            dt_dp: d(up.t, down.t),
            d2t_dp2: (up2.t - 2.0 * mid.t + down2.t) / (dp2 * dp2),
            h_l: mid.h_l,
            dh_l_dp: d(up.h_l, down.h_l),
            h_v: mid.h_v,
            dh_v_dp: d(up.h_v, down.h_v),
            rho_l: mid.rho_l,
            drho_l_dp: d(up.rho_l, down.rho_l),
            rho_v: mid.rho_v,
            drho_v_dp: d(up.rho_v, down.rho_v),
            cp_l: mid.cp_l,
            dcp_l_dp: d(up.cp_l, down.cp_l),
            cp_v: mid.cp_v,
            dcp_v_dp: d(up.cp_v, down.cp_v),
        };
        Ok(Flagged::good(props))
    }

    fn saturation_pressure(&self, t: f64) -> FluidResult<Flagged<f64>> {
        validate_temperature(t)?;
        if !(T_TRIPLE..self.t_crit).contains(&t) {
            return Err(FluidError::OutOfRange {
                what: "saturation temperature",
            });
        }
        let p = Self::at_tq(t, 1.0)?
            .pressure()
            .map_err(|e| backend_error("getting saturation pressure", e))?;
        Ok(Flagged::good(p))
    }

    fn state_ph(&self, p: f64, h: f64) -> FluidResult<Flagged<VaporProps>> {
        validate_pressure(p)?;
        validate_enthalpy(h)?;
        let base = self.vapor_state(p, h)?;
        let dp = DP_REL * p;
        let along_p = DryState::slope(
            self.vapor_state(p + dp, h)?.value,
            self.vapor_state(p - dp, h)?.value,
            dp,
        );
        let along_h = DryState::slope(
            self.vapor_state(p, h + DH)?.value,
            self.vapor_state(p, h - DH)?.value,
            DH,
        );
        let sigma = self.surface_tension(p);
        let dsigma_dp =
            (self.surface_tension(p + dp) - self.surface_tension(p - dp)) / (2.0 * dp);

        let state = base.value;
        let props = VaporProps {
            t: state.t,
            dt_dp: along_p.t,
            dt_dh: along_h.t,
            rho: state.rho,
            drho_dp: along_p.rho,
            drho_dh: along_h.rho,
            cp: state.cp,
            dcp_dp: along_p.cp,
            dcp_dh: along_h.cp,
            lambda: state.lambda,
            dlambda_dp: along_p.lambda,
            dlambda_dh: along_h.lambda,
            mu: state.mu,
            dmu_dp: along_p.mu,
            dmu_dh: along_h.mu,
            sigma,
            dsigma_dp,
            dsigma_dh: 0.0,
        };
        Ok(Flagged::new(props, base.status))
    }

    fn temperature_ph(&self, p: f64, h: f64) -> FluidResult<Flagged<f64>> {
        validate_pressure(p)?;
        validate_enthalpy(h)?;
        Ok(self.vapor_state(p, h)?.map(|s| s.t))
    }
}
