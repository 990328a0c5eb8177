//! Vapor/incondensable split: bulk (P, h) to partial vapor pressure and enthalpy.
//!
//! Solves, at one point,
//!
//! ```text
//! F = Σ cⱼ·hⱼ(P, Tg) + c0·hv − h                 = 0
//! G = (Σ cⱼ·rⱼ)·Tg·ρv(Pv, hv) + c0·(Pv − P)      = 0
//! ```
//!
//! with a damped 2x2 Newton iteration, Tg being the vapor temperature at (Pv, hv).

use crate::config::SolverConfig;
use crate::error::{MixingError, MixingResult, SolverKind};
use nalgebra::{Matrix2, Vector2};
use tracing::{debug, trace, warn};
use vm_core::constants::T_ZERO_CELSIUS;
use vm_fluids::{Composition, IncondensableGas, PointStatus, VaporModel, VaporProps};

/// Perfect-gas mixing engine over one vapor and its incondensables.
///
/// Borrows everything; the facade builds one per call.
pub struct PerfectGasMixing<'a> {
    pub(crate) vapor: &'a dyn VaporModel,
    pub(crate) gases: Vec<&'a dyn IncondensableGas>,
    pub(crate) config: &'a SolverConfig,
}

/// Converged split at one point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Split {
    /// Partial vapor pressure [Pa]
    pub pv: f64,
    /// Vapor specific enthalpy [J/kg]
    pub hv: f64,
    pub iterations: usize,
    /// Worst soft status raised by the vapor model on the way
    pub status: PointStatus,
    /// Vapor state at (pv, hv)
    pub vapor: VaporProps,
}

/// Gas sums evaluated at the vapor critical temperature.
#[derive(Debug, Clone, Copy)]
struct GasSums {
    cpsum: f64,
    xrsum: f64,
    hsum: f64,
}

impl<'a> PerfectGasMixing<'a> {
    pub fn new(
        vapor: &'a dyn VaporModel,
        gases: Vec<&'a dyn IncondensableGas>,
        config: &'a SolverConfig,
    ) -> Self {
        Self {
            vapor,
            gases,
            config,
        }
    }

    pub fn gas_count(&self) -> usize {
        self.gases.len()
    }

    /// Pairs of (fraction, gas) for the incondensables of `c`.
    pub(crate) fn weighted_gases<'c>(
        &'c self,
        c: &'c Composition,
    ) -> impl Iterator<Item = (f64, &'a dyn IncondensableGas)> + 'c {
        c.gases().iter().copied().zip(self.gases.iter().copied())
    }

    fn gas_sums(&self, p: f64, c: &Composition) -> MixingResult<GasSums> {
        let t_crit = self.vapor.critical_temperature();
        let mut sums = GasSums {
            cpsum: 0.0,
            xrsum: 0.0,
            hsum: 0.0,
        };
        for (cj, gas) in self.weighted_gases(c) {
            let cp = gas.cp_pt(p, t_crit)?;
            sums.cpsum += cj * cp;
            sums.xrsum += cj * gas.gas_constant();
            sums.hsum += cj * (gas.h_pt(p, t_crit)? - cp * (t_crit - T_ZERO_CELSIUS));
        }
        Ok(sums)
    }

    /// Largest pressure step accepted as converged.
    fn pressure_tolerance(&self, c: &Composition) -> f64 {
        let cfg = &self.config.split;
        let smallest = c
            .as_slice()
            .iter()
            .filter(|&&ci| ci > 0.0)
            .map(|&ci| cfg.pressure_tolerance * ci)
            .fold(cfg.pressure_tolerance, f64::min);
        smallest.max(cfg.pressure_tolerance_floor)
    }

    fn non_convergence(iterations: usize) -> MixingError {
        MixingError::NonConvergence {
            solver: SolverKind::Split,
            point: None,
            iterations,
        }
    }

    /// Split bulk (P, h) into (Pv, hv).
    pub fn split(&self, p: f64, h: f64, c: &Composition) -> MixingResult<Split> {
        let cfg = &self.config.split;
        let c0 = c.vapor();
        let sums = self.gas_sums(p, c)?;

        let mut pv = (c0 * p).max(cfg.min_vapor_pressure);

        // linearized saturation estimate of hv
        let sat = self
            .vapor
            .saturation(pv)
            .map_err(|err| {
                debug!(pv, error = %err, "saturation failed at initial vapor pressure");
                Self::non_convergence(0)
            })?
            .value;
        let acp = cfg.linear_cp + pv * cfg.linear_cp_slope;
        let h0 = sat.h_v - acp * (sat.t - T_ZERO_CELSIUS);
        let t_lin = (h - h0 * c0 - sums.hsum) / (sums.cpsum + c0 * acp);
        let mut hv = acp * t_lin + h0;

        let valp = self.pressure_tolerance(c);
        let valh = cfg.enthalpy_tolerance;
        let pv_floor = cfg.min_vapor_pressure.max(cfg.vapor_pressure_floor * c0);

        for iter in 0..cfg.max_iterations {
            let state = self.vapor.state_ph(pv, hv).map_err(|err| {
                debug!(iter, pv, hv, error = %err, "vapor state left its domain");
                Self::non_convergence(iter)
            })?;
            let vapor = state.value;
            let tg = vapor.t;

            let mut gas_h = 0.0;
            for (cj, gas) in self.weighted_gases(c) {
                gas_h += cj * gas.h_pt(p, tg)?;
            }
            let f = gas_h + c0 * hv - h;
            let g = sums.xrsum * tg * vapor.rho + c0 * (pv - p);

            let jac = residual_jacobian(sums.cpsum, sums.xrsum, c0, &vapor);
            let step = jac
                .try_inverse()
                .map(|inv| inv * Vector2::new(-f, -g))
                .filter(|s| s.iter().all(|x| x.is_finite()))
                .ok_or_else(|| {
                    debug!(iter, pv, hv, "singular split jacobian");
                    Self::non_convergence(iter)
                })?;

            trace!(iter, pv, hv, f, g, dpv = step[0], dhv = step[1], "split iteration");

            pv = (pv + step[0]).max(pv_floor);
            hv += step[1];

            if step[0].abs() <= valp && step[1].abs() <= valh {
                let final_state = self
                    .vapor
                    .state_ph(pv, hv)
                    .map_err(|_| Self::non_convergence(iter + 1))?;
                debug!(iterations = iter + 1, pv, hv, "split converged");
                return Ok(Split {
                    pv,
                    hv,
                    iterations: iter + 1,
                    status: final_state.status,
                    vapor: final_state.value,
                });
            }
        }

        warn!(
            p,
            h,
            max_iterations = cfg.max_iterations,
            "split hit the iteration cap"
        );
        Err(Self::non_convergence(cfg.max_iterations))
    }
}

/// Jacobian of (F, G) with respect to (Pv, hv).
pub(crate) fn residual_jacobian(
    cpsum: f64,
    xrsum: f64,
    c0: f64,
    vapor: &VaporProps,
) -> Matrix2<f64> {
    let dfdpv = cpsum * vapor.dt_dp;
    let dfdhv = cpsum * vapor.dt_dh + c0;
    let dgdpv = xrsum * (vapor.t * vapor.drho_dp + vapor.rho * vapor.dt_dp) + c0;
    let dgdhv = xrsum * (vapor.t * vapor.drho_dh + vapor.rho * vapor.dt_dh);
    Matrix2::new(dfdpv, dfdhv, dgdpv, dgdhv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vm_fluids::{IdealSteam, catalog};

    fn residuals(
        engine: &PerfectGasMixing<'_>,
        p: f64,
        h: f64,
        c: &Composition,
        s: &Split,
    ) -> (f64, f64) {
        let tg = s.vapor.t;
        let mut gas_h = 0.0;
        let mut xrsum = 0.0;
        for (cj, gas) in engine.weighted_gases(c) {
            gas_h += cj * gas.h_pt(p, tg).unwrap();
            xrsum += cj * gas.gas_constant();
        }
        (
            gas_h + c.vapor() * s.hv - h,
            xrsum * tg * s.vapor.rho + c.vapor() * (s.pv - p),
        )
    }

    #[test]
    fn steam_air_split() {
        let steam = IdealSteam::new();
        let air = catalog::gas("air").unwrap();
        let config = SolverConfig::default();
        let engine = PerfectGasMixing::new(&steam, vec![&air], &config);
        let c = Composition::new(&[0.95, 0.05]).unwrap();

        let s = engine.split(1e5, 2.6e6, &c).unwrap();
        assert!(s.pv > 9.0e4 && s.pv < 1e5, "pv = {}", s.pv);
        assert!((s.vapor.t - 393.0).abs() < 3.0, "Tg = {}", s.vapor.t);
        assert!(s.iterations <= 10);

        let (f, g) = residuals(&engine, 1e5, 2.6e6, &c, &s);
        assert!(f.abs() < 5.0, "F = {f}");
        assert!(g.abs() < 50.0, "G = {g}");
    }

    #[test]
    fn pure_vapor_split_is_trivial() {
        let steam = IdealSteam::new();
        let config = SolverConfig::default();
        let engine = PerfectGasMixing::new(&steam, Vec::new(), &config);
        let c = Composition::pure_vapor();

        let s = engine.split(2e5, 2.8e6, &c).unwrap();
        assert!((s.pv - 2e5).abs() < 1e-6);
        assert!((s.hv - 2.8e6).abs() < 1e-6);
    }

    #[test]
    fn jacobian_layout() {
        let vapor = VaporProps {
            t: 400.0,
            dt_dh: 5e-4,
            rho: 0.5,
            drho_dp: 5e-6,
            drho_dh: -6e-7,
            ..Default::default()
        };
        let jac = residual_jacobian(50.0, 14.0, 0.95, &vapor);
        assert_eq!(jac[(0, 0)], 0.0);
        assert!((jac[(0, 1)] - (50.0 * 5e-4 + 0.95)).abs() < 1e-12);
        assert!((jac[(1, 0)] - (14.0 * 400.0 * 5e-6 + 0.95)).abs() < 1e-12);
        assert!((jac[(1, 1)] - 14.0 * (400.0 * -6e-7 + 0.5 * 5e-4)).abs() < 1e-12);
    }

    #[test]
    fn pressure_tolerance_follows_smallest_fraction() {
        let steam = IdealSteam::new();
        let config = SolverConfig::default();
        let engine = PerfectGasMixing::new(&steam, Vec::new(), &config);

        let c = Composition::new(&[0.999, 0.001]).unwrap();
        assert!((engine.pressure_tolerance(&c) - 5.0).abs() < 1e-12);
        let c = Composition::new(&[0.9, 0.1]).unwrap();
        assert!((engine.pressure_tolerance(&c) - 100.0).abs() < 1e-9);
        assert!((engine.pressure_tolerance(&Composition::pure_vapor()) - 1e3).abs() < 1e-9);
    }
}
