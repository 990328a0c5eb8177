//! Enthalpy search for a target temperature at fixed pressure and composition.

use crate::error::{MixingError, MixingResult, SolverKind};
use crate::split::PerfectGasMixing;
use tracing::{debug, trace, warn};
use vm_fluids::{Composition, Flagged};

impl PerfectGasMixing<'_> {
    /// Starting enthalpy: saturated vapor shifted by a sensible cp, plus the gases at `t`.
    fn initial_enthalpy(&self, p: f64, t: f64, c: &Composition) -> MixingResult<f64> {
        let sat = self.vapor.saturation(p)?.value;
        let mut h = (sat.h_v + (t - sat.t) * self.config.temperature.sensible_cp) * c.vapor();
        for (cj, gas) in self.weighted_gases(c) {
            h += cj * gas.h_pt(p, t)?;
        }
        Ok(h)
    }

    /// Mixture enthalpy at (P, T).
    ///
    /// Scalar Newton on `T(P, h) = t_target` using the composed dT/dh; the enthalpy is kept
    /// below the vapor model's maximum. The returned status is the worst one seen at the
    /// last evaluated point.
    pub fn enthalpy_pt(
        &self,
        p: f64,
        t_target: f64,
        c: &Composition,
    ) -> MixingResult<Flagged<f64>> {
        let cfg = &self.config.temperature;
        let h_max = self.vapor.max_enthalpy();
        let mut h = self.initial_enthalpy(p, t_target, c)?.min(h_max);

        for iter in 0..cfg.max_iterations {
            let point = self.evaluate_point(p, h, c)?;
            let t = point.value.t;
            let dt = t_target - t.value;
            h = (h + dt / t.d_h).min(h_max);
            trace!(iter, h, t = t.value, dt, "temperature iteration");

            if !h.is_finite() {
                debug!(iter, p, t_target, "enthalpy update is not finite");
                return Err(MixingError::NonConvergence {
                    solver: SolverKind::Temperature,
                    point: None,
                    iterations: iter + 1,
                });
            }
            if dt.abs() <= cfg.tolerance {
                debug!(iterations = iter + 1, h, "temperature target reached");
                return Ok(Flagged::new(h, point.status));
            }
        }

        warn!(
            p,
            t_target,
            max_iterations = cfg.max_iterations,
            "temperature solver hit the iteration cap"
        );
        Err(MixingError::NonConvergence {
            solver: SolverKind::Temperature,
            point: None,
            iterations: cfg.max_iterations,
        })
    }
}
