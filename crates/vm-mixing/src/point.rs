//! Per-point mixture context: split sensitivities and composed properties.
//!
//! Derivatives with respect to a gas fraction `c_j` are taken at constant P and h with the
//! vapor fraction absorbing the change (`dc_0 = −dc_j`).

use crate::error::{MixingError, MixingResult, SolverKind};
use crate::split::{PerfectGasMixing, Split, residual_jacobian};
use nalgebra::Vector2;
use vm_core::constants::R_UNIVERSAL;
use vm_fluids::{
    Composition, Derivative, Flagged, MAX_INCONDENSABLES, Property, Quantity, SaturationProps,
    VaporProps,
};

/// Keeps the molar sums finite when every gas fraction is zero.
const FRACTION_EPS: f64 = 1e-99;

/// A value with its derivatives along P, h and each gas fraction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sensitive {
    pub value: f64,
    pub d_p: f64,
    pub d_h: f64,
    pub d_c: [f64; MAX_INCONDENSABLES],
}

impl Sensitive {
    pub fn constant(value: f64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Derivative requested by a tag; `None` for derivatives this value does not carry.
    pub fn get(&self, derivative: Derivative, gas_count: usize) -> Option<f64> {
        match derivative {
            Derivative::Value => Some(self.value),
            Derivative::Pressure => Some(self.d_p),
            Derivative::Enthalpy => Some(self.d_h),
            Derivative::Fraction(j) if (1..=gas_count).contains(&(j as usize)) => {
                Some(self.d_c[j as usize - 1])
            }
            _ => None,
        }
    }

    /// Value depending on the split only through (Pv, hv), with partials `a_pv`, `a_hv`.
    pub fn chained(value: f64, a_pv: f64, a_hv: f64, pv: &Sensitive, hv: &Sensitive) -> Self {
        let mut d_c = [0.0; MAX_INCONDENSABLES];
        for (k, slot) in d_c.iter_mut().enumerate() {
            *slot = a_pv * pv.d_c[k] + a_hv * hv.d_c[k];
        }
        Self {
            value,
            d_p: a_pv * pv.d_p + a_hv * hv.d_p,
            d_h: a_pv * pv.d_h + a_hv * hv.d_h,
            d_c,
        }
    }

    fn along_p(p: f64) -> Self {
        Self {
            value: p,
            d_p: 1.0,
            ..Self::default()
        }
    }

    fn along_h(h: f64) -> Self {
        Self {
            value: h,
            d_h: 1.0,
            ..Self::default()
        }
    }

    /// Value depending on the point through the gas temperature only.
    fn along_temperature(value: f64, slope: f64, t: &Sensitive) -> Self {
        Self {
            value,
            d_p: slope * t.d_p,
            d_h: slope * t.d_h,
            d_c: t.d_c.map(|d| slope * d),
        }
    }
}

/// Raw gas properties at Tg with their temperature slopes.
#[derive(Debug, Clone, Copy, Default)]
struct GasAtT {
    h: f64,
    cp: f64,
    dcp: f64,
    lambda: f64,
    dlambda: f64,
    mu: f64,
    dmu: f64,
}

/// One incondensable gas evaluated at the mixture temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GasPoint {
    /// Specific gas constant [J/(kg·K)]
    pub r: f64,
    /// Molar mass [g/mol]
    pub molar_mass: f64,
    pub enthalpy: Sensitive,
    pub cp: Sensitive,
    pub lambda: Sensitive,
    pub mu: Sensitive,
    pub partial_pressure: Sensitive,
    pub partial_density: Sensitive,
    /// Binary diffusion coefficient with the vapor
    pub diffusion: Sensitive,
}

/// Everything known about one (P, h, c) point after the split.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MixturePoint {
    pub p: f64,
    pub h: f64,
    pub c: Composition,
    pub gas_count: usize,
    pub split: Split,
    pub vapor: VaporProps,
    /// Saturation at the bulk pressure
    pub sat: SaturationProps,
    /// Saturation at the vapor partial pressure
    pub sat_v: SaturationProps,
    pub pv: Sensitive,
    pub hv: Sensitive,
    pub t: Sensitive,
    pub rho: Sensitive,
    pub rho_v: Sensitive,
    pub cp: Sensitive,
    pub cp_v: Sensitive,
    pub lambda: Sensitive,
    pub lambda_v: Sensitive,
    pub mu: Sensitive,
    pub mu_v: Sensitive,
    pub sigma: Sensitive,
    pub prgr: Sensitive,
    pub xnc: Sensitive,
    pub mnc: Sensitive,
    pub rnc: Sensitive,
    pub dncv: Sensitive,
    pub gases: [GasPoint; MAX_INCONDENSABLES],
}

impl MixturePoint {
    /// Empty point used to check which tags a mixture with `gas_count` gases can produce.
    pub fn template(gas_count: usize) -> Self {
        Self {
            gas_count,
            c: Composition::from_fractions([0.0; vm_fluids::MAX_COMPONENTS], gas_count + 1),
            ..Self::default()
        }
    }

    fn gas(&self, component: u8) -> Option<&GasPoint> {
        let j = component as usize;
        (1..=self.gas_count).contains(&j).then(|| &self.gases[j - 1])
    }

    /// Value of a property tag at this point; `None` if the tag is not producible here.
    pub fn get(&self, property: Property) -> Option<f64> {
        let n = self.gas_count;
        let d = property.derivative;
        match (property.quantity, property.component) {
            (Quantity::Pressure, None) => Sensitive::along_p(self.p).get(d, n),
            (Quantity::Enthalpy, None) => Sensitive::along_h(self.h).get(d, n),
            (Quantity::Temperature, None) => {
                self.vapor_sided(&self.t, d, self.vapor.dt_dp, self.vapor.dt_dh)
            }
            (Quantity::Density, None) => self.rho.get(d, n),
            (Quantity::Cp, None) => self.cp.get(d, n),
            (Quantity::Conductivity, None) => self.lambda.get(d, n),
            (Quantity::Viscosity, None) => self.mu.get(d, n),
            (Quantity::SurfaceTension, None) => {
                self.vapor_sided(&self.sigma, d, self.vapor.dsigma_dp, self.vapor.dsigma_dh)
            }
            (Quantity::GasConstant, None) => self.prgr.get(d, n),
            (Quantity::Diffusivity, None) if n > 0 => self.dncv.get(d, n),
            (Quantity::IncondensableFraction, None) if n > 0 => self.xnc.get(d, n),
            (Quantity::IncondensableMolarMass, None) if n > 0 => self.mnc.get(d, n),
            (Quantity::IncondensableGasConstant, None) if n > 0 => self.rnc.get(d, n),
            (q, None) if q.is_saturation() => saturation_at_pressure(&self.sat, q, d),

            (Quantity::Fraction, Some(i)) => self.fraction(i, d),

            (Quantity::Pressure, Some(0)) => self.vapor_sided(&self.pv, d, 1.0, 0.0),
            (Quantity::Enthalpy, Some(0)) => self.vapor_sided(&self.hv, d, 0.0, 1.0),
            (Quantity::Density, Some(0)) => {
                self.vapor_sided(&self.rho_v, d, self.vapor.drho_dp, self.vapor.drho_dh)
            }
            (Quantity::Cp, Some(0)) => {
                self.vapor_sided(&self.cp_v, d, self.vapor.dcp_dp, self.vapor.dcp_dh)
            }
            (Quantity::Conductivity, Some(0)) => {
                self.vapor_sided(&self.lambda_v, d, self.vapor.dlambda_dp, self.vapor.dlambda_dh)
            }
            (Quantity::Viscosity, Some(0)) => {
                self.vapor_sided(&self.mu_v, d, self.vapor.dmu_dp, self.vapor.dmu_dh)
            }
            (q, Some(0)) if q.is_saturation() => self.saturation_at_vapor_pressure(q, d),

            (q, Some(j)) => {
                let gas = self.gas(j)?;
                match q {
                    Quantity::Pressure => gas.partial_pressure.get(d, n),
                    Quantity::Density => gas.partial_density.get(d, n),
                    Quantity::Enthalpy => gas.enthalpy.get(d, n),
                    Quantity::Cp => gas.cp.get(d, n),
                    Quantity::Conductivity => gas.lambda.get(d, n),
                    Quantity::Viscosity => gas.mu.get(d, n),
                    Quantity::Diffusivity => gas.diffusion.get(d, n),
                    Quantity::GasConstant => (d == Derivative::Value).then_some(gas.r),
                    Quantity::IncondensableMolarMass => {
                        (d == Derivative::Value).then_some(gas.molar_mass)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Vapor-side values also answer partials at fixed (Pv, hv) neighbours.
    fn vapor_sided(&self, s: &Sensitive, d: Derivative, a_pv: f64, a_hv: f64) -> Option<f64> {
        match d {
            Derivative::VaporPressure => Some(a_pv),
            Derivative::VaporEnthalpy => Some(a_hv),
            _ => s.get(d, self.gas_count),
        }
    }

    fn fraction(&self, i: u8, d: Derivative) -> Option<f64> {
        let i = i as usize;
        if i > self.gas_count {
            return None;
        }
        match d {
            Derivative::Value => Some(self.c.fraction(i)),
            Derivative::Pressure | Derivative::Enthalpy => Some(0.0),
            Derivative::Fraction(j) if (1..=self.gas_count).contains(&(j as usize)) => {
                Some(match i {
                    0 => -1.0,
                    _ if i == j as usize => 1.0,
                    _ => 0.0,
                })
            }
            _ => None,
        }
    }

    fn saturation_at_vapor_pressure(&self, q: Quantity, d: Derivative) -> Option<f64> {
        let slope = || self.sat_v.get(q, 1);
        match d {
            Derivative::Value => self.sat_v.get(q, 0),
            Derivative::VaporPressure | Derivative::Saturation => slope(),
            Derivative::VaporEnthalpy => Some(0.0),
            Derivative::VaporSaturationSecond => self.sat_v.get(q, 2),
            Derivative::Pressure | Derivative::Enthalpy | Derivative::Fraction(_) => {
                let dpv = self.pv.get(d, self.gas_count)?;
                Some(slope()? * dpv)
            }
            Derivative::SaturationSecond => None,
        }
    }
}

/// Saturation lookup at the bulk pressure; the curve does not depend on h or c.
pub(crate) fn saturation_at_pressure(
    sat: &SaturationProps,
    q: Quantity,
    d: Derivative,
) -> Option<f64> {
    match d {
        Derivative::Value => sat.get(q, 0),
        Derivative::Saturation | Derivative::Pressure => sat.get(q, 1),
        Derivative::SaturationSecond => sat.get(q, 2),
        Derivative::Enthalpy | Derivative::Fraction(_) => sat.get(q, 0).map(|_| 0.0),
        _ => None,
    }
}

/// Saturation-only point for the single-variable path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SaturationPoint {
    pub p: f64,
    pub sat: SaturationProps,
}

impl SaturationPoint {
    pub fn get(&self, property: Property) -> Option<f64> {
        if property.component.is_some() {
            return None;
        }
        match (property.quantity, property.derivative) {
            (Quantity::Pressure, Derivative::Value) => Some(self.p),
            (Quantity::Pressure, Derivative::Saturation) => Some(1.0),
            (q, d) if q.is_saturation() => match d {
                Derivative::Value | Derivative::Saturation | Derivative::SaturationSecond => {
                    saturation_at_pressure(&self.sat, q, d)
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl PerfectGasMixing<'_> {
    /// Split one (P, h, c) point and compose every mixture property there.
    pub fn evaluate_point(
        &self,
        p: f64,
        h: f64,
        c: &Composition,
    ) -> MixingResult<Flagged<MixturePoint>> {
        let split = self.split(p, h, c)?;
        let sat = self.vapor.saturation(p)?;
        let sat_v = self.vapor.saturation(split.pv)?;
        let status = split.status.worst(sat.status).worst(sat_v.status);

        let point = self.compose(p, h, c, split, sat.value, sat_v.value)?;
        Ok(Flagged::new(point, status))
    }

    fn compose(
        &self,
        p: f64,
        h: f64,
        c: &Composition,
        split: Split,
        sat: SaturationProps,
        sat_v: SaturationProps,
    ) -> MixingResult<MixturePoint> {
        let n = self.gas_count().min(c.gas_count());
        let vapor = split.vapor;
        let tg = vapor.t;
        let c0 = c.vapor();
        let (pv0, hv0) = (split.pv, split.hv);
        let diffusion = &self.config.diffusion;

        // gas properties at Tg
        let mut gases = [GasPoint::default(); MAX_INCONDENSABLES];
        let mut raw = [GasAtT::default(); MAX_INCONDENSABLES];
        let (mut cpsum, mut dcpsum, mut xrsum) = (0.0, 0.0, 0.0);
        for (k, (cj, gas)) in self.weighted_gases(c).enumerate().take(n) {
            let r = gas.gas_constant();
            raw[k] = GasAtT {
                h: gas.h_pt(p, tg)?,
                cp: gas.cp_pt(p, tg)?,
                dcp: gas.dcp_dt_pt(p, tg)?,
                lambda: gas.lambda_pt(p, tg)?,
                dlambda: gas.dlambda_dt_pt(p, tg)?,
                mu: gas.mu_pt(p, tg)?,
                dmu: gas.dmu_dt_pt(p, tg)?,
            };
            gases[k].r = r;
            gases[k].molar_mass = gas.coefficients().molar_mass;
            cpsum += cj * raw[k].cp;
            dcpsum += cj * raw[k].dcp;
            xrsum += cj * r;
        }

        let inv = residual_jacobian(cpsum, xrsum, c0, &vapor)
            .try_inverse()
            .ok_or(MixingError::NonConvergence {
                solver: SolverKind::Split,
                point: None,
                iterations: split.iterations,
            })?;
        let along_p = inv * Vector2::new(0.0, c0);
        let along_h = inv * Vector2::new(1.0, 0.0);
        let mut pv = Sensitive {
            value: pv0,
            d_p: along_p[0],
            d_h: along_h[0],
            ..Sensitive::default()
        };
        let mut hv = Sensitive {
            value: hv0,
            d_p: along_p[1],
            d_h: along_h[1],
            ..Sensitive::default()
        };
        for k in 0..n {
            let along_c = inv
                * Vector2::new(hv0 - raw[k].h, -(p - pv0 + gases[k].r * tg * vapor.rho));
            pv.d_c[k] = along_c[0];
            hv.d_c[k] = along_c[1];
        }

        let t = Sensitive::chained(tg, vapor.dt_dp, vapor.dt_dh, &pv, &hv);
        let rho_v = Sensitive::chained(vapor.rho, vapor.drho_dp, vapor.drho_dh, &pv, &hv);
        let cp_v = Sensitive::chained(vapor.cp, vapor.dcp_dp, vapor.dcp_dh, &pv, &hv);
        let lambda_v =
            Sensitive::chained(vapor.lambda, vapor.dlambda_dp, vapor.dlambda_dh, &pv, &hv);
        let mu_v = Sensitive::chained(vapor.mu, vapor.dmu_dp, vapor.dmu_dh, &pv, &hv);
        let sigma = Sensitive::chained(vapor.sigma, vapor.dsigma_dp, vapor.dsigma_dh, &pv, &hv);

        let fldr = R_UNIVERSAL / self.vapor.molar_mass();
        let prgr_value = c0 * fldr + xrsum;
        let mut prgr = Sensitive::constant(prgr_value);
        for k in 0..n {
            prgr.d_c[k] = gases[k].r - fldr;
        }

        // density
        let den = prgr_value * tg;
        let rho_value = (p - pv0 + fldr * vapor.rho * tg) / den;
        let rho_num = |dpv: f64, drv: f64, dt: f64| -dpv + fldr * (drv * tg + vapor.rho * dt);
        let mut rho = Sensitive {
            value: rho_value,
            d_p: (1.0 + rho_num(pv.d_p, rho_v.d_p, t.d_p) - rho_value * prgr_value * t.d_p) / den,
            d_h: (rho_num(pv.d_h, rho_v.d_h, t.d_h) - rho_value * prgr_value * t.d_h) / den,
            ..Sensitive::default()
        };
        for k in 0..n {
            rho.d_c[k] = (rho_num(pv.d_c[k], rho_v.d_c[k], t.d_c[k])
                - rho_value * (t.d_c[k] * prgr_value + tg * (gases[k].r - fldr)))
                / den;
        }

        // heat capacity
        let mut cp = Sensitive {
            value: c0 * vapor.cp + cpsum,
            d_p: c0 * cp_v.d_p + dcpsum * t.d_p,
            d_h: c0 * cp_v.d_h + dcpsum * t.d_h,
            ..Sensitive::default()
        };
        for k in 0..n {
            cp.d_c[k] = c0 * cp_v.d_c[k] + raw[k].cp - vapor.cp + dcpsum * t.d_c[k];
        }

        // transport: gas-constant weighted averages
        let transport = |v: &Sensitive, gas_values: &[(f64, f64); MAX_INCONDENSABLES]| {
            let (mut sum, mut dsum) = (0.0, 0.0);
            for (k, (cj, _)) in self.weighted_gases(c).enumerate().take(n) {
                let (value, slope) = gas_values[k];
                sum += cj * gases[k].r * value;
                dsum += cj * gases[k].r * slope;
            }
            let value = (c0 * fldr * v.value + sum) / prgr_value;
            let mut out = Sensitive {
                value,
                d_p: (c0 * fldr * v.d_p + dsum * t.d_p) / prgr_value,
                d_h: (c0 * fldr * v.d_h + dsum * t.d_h) / prgr_value,
                ..Sensitive::default()
            };
            for k in 0..n {
                let r = gases[k].r;
                out.d_c[k] = (c0 * fldr * v.d_c[k] + dsum * t.d_c[k] + gas_values[k].0 * r
                    - v.value * fldr
                    + (fldr - r) * value)
                    / prgr_value;
            }
            out
        };
        let lambda = transport(&lambda_v, &raw.map(|g| (g.lambda, g.dlambda)));
        let mu = transport(&mu_v, &raw.map(|g| (g.mu, g.dmu)));

        // incondensable molar sums, molar masses in g/mol
        let fractions = c.gases();
        let mut xnc = Sensitive::constant(0.0);
        let mut inv_mass = 0.0;
        for k in 0..n {
            xnc.value += fractions[k] + FRACTION_EPS;
            xnc.d_c[k] = 1.0;
            inv_mass += (fractions[k] + FRACTION_EPS) / gases[k].molar_mass;
        }
        let mut mnc = Sensitive::constant(if n > 0 { xnc.value / inv_mass } else { 0.0 });
        let mut rnc = Sensitive::constant(if n > 0 { 1e3 * R_UNIVERSAL / mnc.value } else { 0.0 });
        for k in 0..n {
            mnc.d_c[k] = mnc.value / xnc.value * (1.0 - mnc.value / gases[k].molar_mass);
            rnc.d_c[k] = -1e3 * R_UNIVERSAL / (mnc.value * mnc.value) * mnc.d_c[k];
        }

        // Fuller binary diffusion with the vapor
        let m_vapor = self.vapor.molar_mass() * 1e3;
        let e = diffusion.temperature_exponent;
        let dv_vapor = diffusion.vapor_diffusion_volume.cbrt();
        let mut inv_diff = 0.0;
        let mut coeffs = [0.0; MAX_INCONDENSABLES];
        for (k, (_, gas)) in self.weighted_gases(c).enumerate().take(n) {
            let meq = 2.0 / (1.0 / gases[k].molar_mass + 1.0 / m_vapor);
            let volumes = gas.coefficients().diffusion_volume.cbrt() + dv_vapor;
            coeffs[k] = diffusion.fuller_coefficient * tg.powf(e)
                / (p * meq.sqrt() * volumes * volumes);
            inv_diff += (fractions[k] + FRACTION_EPS) / coeffs[k];
        }
        let log_slope = |dt: f64| e * dt / tg;
        let dncv_value = if n > 0 { xnc.value / inv_diff } else { 0.0 };
        let mut dncv = Sensitive {
            value: dncv_value,
            d_p: dncv_value * (log_slope(t.d_p) - 1.0 / p),
            d_h: dncv_value * log_slope(t.d_h),
            ..Sensitive::default()
        };
        for k in 0..n {
            dncv.d_c[k] = dncv_value / xnc.value * (1.0 - dncv_value / coeffs[k])
                + dncv_value * log_slope(t.d_c[k]);
        }

        for k in 0..n {
            let at = raw[k];
            let cj = fractions[k];
            let r = gases[k].r;
            let g = &mut gases[k];
            g.enthalpy = Sensitive::along_temperature(at.h, at.cp, &t);
            g.cp = Sensitive::along_temperature(at.cp, at.dcp, &t);
            g.lambda = Sensitive::along_temperature(at.lambda, at.dlambda, &t);
            g.mu = Sensitive::along_temperature(at.mu, at.dmu, &t);

            let mut partial = Sensitive {
                value: r * tg * rho.value * cj,
                d_p: r * cj * (t.d_p * rho.value + tg * rho.d_p),
                d_h: r * cj * (t.d_h * rho.value + tg * rho.d_h),
                ..Sensitive::default()
            };
            let mut density = Sensitive {
                value: rho.value * cj,
                d_p: rho.d_p * cj,
                d_h: rho.d_h * cj,
                ..Sensitive::default()
            };
            for m in 0..n {
                let own = if m == k { 1.0 } else { 0.0 };
                partial.d_c[m] =
                    r * cj * (t.d_c[m] * rho.value + tg * rho.d_c[m]) + own * r * tg * rho.value;
                density.d_c[m] = rho.d_c[m] * cj + own * rho.value;
            }
            g.partial_pressure = partial;
            g.partial_density = density;

            let dj = coeffs[k];
            let mut diff = Sensitive {
                value: dj,
                d_p: dj * (log_slope(t.d_p) - 1.0 / p),
                d_h: dj * log_slope(t.d_h),
                ..Sensitive::default()
            };
            for m in 0..n {
                diff.d_c[m] = dj * log_slope(t.d_c[m]);
            }
            g.diffusion = diff;
        }

        Ok(MixturePoint {
            p,
            h,
            c: *c,
            gas_count: n,
            split,
            vapor,
            sat,
            sat_v,
            pv,
            hv,
            t,
            rho,
            rho_v,
            cp,
            cp_v,
            lambda,
            lambda_v,
            mu,
            mu_v,
            sigma,
            prgr,
            xnc,
            mnc,
            rnc,
            dncv,
            gases,
        })
    }
}
