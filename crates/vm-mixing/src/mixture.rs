//! The mixing facade: constituents, compute mode, configuration and entry points.

use crate::component::{Component, MixingMode, select_mode};
use crate::config::SolverConfig;
use crate::error::{MixingError, MixingResult};
use crate::inputs::{InputLayout, check_lengths};
use crate::legacy::{compute_cathare, compute_cathare2};
use crate::point::MixturePoint;
use crate::split::{PerfectGasMixing, Split};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uom::si::pressure::pascal;
use vm_core::{
    CoreError, Density, DynVisc, Pressure, Temperature, ThermalConductivity, ensure_index, k,
    kg_m3, pa, pa_s, w_mk,
};
use vm_fluids::{
    Composition, ErrorField, Field, FieldMut, Flagged, IncondensableGas, MAX_COMPONENTS,
    PointStatus, Severity,
};

/// Scalar mixture state in typed units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureState {
    pub temperature: Temperature,
    pub density: Density,
    pub viscosity: DynVisc,
    pub conductivity: ThermalConductivity,
    pub vapor_pressure: Pressure,
    pub status: PointStatus,
}

/// A vapor/incondensable mixture.
///
/// Reconfiguration takes `&mut self` and evaluation `&self`, so a mixture cannot change while
/// a computation borrows it.
#[derive(Clone)]
pub struct Mixture {
    components: Vec<Component>,
    /// Incondensables as evaluated, rebased on the vapor reference state when it has one
    gases: Vec<Arc<dyn IncondensableGas>>,
    mode: MixingMode,
    config: SolverConfig,
    alphas: Vec<f64>,
}

impl Mixture {
    /// Create a mixture from its constituents, vapor (or legacy kernel) first.
    pub fn new(components: Vec<Component>) -> MixingResult<Self> {
        let mut mixture = Self {
            components: Vec::new(),
            gases: Vec::new(),
            mode: MixingMode::Unsupported,
            config: SolverConfig::default(),
            alphas: Vec::new(),
        };
        mixture.set_components(components)?;
        Ok(mixture)
    }

    pub fn with_config(mut self, config: SolverConfig) -> MixingResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Apply `section.key=value` options to the solver configuration.
    pub fn init<S: AsRef<str>>(&mut self, options: &[S]) -> MixingResult<()> {
        self.config.apply_options(options)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replace every constituent. Volume fractions reset to pure vapor.
    pub fn set_components(&mut self, components: Vec<Component>) -> MixingResult<()> {
        if components.is_empty() || components.len() > MAX_COMPONENTS {
            return Err(MixingError::input_property(format!(
                "{} constituents (expected 1 to {MAX_COMPONENTS})",
                components.len()
            )));
        }
        self.components = components;
        self.alphas = vec![0.0; self.components.len()];
        self.alphas[0] = 1.0;
        self.refresh();
        Ok(())
    }

    /// Replace constituent `index`.
    pub fn set_component(&mut self, index: usize, component: Component) -> MixingResult<()> {
        ensure_index(index, self.components.len(), "constituent")?;
        self.components[index] = component;
        self.refresh();
        Ok(())
    }

    /// Re-derive the mode and the evaluated gas list.
    fn refresh(&mut self) {
        self.mode = select_mode(&self.components);
        let reference = match self.mode {
            MixingMode::PerfectGas => self.components[0]
                .as_vapor()
                .and_then(|vapor| vapor.reference_state()),
            _ => None,
        };
        self.gases = self.components[1..]
            .iter()
            .filter_map(|component| match component {
                Component::Gas(gas) => Some(
                    reference
                        .and_then(|r| gas.rebased(r))
                        .unwrap_or_else(|| Arc::clone(gas)),
                ),
                _ => None,
            })
            .collect();
        debug!(
            mode = %self.mode,
            constituents = self.components.len(),
            rebased = reference.is_some(),
            "mixture mode derived"
        );
    }

    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn nb_fluids(&self) -> usize {
        self.components.len()
    }

    pub fn mode(&self) -> MixingMode {
        self.mode
    }

    /// Incondensables as the solver sees them.
    pub fn gases(&self) -> impl Iterator<Item = &dyn IncondensableGas> {
        self.gases.iter().map(|gas| gas.as_ref())
    }

    pub fn set_alphas(&mut self, alphas: &[f64]) -> MixingResult<()> {
        if alphas.len() != self.components.len() {
            return Err(MixingError::DataNumber {
                what: "alpha".to_string(),
                len: alphas.len(),
                expected: self.components.len(),
            });
        }
        self.alphas.copy_from_slice(alphas);
        Ok(())
    }

    pub fn set_alpha(&mut self, index: usize, alpha: f64) -> MixingResult<()> {
        ensure_index(index, self.alphas.len(), "alpha")?;
        self.alphas[index] = alpha;
        Ok(())
    }

    pub fn alpha(&self, index: usize) -> MixingResult<f64> {
        self.alphas.get(index).copied().ok_or_else(|| {
            CoreError::IndexOob {
                what: "alpha",
                index,
                len: self.alphas.len(),
            }
            .into()
        })
    }

    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    fn engine(&self) -> MixingResult<PerfectGasMixing<'_>> {
        if self.mode != MixingMode::PerfectGas {
            return Err(MixingError::not_implemented(format!(
                "perfect-gas evaluation in {} mode",
                self.mode
            )));
        }
        let vapor = self.components[0].as_vapor().ok_or_else(|| {
            MixingError::not_implemented("perfect-gas evaluation without a vapor model")
        })?;
        let gases = self.gases.iter().map(|gas| gas.as_ref()).collect();
        Ok(PerfectGasMixing::new(vapor, gases, &self.config))
    }

    fn check_composition(&self, c: &Composition) -> MixingResult<()> {
        if c.len() != self.components.len() {
            return Err(MixingError::input_property(format!(
                "{} mass fractions for {} constituents",
                c.len(),
                self.components.len()
            )));
        }
        Ok(())
    }

    /// Evaluate tagged outputs from tagged inputs, point by point.
    ///
    /// Returns the worst severity found in `errors`. Call-level failures fill `errors` with
    /// their status; a solver failure marks its point and aborts before any output is
    /// written.
    pub fn compute(
        &self,
        inputs: &[Field<'_>],
        outputs: &mut [FieldMut<'_>],
        errors: &mut ErrorField<'_>,
    ) -> MixingResult<Severity> {
        errors.fill(PointStatus::Good);
        match self.dispatch(inputs, outputs, errors) {
            Ok(severity) => Ok(severity),
            Err(err @ MixingError::NonConvergence { .. }) => Err(err),
            Err(err) => {
                errors.fill(err.status());
                Err(err)
            }
        }
    }

    fn dispatch(
        &self,
        inputs: &[Field<'_>],
        outputs: &mut [FieldMut<'_>],
        errors: &mut ErrorField<'_>,
    ) -> MixingResult<Severity> {
        check_lengths(inputs, outputs, errors.len())?;
        match self.mode {
            MixingMode::Cathare | MixingMode::Cathare2 => {
                let kernel = self.components[0].as_legacy().ok_or_else(|| {
                    MixingError::not_implemented("legacy mode without a legacy kernel")
                })?;
                let gases: Vec<&dyn IncondensableGas> =
                    self.gases.iter().map(|gas| gas.as_ref()).collect();
                if self.mode == MixingMode::Cathare {
                    compute_cathare(kernel, &gases, inputs, outputs, errors)
                } else {
                    compute_cathare2(kernel, &gases, inputs, outputs, errors)
                }
            }
            MixingMode::PerfectGas => {
                let layout = InputLayout::classify(inputs, self.components.len())?;
                self.engine()?.compute_batch(&layout, outputs, errors)?;
                Ok(errors.severity())
            }
            MixingMode::Unsupported => Err(MixingError::not_implemented(format!(
                "mixing of {self}"
            ))),
        }
    }

    /// Split bulk (P, h) into vapor partial pressure and enthalpy.
    pub fn split_ph(&self, p: f64, h: f64, c: &Composition) -> MixingResult<Split> {
        self.check_composition(c)?;
        self.engine()?.split(p, h, c)
    }

    /// Full mixture context at (P, h).
    pub fn evaluate_ph(
        &self,
        p: f64,
        h: f64,
        c: &Composition,
    ) -> MixingResult<Flagged<MixturePoint>> {
        self.check_composition(c)?;
        self.engine()?.evaluate_point(p, h, c)
    }

    /// Mixture enthalpy at (P, T).
    pub fn enthalpy_pt(&self, p: f64, t: f64, c: &Composition) -> MixingResult<Flagged<f64>> {
        self.check_composition(c)?;
        self.engine()?.enthalpy_pt(p, t, c)
    }

    /// Fraction-weighted temperature of the constituents each taken alone at (P, h).
    ///
    /// A cheap starting estimate, not the mixture temperature.
    pub fn weighted_temperature(
        &self,
        p: f64,
        h: f64,
        c: &Composition,
    ) -> MixingResult<Flagged<f64>> {
        self.check_composition(c)?;
        let vapor = self.components[0].as_vapor().ok_or_else(|| {
            MixingError::not_implemented(format!("temperature estimate in {} mode", self.mode))
        })?;
        let t_vapor = vapor.temperature_ph(p, h)?;
        let mut estimate = t_vapor.map(|t| c.vapor() * t);
        for (cj, gas) in c.gases().iter().zip(self.gases.iter()) {
            estimate.value += cj * gas.t_ph(p, h)?;
        }
        Ok(estimate)
    }

    /// Scalar (P, h) evaluation with typed results.
    pub fn state_ph(&self, p: Pressure, h: f64, c: &Composition) -> MixingResult<MixtureState> {
        let point = self.evaluate_ph(p.get::<pascal>(), h, c)?;
        let status = point.status;
        let point = point.value;
        Ok(MixtureState {
            temperature: k(point.t.value),
            density: kg_m3(point.rho.value),
            viscosity: pa_s(point.mu.value),
            conductivity: w_mk(point.lambda.value),
            vapor_pressure: pa(point.pv.value),
            status,
        })
    }
}

impl fmt::Debug for Mixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mixture")
            .field("mode", &self.mode)
            .field("components", &self.components)
            .field("alphas", &self.alphas)
            .finish()
    }
}

impl fmt::Display for Mixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.mode)?;
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", component.name())?;
        }
        f.write_str("]")
    }
}
