//! YAML batch cases.
//!
//! ```yaml
//! name: condenser inlet
//! state: ph
//! gases:
//!   - catalog: air
//! points:
//!   - { p: "1 bar", h: "2600 kJ/kg", c: [0.95, 0.05] }
//! outputs: [T, rho, p_0]
//! ```

use crate::error::{CliError, CliResult};
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use vm_core::Tolerances;
use vm_fluids::{
    Composition, CoolPropSteam, ErrorField, Field, FieldMut, GasCoefficients, IdealSteam,
    PerfectGas, PointStatus, Property, ReferenceState, UnitKind, catalog, parse_quantity,
};
use vm_mixing::{Component, Mixture, SolverConfig};

/// How closely the mass fractions of a point must sum to one.
const CLOSURE: Tolerances = Tolerances::new(1e-9, 1e-6);

/// Condensable vapor model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VaporKind {
    /// IAPWS-95 water through CoolProp
    #[default]
    Coolprop,
    /// Ideal-gas steam with a Clausius-Clapeyron saturation curve
    Ideal,
}

impl VaporKind {
    pub fn component(self, reference: Option<ReferenceState>) -> CliResult<Component> {
        Ok(match (self, reference) {
            (VaporKind::Coolprop, Some(r)) => {
                Component::vapor(CoolPropSteam::new()?.with_reference(r))
            }
            (VaporKind::Coolprop, None) => Component::vapor(CoolPropSteam::new()?),
            (VaporKind::Ideal, Some(r)) => Component::vapor(IdealSteam::new().with_reference(r)),
            (VaporKind::Ideal, None) => Component::vapor(IdealSteam::new()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    Ph,
    Pt,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GasSpec {
    Catalog {
        catalog: String,
    },
    Custom {
        name: String,
        coefficients: GasCoefficients,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointSpec {
    pub p: String,
    #[serde(default)]
    pub h: Option<String>,
    #[serde(default)]
    pub t: Option<String>,
    pub c: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    #[serde(default)]
    pub name: Option<String>,
    pub state: StateKind,
    #[serde(default)]
    pub vapor: VaporKind,
    #[serde(default)]
    pub reference: Option<ReferenceState>,
    #[serde(default)]
    pub gases: Vec<GasSpec>,
    pub points: Vec<PointSpec>,
    pub outputs: Vec<String>,
    #[serde(default)]
    pub config: Option<SolverConfig>,
}

/// Computed table: one row per point.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub statuses: Vec<PointStatus>,
}

impl Case {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn mixture(&self) -> CliResult<Mixture> {
        let mut components = vec![self.vapor.component(self.reference)?];
        for spec in &self.gases {
            let gas = match spec {
                GasSpec::Catalog { catalog: name } => catalog::gas(name)?,
                GasSpec::Custom { name, coefficients } => {
                    PerfectGas::new(name.as_str(), coefficients.clone())?
                }
            };
            components.push(Component::gas(gas));
        }
        let mixture = Mixture::new(components)?;
        match &self.config {
            Some(config) => Ok(mixture.with_config(config.clone())?),
            None => Ok(mixture),
        }
    }

    pub fn run(&self, mixture: &Mixture) -> CliResult<CaseReport> {
        let n = self.points.len();
        let nb_fluids = mixture.nb_fluids();
        let second = match self.state {
            StateKind::Ph => (Property::ENTHALPY, UnitKind::SpecificEnthalpy),
            StateKind::Pt => (Property::TEMPERATURE, UnitKind::Temperature),
        };

        let mut pressure = Vec::with_capacity(n);
        let mut state = Vec::with_capacity(n);
        let mut fractions = vec![Vec::with_capacity(n); nb_fluids];
        for (i, point) in self.points.iter().enumerate() {
            pressure.push(parse_quantity(&point.p, UnitKind::Pressure)?);
            let raw = match self.state {
                StateKind::Ph => point.h.as_deref(),
                StateKind::Pt => point.t.as_deref(),
            }
            .ok_or_else(|| CliError::Case(format!("point {i} lacks its {}", second.0)))?;
            state.push(parse_quantity(raw, second.1)?);
            if point.c.len() != nb_fluids {
                return Err(CliError::Case(format!(
                    "point {i} has {} fractions for {nb_fluids} constituents",
                    point.c.len()
                )));
            }
            if !Composition::new(&point.c)?.is_closed(CLOSURE) {
                return Err(CliError::Case(format!(
                    "point {i} fractions sum to {}",
                    point.c.iter().sum::<f64>()
                )));
            }
            for (column, &c) in fractions.iter_mut().zip(&point.c) {
                column.push(c);
            }
        }

        let properties = self
            .outputs
            .iter()
            .map(|name| name.parse::<Property>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut inputs = vec![
            Field::new(Property::PRESSURE, &pressure),
            Field::new(second.0, &state),
        ];
        for (index, column) in fractions.iter().enumerate() {
            inputs.push(Field::new(Property::fraction(index as u8), column));
        }

        let mut buffers = vec![vec![0.0; n]; properties.len()];
        let mut statuses = vec![PointStatus::Good; n];
        {
            let mut outputs: Vec<FieldMut<'_>> = properties
                .iter()
                .zip(buffers.iter_mut())
                .map(|(&property, values)| FieldMut::new(property, values))
                .collect();
            let mut errors = ErrorField::new(&mut statuses);
            let severity = mixture.compute(&inputs, &mut outputs, &mut errors)?;
            info!(
                case = self.name.as_deref().unwrap_or("unnamed"),
                points = n,
                ?severity,
                "case computed"
            );
        }

        let rows = (0..n)
            .map(|i| buffers.iter().map(|column| column[i]).collect())
            .collect();
        Ok(CaseReport {
            columns: properties.iter().map(|p| p.to_string()).collect(),
            rows,
            statuses,
        })
    }
}
