//! Solver settings: iteration caps, tolerances and closure constants.
//!
//! Loaded from YAML or patched with `section.key=value` option strings:
//!
//! ```
//! use vm_mixing::SolverConfig;
//!
//! let mut config = SolverConfig::from_yaml_str("split:\n  max_iterations: 80\n").unwrap();
//! config.apply_option("temperature.tolerance=1e-3").unwrap();
//! assert_eq!(config.split.max_iterations, 80);
//! assert_eq!(config.temperature.tolerance, 1e-3);
//! ```

use crate::error::{MixingError, MixingResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub split: SplitConfig,
    pub temperature: TemperatureConfig,
    pub diffusion: DiffusionConfig,
}

/// (Pv, hv) Newton iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    pub max_iterations: usize,
    /// Pressure step tolerance before scaling by the smallest fraction [Pa]
    pub pressure_tolerance: f64,
    /// Lower bound of the scaled pressure tolerance [Pa]
    pub pressure_tolerance_floor: f64,
    /// Enthalpy step tolerance [J/kg]
    pub enthalpy_tolerance: f64,
    /// Absolute floor of the vapor partial pressure [Pa]
    pub min_vapor_pressure: f64,
    /// Floor of the vapor partial pressure per unit vapor fraction [Pa]
    pub vapor_pressure_floor: f64,
    /// cp of the linearized saturation estimate [J/(kg·K)]
    pub linear_cp: f64,
    /// Pressure slope of that cp [J/(kg·K·Pa)]
    pub linear_cp_slope: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            pressure_tolerance: 1e3,
            pressure_tolerance_floor: 5.0,
            enthalpy_tolerance: 1.0,
            min_vapor_pressure: 1e-10,
            vapor_pressure_floor: 1e-2,
            linear_cp: 2e3,
            linear_cp_slope: 1e-4,
        }
    }
}

/// Outer enthalpy search for (P, T) input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemperatureConfig {
    pub max_iterations: usize,
    /// Temperature tolerance [K]
    pub tolerance: f64,
    /// Vapor cp of the initial estimate [J/(kg·K)]
    pub sensible_cp: f64,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-2,
            sensible_cp: 2e3,
        }
    }
}

/// Fuller binary diffusion closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffusionConfig {
    pub fuller_coefficient: f64,
    /// Diffusion volume of the condensable species
    pub vapor_diffusion_volume: f64,
    pub temperature_exponent: f64,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            fuller_coefficient: 0.0143,
            vapor_diffusion_volume: 13.1,
            temperature_exponent: 1.75,
        }
    }
}

impl SolverConfig {
    pub fn from_yaml_str(text: &str) -> MixingResult<Self> {
        let config: SolverConfig =
            serde_yaml::from_str(text).map_err(|e| MixingError::Config {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply one `section.key=value` option; the config is unchanged on error.
    pub fn apply_option(&mut self, option: &str) -> MixingResult<()> {
        let (key, value) = option.split_once('=').ok_or_else(|| MixingError::Config {
            message: format!("expected key=value, got '{option}'"),
        })?;
        let (key, value) = (key.trim(), value.trim());

        let mut next = self.clone();
        match key {
            "split.max_iterations" => next.split.max_iterations = parse_count(key, value)?,
            "split.pressure_tolerance" => next.split.pressure_tolerance = parse_real(key, value)?,
            "split.pressure_tolerance_floor" => {
                next.split.pressure_tolerance_floor = parse_real(key, value)?
            }
            "split.enthalpy_tolerance" => next.split.enthalpy_tolerance = parse_real(key, value)?,
            "split.min_vapor_pressure" => next.split.min_vapor_pressure = parse_real(key, value)?,
            "split.vapor_pressure_floor" => {
                next.split.vapor_pressure_floor = parse_real(key, value)?
            }
            "split.linear_cp" => next.split.linear_cp = parse_real(key, value)?,
            "split.linear_cp_slope" => next.split.linear_cp_slope = parse_real(key, value)?,
            "temperature.max_iterations" => {
                next.temperature.max_iterations = parse_count(key, value)?
            }
            "temperature.tolerance" => next.temperature.tolerance = parse_real(key, value)?,
            "temperature.sensible_cp" => next.temperature.sensible_cp = parse_real(key, value)?,
            "diffusion.fuller_coefficient" => {
                next.diffusion.fuller_coefficient = parse_real(key, value)?
            }
            "diffusion.vapor_diffusion_volume" => {
                next.diffusion.vapor_diffusion_volume = parse_real(key, value)?
            }
            "diffusion.temperature_exponent" => {
                next.diffusion.temperature_exponent = parse_real(key, value)?
            }
            _ => {
                return Err(MixingError::Config {
                    message: format!("unknown option '{key}'"),
                });
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn apply_options<S: AsRef<str>>(&mut self, options: &[S]) -> MixingResult<()> {
        for option in options {
            self.apply_option(option.as_ref())?;
        }
        Ok(())
    }

    /// Iteration caps at least one, tolerances and closure constants positive.
    pub fn validate(&self) -> MixingResult<()> {
        let positive = [
            ("split.pressure_tolerance", self.split.pressure_tolerance),
            ("split.pressure_tolerance_floor", self.split.pressure_tolerance_floor),
            ("split.enthalpy_tolerance", self.split.enthalpy_tolerance),
            ("split.min_vapor_pressure", self.split.min_vapor_pressure),
            ("split.linear_cp", self.split.linear_cp),
            ("temperature.tolerance", self.temperature.tolerance),
            ("temperature.sensible_cp", self.temperature.sensible_cp),
            ("diffusion.fuller_coefficient", self.diffusion.fuller_coefficient),
            ("diffusion.vapor_diffusion_volume", self.diffusion.vapor_diffusion_volume),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(MixingError::Config {
                    message: format!("{key} must be positive, got {value}"),
                });
            }
        }
        if self.split.max_iterations == 0 || self.temperature.max_iterations == 0 {
            return Err(MixingError::Config {
                message: "iteration caps must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_real(key: &str, value: &str) -> MixingResult<f64> {
    value.parse().map_err(|_| MixingError::Config {
        message: format!("{key}: '{value}' is not a number"),
    })
}

fn parse_count(key: &str, value: &str) -> MixingResult<usize> {
    value.parse().map_err(|_| MixingError::Config {
        message: format!("{key}: '{value}' is not an iteration count"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_solver_constants() {
        let config = SolverConfig::default();
        assert_eq!(config.split.max_iterations, 50);
        assert_eq!(config.split.pressure_tolerance, 1e3);
        assert_eq!(config.temperature.tolerance, 1e-2);
        assert_eq!(config.diffusion.vapor_diffusion_volume, 13.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_sections_are_optional() {
        let config = SolverConfig::from_yaml_str("diffusion:\n  fuller_coefficient: 0.02\n").unwrap();
        assert_eq!(config.diffusion.fuller_coefficient, 0.02);
        assert_eq!(config.split, SplitConfig::default());
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        let err = SolverConfig::from_yaml_str("split:\n  max_iter: 3\n").unwrap_err();
        assert!(matches!(err, MixingError::Config { .. }));
    }

    #[test]
    fn options_patch_and_validate() {
        let mut config = SolverConfig::default();
        config
            .apply_options(&["split.max_iterations = 12", "split.enthalpy_tolerance=0.5"])
            .unwrap();
        assert_eq!(config.split.max_iterations, 12);
        assert_eq!(config.split.enthalpy_tolerance, 0.5);

        assert!(config.apply_option("split.max_iterations=0").is_err());
        assert!(config.apply_option("split.max_iterations").is_err());
        assert!(config.apply_option("bogus.key=1").is_err());
        assert!(config.apply_option("temperature.tolerance=abc").is_err());
    }
}
