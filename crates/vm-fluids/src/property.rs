//! Property tags for batch fields.
//!
//! A tag names a quantity, optionally the constituent it refers to (`_0` the vapor, `_1..`
//! the incondensables) and optionally the derivative taken. Tags round-trip through their
//! string names:
//!
//! ```
//! use vm_fluids::{Derivative, Property, Quantity};
//!
//! let tag: Property = "d_rho_d_c_1_ph".parse().unwrap();
//! assert_eq!(tag, Property::new(Quantity::Density).d(Derivative::Fraction(1)));
//! assert_eq!(tag.to_string(), "d_rho_d_c_1_ph");
//! ```

use crate::composition::MAX_COMPONENTS;
use crate::error::{FluidError, FluidResult};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Pressure,
    SatPressure,
    LimPressure,
    Temperature,
    SatTemperature,
    Enthalpy,
    Fraction,
    Density,
    Cp,
    Conductivity,
    Viscosity,
    SurfaceTension,
    Diffusivity,
    GasConstant,
    IncondensableGasConstant,
    IncondensableMolarMass,
    IncondensableFraction,
    LiquidSatEnthalpy,
    VaporSatEnthalpy,
    LiquidSatDensity,
    VaporSatDensity,
    LiquidSatCp,
    VaporSatCp,
}

impl Quantity {
    pub const ALL: [Quantity; 23] = [
        Quantity::Pressure,
        Quantity::SatPressure,
        Quantity::LimPressure,
        Quantity::Temperature,
        Quantity::SatTemperature,
        Quantity::Enthalpy,
        Quantity::Fraction,
        Quantity::Density,
        Quantity::Cp,
        Quantity::Conductivity,
        Quantity::Viscosity,
        Quantity::SurfaceTension,
        Quantity::Diffusivity,
        Quantity::GasConstant,
        Quantity::IncondensableGasConstant,
        Quantity::IncondensableMolarMass,
        Quantity::IncondensableFraction,
        Quantity::LiquidSatEnthalpy,
        Quantity::VaporSatEnthalpy,
        Quantity::LiquidSatDensity,
        Quantity::VaporSatDensity,
        Quantity::LiquidSatCp,
        Quantity::VaporSatCp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Quantity::Pressure => "p",
            Quantity::SatPressure => "p_sat",
            Quantity::LimPressure => "p_lim",
            Quantity::Temperature => "T",
            Quantity::SatTemperature => "T_sat",
            Quantity::Enthalpy => "h",
            Quantity::Fraction => "c",
            Quantity::Density => "rho",
            Quantity::Cp => "cp",
            Quantity::Conductivity => "lambda",
            Quantity::Viscosity => "mu",
            Quantity::SurfaceTension => "sigma",
            Quantity::Diffusivity => "dncv",
            Quantity::GasConstant => "prgr",
            Quantity::IncondensableGasConstant => "rnc",
            Quantity::IncondensableMolarMass => "mnc",
            Quantity::IncondensableFraction => "xnc",
            Quantity::LiquidSatEnthalpy => "h_l_sat",
            Quantity::VaporSatEnthalpy => "h_v_sat",
            Quantity::LiquidSatDensity => "rho_l_sat",
            Quantity::VaporSatDensity => "rho_v_sat",
            Quantity::LiquidSatCp => "cp_l_sat",
            Quantity::VaporSatCp => "cp_v_sat",
        }
    }

    /// Quantities of the saturation curve of the condensable species.
    pub fn is_saturation(self) -> bool {
        matches!(
            self,
            Quantity::SatPressure
                | Quantity::SatTemperature
                | Quantity::LiquidSatEnthalpy
                | Quantity::VaporSatEnthalpy
                | Quantity::LiquidSatDensity
                | Quantity::VaporSatDensity
                | Quantity::LiquidSatCp
                | Quantity::VaporSatCp
        )
    }
}

/// Which partial derivative a tag asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Derivative {
    #[default]
    Value,
    /// d/dP at constant h (`_d_p_h`)
    Pressure,
    /// d/dh at constant P (`_d_h_p`)
    Enthalpy,
    /// d/dPv at constant hv (`_d_p_0_h`)
    VaporPressure,
    /// d/dhv at constant Pv (`_d_h_0_p`)
    VaporEnthalpy,
    /// d/dc_i at constant P and h (`_d_c_i_ph`), i in 1..=4
    Fraction(u8),
    /// d/dP along the saturation curve (`_d_p`)
    Saturation,
    /// d2/dP2 along the saturation curve at P
    SaturationSecond,
    /// d2/dPv2 along the saturation curve at Pv
    VaporSaturationSecond,
}

/// Structured property tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Property {
    pub quantity: Quantity,
    pub component: Option<u8>,
    pub derivative: Derivative,
}

impl Property {
    pub const PRESSURE: Property = Property::new(Quantity::Pressure);
    pub const TEMPERATURE: Property = Property::new(Quantity::Temperature);
    pub const ENTHALPY: Property = Property::new(Quantity::Enthalpy);
    pub const DENSITY: Property = Property::new(Quantity::Density);
    pub const SAT_TEMPERATURE: Property = Property::new(Quantity::SatTemperature);
    pub const SAT_PRESSURE: Property = Property::new(Quantity::SatPressure);
    pub const VAPOR_PRESSURE: Property = Property::new(Quantity::Pressure).of(0);
    pub const VAPOR_ENTHALPY: Property = Property::new(Quantity::Enthalpy).of(0);

    pub const fn new(quantity: Quantity) -> Self {
        Self {
            quantity,
            component: None,
            derivative: Derivative::Value,
        }
    }

    /// Same quantity, restricted to one constituent.
    pub const fn of(mut self, component: u8) -> Self {
        self.component = Some(component);
        self
    }

    pub const fn d(mut self, derivative: Derivative) -> Self {
        self.derivative = derivative;
        self
    }

    /// Mass fraction tag `c_i`.
    pub const fn fraction(component: u8) -> Self {
        Property::new(Quantity::Fraction).of(component)
    }

    /// Index of the fraction this tag carries, if it is a plain `c_i`.
    pub fn fraction_index(&self) -> Option<usize> {
        match (self.quantity, self.component, self.derivative) {
            (Quantity::Fraction, Some(i), Derivative::Value) => Some(i as usize),
            _ => None,
        }
    }

    fn base_name(&self) -> String {
        match self.component {
            Some(i) => format!("{}_{}", self.quantity.name(), i),
            None => self.quantity.name().to_string(),
        }
    }
}

impl From<Quantity> for Property {
    fn from(quantity: Quantity) -> Self {
        Property::new(quantity)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.base_name();
        match self.derivative {
            Derivative::Value => write!(f, "{base}"),
            Derivative::Pressure => write!(f, "d_{base}_d_p_h"),
            Derivative::Enthalpy => write!(f, "d_{base}_d_h_p"),
            Derivative::VaporPressure => write!(f, "d_{base}_d_p_0_h"),
            Derivative::VaporEnthalpy => write!(f, "d_{base}_d_h_0_p"),
            Derivative::Fraction(i) => write!(f, "d_{base}_d_c_{i}_ph"),
            Derivative::Saturation => write!(f, "d_{base}_d_p"),
            Derivative::SaturationSecond => write!(f, "d2_{base}_d_p_d_p"),
            Derivative::VaporSaturationSecond => write!(f, "d2_{base}_d_p_0_d_p_0"),
        }
    }
}

impl FromStr for Property {
    type Err = FluidError;

    fn from_str(s: &str) -> FluidResult<Self> {
        let unknown = || FluidError::UnknownProperty {
            name: s.to_string(),
        };
        let (second, rest) = if let Some(rest) = s.strip_prefix("d2_") {
            (true, rest)
        } else if let Some(rest) = s.strip_prefix("d_") {
            (false, rest)
        } else {
            return parse_base(s).ok_or_else(unknown);
        };

        let split = rest.find("_d_").ok_or_else(unknown)?;
        let (base, tail) = (&rest[..split], &rest[split + 3..]);
        let derivative = if second {
            match tail {
                "p_d_p" => Derivative::SaturationSecond,
                "p_0_d_p_0" => Derivative::VaporSaturationSecond,
                _ => return Err(unknown()),
            }
        } else {
            match tail {
                "p_h" => Derivative::Pressure,
                "h_p" => Derivative::Enthalpy,
                "p_0_h" => Derivative::VaporPressure,
                "h_0_p" => Derivative::VaporEnthalpy,
                "p" => Derivative::Saturation,
                _ => {
                    let index = tail
                        .strip_prefix("c_")
                        .and_then(|t| t.strip_suffix("_ph"))
                        .and_then(|t| t.parse::<u8>().ok())
                        .filter(|&i| i >= 1 && (i as usize) < MAX_COMPONENTS)
                        .ok_or_else(unknown)?;
                    Derivative::Fraction(index)
                }
            }
        };
        let property = parse_base(base).ok_or_else(unknown)?;
        Ok(property.d(derivative))
    }
}

fn parse_base(token: &str) -> Option<Property> {
    for quantity in Quantity::ALL {
        let name = quantity.name();
        if token == name {
            // fractions are always per constituent
            return (quantity != Quantity::Fraction).then(|| Property::new(quantity));
        }
        if let Some(index) = token
            .strip_prefix(name)
            .and_then(|t| t.strip_prefix('_'))
            .and_then(|t| t.parse::<u8>().ok())
        {
            if (index as usize) < MAX_COMPONENTS {
                return Some(Property::new(quantity).of(index));
            }
        }
    }
    None
}
