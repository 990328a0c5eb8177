//! Unit-aware parsing of scalar inputs ("1 bar", "2600 kJ/kg", "120 C", "5%").
//!
//! Everything is converted to SI base units.

use std::fmt;
use thiserror::Error;

/// Dimension family of a scalar input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Temperature (canonical: Kelvin)
    Temperature,
    /// Absolute pressure (canonical: Pa)
    Pressure,
    /// Specific enthalpy (canonical: J/kg)
    SpecificEnthalpy,
    /// Mass fraction (canonical: 0-1)
    Fraction,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "Temperature"),
            Self::Pressure => write!(f, "Absolute Pressure"),
            Self::SpecificEnthalpy => write!(f, "Specific Enthalpy"),
            Self::Fraction => write!(f, "Mass Fraction"),
        }
    }
}

/// Error in unit parsing or conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown unit '{unit}' for {kind}")]
    UnknownUnit { unit: String, kind: UnitKind },

    #[error("Ambiguous unit '{unit}': {reason}")]
    AmbiguousUnit { unit: String, reason: &'static str },

    #[error("Value {value} out of range: {reason}")]
    OutOfRange { value: f64, reason: &'static str },
}

/// Parse `raw_text` as a `kind` value and return it in SI units.
pub fn parse_quantity(raw_text: &str, kind: UnitKind) -> Result<f64, UnitError> {
    let trimmed = raw_text.trim();
    match kind {
        UnitKind::Temperature => parse_temperature(trimmed),
        UnitKind::Pressure => parse_pressure(trimmed),
        UnitKind::SpecificEnthalpy => parse_specific_enthalpy(trimmed),
        UnitKind::Fraction => parse_fraction(trimmed),
    }
}

fn parse_temperature(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let kelvin = match unit.to_lowercase().as_str() {
        "" | "k" | "kelvin" => value,
        "c" | "°c" | "celsius" => value + 273.15,
        "f" | "°f" | "fahrenheit" => (value + 459.67) * 5.0 / 9.0,
        _ => {
            return Err(UnitError::UnknownUnit {
                unit,
                kind: UnitKind::Temperature,
            });
        }
    };

    if kelvin <= 0.0 {
        return Err(UnitError::OutOfRange {
            value: kelvin,
            reason: "absolute temperature must be > 0 K",
        });
    }
    Ok(kelvin)
}

fn parse_pressure(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let pa = match unit.to_lowercase().as_str() {
        "" | "pa" => value,
        "kpa" => value * 1e3,
        "mpa" => value * 1e6,
        "bar" => value * 1e5,
        "mbar" => value * 100.0,
        "atm" => value * 101_325.0,
        "psia" => value * 6_894.76,
        "psi" => {
            return Err(UnitError::AmbiguousUnit {
                unit,
                reason: "use 'psia' (absolute pressure)",
            });
        }
        _ => {
            return Err(UnitError::UnknownUnit {
                unit,
                kind: UnitKind::Pressure,
            });
        }
    };

    if pa < 0.0 {
        return Err(UnitError::OutOfRange {
            value: pa,
            reason: "absolute pressure cannot be negative",
        });
    }
    Ok(pa)
}

fn parse_specific_enthalpy(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    match unit.to_lowercase().as_str() {
        "" | "j/kg" => Ok(value),
        "kj/kg" => Ok(value * 1e3),
        "mj/kg" => Ok(value * 1e6),
        "btu/lbm" => Ok(value * 2_326.0),
        _ => Err(UnitError::UnknownUnit {
            unit,
            kind: UnitKind::SpecificEnthalpy,
        }),
    }
}

fn parse_fraction(input: &str) -> Result<f64, UnitError> {
    let (text, scale) = match input.strip_suffix('%') {
        Some(num) => (num.trim(), 0.01),
        None => (input, 1.0),
    };
    let value = text
        .parse::<f64>()
        .map_err(|_| UnitError::ParseError(format!("Could not parse fraction from '{input}'")))?
        * scale;

    if !(0.0..=1.0).contains(&value) {
        return Err(UnitError::OutOfRange {
            value,
            reason: "mass fraction must be between 0 and 1",
        });
    }
    Ok(value)
}

/// Split "14.7 psia" into (14.7, "psia").
fn split_value_and_unit(input: &str) -> Result<(f64, String), UnitError> {
    let split_idx = input
        .find(|c: char| !c.is_ascii_digit() && !matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .unwrap_or(input.len());

    let (num_part, unit_part) = input.split_at(split_idx);
    let value: f64 = num_part.trim().parse().map_err(|_| {
        UnitError::ParseError(format!("Could not parse numeric value from '{input}'"))
    })?;

    Ok((value, unit_part.trim().to_string()))
}
