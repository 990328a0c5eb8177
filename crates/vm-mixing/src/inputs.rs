//! Input field classification for the perfect-gas batch path.

use crate::error::{MixingError, MixingResult};
use vm_fluids::{
    Composition, Derivative, Field, FieldMut, MAX_COMPONENTS, Property, Quantity,
};

/// Which state variables the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatePath {
    /// Saturation pass-through from pressure.
    SaturationFromPressure,
    /// Saturation pass-through from temperature.
    SaturationFromTemperature,
    PressureEnthalpy,
    PressureTemperature,
}

/// Inputs sorted by role.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InputLayout<'a> {
    pub pressure: Option<&'a [f64]>,
    pub temperature: Option<&'a [f64]>,
    pub enthalpy: Option<&'a [f64]>,
    fractions: [Option<&'a [f64]>; MAX_COMPONENTS],
    fraction_count: usize,
    nb_fluids: usize,
    pub path: StatePath,
}

fn is_plain(property: Property) -> bool {
    property.component.is_none() && property.derivative == Derivative::Value
}

fn assign<'a>(
    slot: &mut Option<&'a [f64]>,
    field: &Field<'a>,
    role: &str,
) -> MixingResult<()> {
    if slot.is_some() {
        return Err(MixingError::input_property(format!(
            "more than one {role} input ('{}')",
            field.property()
        )));
    }
    *slot = Some(field.values());
    Ok(())
}

impl<'a> InputLayout<'a> {
    /// Sort inputs into P, T, h and fractions and check the combination.
    ///
    /// Tags that are none of these are ignored.
    pub fn classify(inputs: &[Field<'a>], nb_fluids: usize) -> MixingResult<Self> {
        let mut pressure = None;
        let mut temperature = None;
        let mut enthalpy = None;
        let mut fractions = [None; MAX_COMPONENTS];
        let mut fraction_count = 0;

        for field in inputs {
            let property = field.property();
            if let Some(index) = property.fraction_index() {
                if index >= nb_fluids {
                    return Err(MixingError::input_property(format!(
                        "fraction '{property}' for a mixture of {nb_fluids} constituents"
                    )));
                }
                if fractions[index].is_some() {
                    return Err(MixingError::input_property(format!(
                        "fraction '{property}' given twice"
                    )));
                }
                fractions[index] = Some(field.values());
                fraction_count += 1;
                continue;
            }
            if !is_plain(property) {
                continue;
            }
            match property.quantity {
                Quantity::Pressure | Quantity::SatPressure | Quantity::LimPressure => {
                    assign(&mut pressure, field, "pressure")?
                }
                Quantity::Temperature | Quantity::SatTemperature => {
                    assign(&mut temperature, field, "temperature")?
                }
                Quantity::Enthalpy => assign(&mut enthalpy, field, "enthalpy")?,
                _ => {}
            }
        }

        let idim = [pressure.is_some(), temperature.is_some(), enthalpy.is_some()]
            .iter()
            .filter(|&&given| given)
            .count();
        if temperature.is_some() && enthalpy.is_some() {
            return Err(MixingError::input_property("temperature and enthalpy together"));
        }
        let path = match (idim, pressure.is_some(), temperature.is_some()) {
            (1, true, _) => StatePath::SaturationFromPressure,
            (1, false, true) => StatePath::SaturationFromTemperature,
            (1, false, false) => {
                return Err(MixingError::input_property(
                    "a single state variable must be pressure or temperature",
                ));
            }
            (2, true, true) => StatePath::PressureTemperature,
            (2, true, false) => StatePath::PressureEnthalpy,
            _ => {
                return Err(MixingError::input_property(format!(
                    "{idim} state variables (expected 1 or 2)"
                )));
            }
        };

        if fraction_count != nb_fluids || !(1..=MAX_COMPONENTS).contains(&fraction_count) {
            return Err(MixingError::input_property(format!(
                "{fraction_count} mass fractions for {nb_fluids} constituents"
            )));
        }

        Ok(Self {
            pressure,
            temperature,
            enthalpy,
            fractions,
            fraction_count,
            nb_fluids,
            path,
        })
    }

    /// Composition at point `i`; absent slots are zero.
    pub fn composition(&self, i: usize) -> Composition {
        let mut slots = [0.0; MAX_COMPONENTS];
        for (slot, field) in slots.iter_mut().zip(&self.fractions) {
            if let Some(values) = field {
                *slot = values[i];
            }
        }
        Composition::from_fractions(slots, self.nb_fluids)
    }
}

/// Every input and output field must have one value per error-field entry.
pub(crate) fn check_lengths(
    inputs: &[Field<'_>],
    outputs: &[FieldMut<'_>],
    expected: usize,
) -> MixingResult<()> {
    let lengths = inputs
        .iter()
        .map(|f| (f.property(), f.len()))
        .chain(outputs.iter().map(|f| (f.property(), f.len())));
    for (property, len) in lengths {
        if len != expected {
            return Err(MixingError::DataNumber {
                what: property.to_string(),
                len,
                expected,
            });
        }
    }
    Ok(())
}
