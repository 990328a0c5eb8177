#![allow(dead_code)]

use vm_fluids::{CoolPropSteam, IdealSteam, IncondensableGas as _, catalog};
use vm_mixing::{Component, Mixture};

/// Steam with air.
pub fn steam_air() -> Mixture {
    Mixture::new(vec![
        Component::vapor(IdealSteam::new()),
        Component::gas(catalog::gas("air").unwrap()),
    ])
    .unwrap()
}

/// Steam with nitrogen and helium.
pub fn steam_n2_he() -> Mixture {
    Mixture::new(vec![
        Component::vapor(IdealSteam::new()),
        Component::gas(catalog::gas("nitrogen").unwrap()),
        Component::gas(catalog::gas("helium").unwrap()),
    ])
    .unwrap()
}

/// Enthalpy of a steam/air mixture at temperature `t`, air anchored at 0 K.
pub fn steam_air_enthalpy(c0: f64, t: f64) -> f64 {
    let air = catalog::gas("air").unwrap();
    c0 * IdealSteam::enthalpy(t) + (1.0 - c0) * air.coefficients().cp * t
}

pub fn rel_diff(a: f64, b: f64) -> f64 {
    (a - b).abs() / b.abs().max(1e-30)
}

/// Steam from CoolProp with air.
pub fn coolprop_steam_air() -> Mixture {
    Mixture::new(vec![
        Component::vapor(CoolPropSteam::new().unwrap()),
        Component::gas(catalog::gas("air").unwrap()),
    ])
    .unwrap()
}
