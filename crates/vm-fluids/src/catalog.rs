//! Built-in incondensable gases.

use crate::error::{FluidError, FluidResult};
use crate::model::GasCoefficients;
use crate::perfect_gas::PerfectGas;

/// Catalog entry with display metadata.
#[derive(Clone, Debug)]
pub struct GasCatalogEntry {
    pub key: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
    coefficients: fn() -> GasCoefficients,
}

impl GasCatalogEntry {
    pub fn coefficients(&self) -> GasCoefficients {
        (self.coefficients)()
    }

    fn matches(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

fn nitrogen() -> GasCoefficients {
    GasCoefficients {
        r: 297.2,
        cp: 1056.0,
        molar_mass: 28.0,
        conductivity: [5.045_263_15e-3, 0.072_220_601_5e-3, -14.246_616_54e-9],
        viscosity: [4.870_512_42e-6, 0.044_382_518_8e-6, -9.058_270_677e-12],
        diffusion_volume: 18.5,
    }
}

fn hydrogen() -> GasCoefficients {
    GasCoefficients {
        r: 4130.0,
        cp: 14500.0,
        molar_mass: 2.0,
        conductivity: [52.278_947_41e-3, 0.429_259_022_5e-3, -52.699_248_12e-9],
        viscosity: [3.2663e-6, 0.019_116_699_6e-6, -2.375_345_865e-12],
        diffusion_volume: 6.12,
    }
}

fn helium() -> GasCoefficients {
    GasCoefficients {
        r: 2077.2,
        cp: 5193.0,
        molar_mass: 4.003,
        conductivity: [2.7e-2, 4.4e-4, 0.0],
        viscosity: [4.0e-6, 5.44e-8, 0.0],
        diffusion_volume: 2.67,
    }
}

fn oxygen() -> GasCoefficients {
    GasCoefficients {
        r: 259.8,
        cp: 918.0,
        molar_mass: 31.9988,
        conductivity: [1.01e-3, 9.11e-5, -2.09e-8],
        viscosity: [3.81e-6, 6.19e-8, -1.15e-11],
        diffusion_volume: 16.3,
    }
}

fn argon() -> GasCoefficients {
    GasCoefficients {
        r: 208.1,
        cp: 519.65,
        molar_mass: 40.0,
        conductivity: [7.418_38e-3, 4.199_35e-5, -7.616_21e-9],
        viscosity: [5.457_41e-6, 6.288_65e-8, -1.504_96e-11],
        diffusion_volume: 16.2,
    }
}

fn air() -> GasCoefficients {
    GasCoefficients {
        r: 287.06,
        cp: 1005.0,
        molar_mass: 28.96,
        conductivity: [3.0e-3, 7.6e-5, -1.4e-8],
        viscosity: [4.6e-6, 5.2e-8, -1.1e-11],
        diffusion_volume: 19.7,
    }
}

static CATALOG: &[GasCatalogEntry] = &[
    GasCatalogEntry {
        key: "nitrogen",
        display_name: "Nitrogen",
        aliases: &["N2"],
        coefficients: nitrogen,
    },
    GasCatalogEntry {
        key: "hydrogen",
        display_name: "Hydrogen",
        aliases: &["H2"],
        coefficients: hydrogen,
    },
    GasCatalogEntry {
        key: "helium",
        display_name: "Helium",
        aliases: &["He"],
        coefficients: helium,
    },
    GasCatalogEntry {
        key: "oxygen",
        display_name: "Oxygen",
        aliases: &["O2"],
        coefficients: oxygen,
    },
    GasCatalogEntry {
        key: "argon",
        display_name: "Argon",
        aliases: &["Ar"],
        coefficients: argon,
    },
    GasCatalogEntry {
        key: "air",
        display_name: "Air",
        aliases: &[],
        coefficients: air,
    },
];

/// All catalog entries.
pub fn entries() -> &'static [GasCatalogEntry] {
    CATALOG
}

/// Catalog keys.
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|e| e.key)
}

/// Look up an entry by key or alias (case-insensitive).
pub fn find(name: &str) -> Option<&'static GasCatalogEntry> {
    CATALOG.iter().find(|e| e.matches(name))
}

/// Build the perfect gas registered under `name`.
pub fn gas(name: &str) -> FluidResult<PerfectGas> {
    let entry = find(name).ok_or_else(|| FluidError::UnknownGas {
        name: name.to_string(),
    })?;
    PerfectGas::new(entry.key, entry.coefficients())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IncondensableGas;

    #[test]
    fn every_entry_builds() {
        for name in names() {
            let gas = gas(name).unwrap();
            assert_eq!(gas.name(), name);
        }
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(find("n2").unwrap().key, "nitrogen");
        assert_eq!(find("AIR").unwrap().display_name, "Air");
        assert!(matches!(gas("xenon"), Err(FluidError::UnknownGas { .. })));
    }

    #[test]
    fn gas_constants_consistent_with_molar_mass() {
        // r·M ≈ 8314 J/(kmol·K)
        for entry in entries() {
            let c = entry.coefficients();
            let rm = c.r * c.molar_mass;
            assert!(rm > 8000.0 && rm < 8600.0, "{}: r·M = {rm}", entry.key);
        }
    }

    #[test]
    fn transport_properties_plausible_at_room_temperature() {
        for name in names() {
            let g = gas(name).unwrap();
            let mu = g.mu_pt(1e5, 300.0).unwrap();
            let lambda = g.lambda_pt(1e5, 300.0).unwrap();
            assert!(mu > 5e-6 && mu < 3e-5, "{name}: mu = {mu}");
            assert!(lambda > 0.01 && lambda < 0.3, "{name}: lambda = {lambda}");
        }
    }
}
