//! Constituent handles and compute-mode derivation.

use crate::legacy::{LegacyFlavor, LegacyMixing};
use std::fmt;
use std::sync::Arc;
use vm_fluids::{GasTable, IncondensableGas, VaporModel};

/// One constituent of a mixture.
#[derive(Clone)]
pub enum Component {
    /// Condensable species.
    Vapor(Arc<dyn VaporModel>),
    /// Incondensable gas.
    Gas(Arc<dyn IncondensableGas>),
    /// Legacy mixing kernel standing for the condensable species.
    Legacy(Arc<dyn LegacyMixing>),
}

/// Capability tag of a constituent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    CondensableVapor,
    PerfectGas,
    CathareIncondensable,
    LegacyCathare,
    LegacyCathare2,
}

impl Component {
    pub fn vapor(model: impl VaporModel + 'static) -> Self {
        Component::Vapor(Arc::new(model))
    }

    pub fn gas(model: impl IncondensableGas + 'static) -> Self {
        Component::Gas(Arc::new(model))
    }

    pub fn legacy(kernel: impl LegacyMixing + 'static) -> Self {
        Component::Legacy(Arc::new(kernel))
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Vapor(_) => ComponentKind::CondensableVapor,
            Component::Gas(gas) => match gas.table() {
                GasTable::PerfectGas => ComponentKind::PerfectGas,
                GasTable::Cathare => ComponentKind::CathareIncondensable,
            },
            Component::Legacy(kernel) => match kernel.flavor() {
                LegacyFlavor::Cathare => ComponentKind::LegacyCathare,
                LegacyFlavor::Cathare2 => ComponentKind::LegacyCathare2,
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Component::Vapor(model) => model.name(),
            Component::Gas(gas) => gas.name(),
            Component::Legacy(kernel) => kernel.name(),
        }
    }

    /// Vapor model this constituent provides, directly or through its kernel.
    pub fn as_vapor(&self) -> Option<&dyn VaporModel> {
        match self {
            Component::Vapor(model) => Some(model.as_ref()),
            Component::Legacy(kernel) => kernel.vapor(),
            Component::Gas(_) => None,
        }
    }

    pub fn as_gas(&self) -> Option<&dyn IncondensableGas> {
        match self {
            Component::Gas(gas) => Some(gas.as_ref()),
            _ => None,
        }
    }

    pub fn as_legacy(&self) -> Option<&dyn LegacyMixing> {
        match self {
            Component::Legacy(kernel) => Some(kernel.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

/// Algorithm a mixture is evaluated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixingMode {
    Cathare,
    Cathare2,
    PerfectGas,
    Unsupported,
}

impl fmt::Display for MixingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MixingMode::Cathare => "CATHARE mixing",
            MixingMode::Cathare2 => "Cathare2 mixing",
            MixingMode::PerfectGas => "perfect-gas mixing",
            MixingMode::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Derive the compute mode from the constituent kinds.
pub fn select_mode(components: &[Component]) -> MixingMode {
    let Some(first) = components.first() else {
        return MixingMode::Unsupported;
    };
    if first.kind() == ComponentKind::LegacyCathare {
        return MixingMode::Cathare;
    }
    let all_perfect = components[1..]
        .iter()
        .all(|c| c.kind() == ComponentKind::PerfectGas);
    if all_perfect && first.as_vapor().is_some() {
        return MixingMode::PerfectGas;
    }
    if first.kind() == ComponentKind::LegacyCathare2 {
        return MixingMode::Cathare2;
    }
    MixingMode::Unsupported
}
