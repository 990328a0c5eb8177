//! Contract for the legacy mixing kernels (CATHARE and Cathare2 correlation back-ends).
//!
//! The kernels own their numerics; the facade only checks that a call is one they accept
//! and forwards it.

use crate::error::{MixingError, MixingResult};
use vm_fluids::{ErrorField, Field, FieldMut, GasTable, IncondensableGas, Severity, VaporModel};

/// Which legacy back-end a kernel stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyFlavor {
    Cathare,
    Cathare2,
}

/// A legacy mixing kernel sitting in constituent slot 0.
pub trait LegacyMixing: Send + Sync {
    fn name(&self) -> &str;

    fn flavor(&self) -> LegacyFlavor;

    /// Vapor model of the kernel, when it exposes one. A kernel with a vapor model and only
    /// perfect gases next to it is mixed by the perfect-gas composer instead.
    fn vapor(&self) -> Option<&dyn VaporModel> {
        None
    }

    fn compute_mixing(
        &self,
        gases: &[&dyn IncondensableGas],
        inputs: &[Field<'_>],
        outputs: &mut [FieldMut<'_>],
        errors: &mut ErrorField<'_>,
    ) -> MixingResult<Severity>;
}

/// CATHARE kernels take the state plus up to four fractions.
const CATHARE_INPUTS: std::ops::RangeInclusive<usize> = 4..=7;

pub(crate) fn compute_cathare(
    kernel: &dyn LegacyMixing,
    gases: &[&dyn IncondensableGas],
    inputs: &[Field<'_>],
    outputs: &mut [FieldMut<'_>],
    errors: &mut ErrorField<'_>,
) -> MixingResult<Severity> {
    if !CATHARE_INPUTS.contains(&inputs.len()) {
        return Err(MixingError::not_implemented(format!(
            "CATHARE mixing with {} input fields",
            inputs.len()
        )));
    }
    kernel.compute_mixing(gases, inputs, outputs, errors)
}

pub(crate) fn compute_cathare2(
    kernel: &dyn LegacyMixing,
    gases: &[&dyn IncondensableGas],
    inputs: &[Field<'_>],
    outputs: &mut [FieldMut<'_>],
    errors: &mut ErrorField<'_>,
) -> MixingResult<Severity> {
    if let Some(gas) = gases.iter().find(|g| g.table() != GasTable::Cathare) {
        return Err(MixingError::not_implemented(format!(
            "Cathare2 mixing with incondensable '{}'",
            gas.name()
        )));
    }
    kernel.compute_mixing(gases, inputs, outputs, errors)
}
