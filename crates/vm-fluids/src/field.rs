//! Borrowed, tagged views over caller-owned point buffers.

use crate::error::FluidResult;
use crate::property::Property;
use crate::status::{PointStatus, Severity};

/// Read-only input field: one property sampled at N points.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    property: Property,
    values: &'a [f64],
}

impl<'a> Field<'a> {
    pub fn new(property: Property, values: &'a [f64]) -> Self {
        Self { property, values }
    }

    /// Build from a property name such as `"p"` or `"c_1"`.
    pub fn named(name: &str, values: &'a [f64]) -> FluidResult<Self> {
        Ok(Self::new(name.parse()?, values))
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Output field written in place.
#[derive(Debug)]
pub struct FieldMut<'a> {
    property: Property,
    values: &'a mut [f64],
}

impl<'a> FieldMut<'a> {
    pub fn new(property: Property, values: &'a mut [f64]) -> Self {
        Self { property, values }
    }

    pub fn named(name: &str, values: &'a mut [f64]) -> FluidResult<Self> {
        Ok(Self::new(name.parse()?, values))
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn values(&self) -> &[f64] {
        self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-point status buffer.
#[derive(Debug)]
pub struct ErrorField<'a> {
    statuses: &'a mut [PointStatus],
}

impl<'a> ErrorField<'a> {
    pub fn new(statuses: &'a mut [PointStatus]) -> Self {
        Self { statuses }
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<PointStatus> {
        self.statuses.get(index).copied()
    }

    pub fn statuses(&self) -> &[PointStatus] {
        self.statuses
    }

    /// Overwrite every point.
    pub fn fill(&mut self, status: PointStatus) {
        self.statuses.fill(status);
    }

    /// Raise point `index` to at least `status`.
    pub fn raise(&mut self, index: usize, status: PointStatus) {
        if let Some(slot) = self.statuses.get_mut(index) {
            *slot = slot.worst(status);
        }
    }

    /// Point-wise worst of `self` and `other`.
    pub fn merge(&mut self, other: &[PointStatus]) {
        for (slot, status) in self.statuses.iter_mut().zip(other) {
            *slot = slot.worst(*status);
        }
    }

    /// Worst status over all points.
    pub fn worst(&self) -> PointStatus {
        self.statuses
            .iter()
            .copied()
            .max()
            .unwrap_or(PointStatus::Good)
    }

    pub fn severity(&self) -> Severity {
        self.worst().severity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_fields() {
        let p = [1e5, 2e5];
        let field = Field::named("p", &p).unwrap();
        assert_eq!(field.property(), Property::PRESSURE);
        assert_eq!(field.len(), 2);
        assert!(Field::named("nope", &p).is_err());
    }

    #[test]
    fn output_written_in_place() {
        let mut rho = [0.0; 3];
        {
            let mut out = FieldMut::named("rho", &mut rho).unwrap();
            out.values_mut()[1] = 0.5;
        }
        assert_eq!(rho, [0.0, 0.5, 0.0]);
    }

    #[test]
    fn error_field_merge_keeps_worst() {
        let mut buf = [PointStatus::Good, PointStatus::NonConvergence, PointStatus::Good];
        let mut errors = ErrorField::new(&mut buf);
        errors.merge(&[
            PointStatus::OutOfRange,
            PointStatus::OutOfRange,
            PointStatus::Good,
        ]);
        errors.raise(2, PointStatus::Good);
        errors.raise(9, PointStatus::InputProperty);
        assert_eq!(
            errors.statuses(),
            &[
                PointStatus::OutOfRange,
                PointStatus::NonConvergence,
                PointStatus::Good
            ]
        );
        assert_eq!(errors.severity(), Severity::Bad);
    }
}
