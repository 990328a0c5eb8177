//! Per-point status codes and their severities.

use std::fmt;

/// Coarse severity classes, totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Good,
    /// A value was produced but lies outside the model's validity bounds.
    Warning,
    /// The point could not be evaluated.
    Bad,
    /// The request itself is malformed or unsupported.
    Error,
}

/// What happened at one point of a batch.
///
/// Declaration order follows severity, so `max` is "worst wins".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PointStatus {
    #[default]
    Good,
    OutOfRange,
    NonPhysical,
    NonConvergence,
    NotImplemented,
    DataNumber,
    InputProperty,
}

impl PointStatus {
    pub fn severity(self) -> Severity {
        match self {
            PointStatus::Good => Severity::Good,
            PointStatus::OutOfRange => Severity::Warning,
            PointStatus::NonPhysical | PointStatus::NonConvergence => Severity::Bad,
            PointStatus::NotImplemented | PointStatus::DataNumber | PointStatus::InputProperty => {
                Severity::Error
            }
        }
    }

    /// Keep the worse of the two.
    #[inline]
    pub fn worst(self, other: PointStatus) -> PointStatus {
        self.max(other)
    }

    pub fn is_good(self) -> bool {
        self == PointStatus::Good
    }
}

impl fmt::Display for PointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PointStatus::Good => "good",
            PointStatus::OutOfRange => "out of range",
            PointStatus::NonPhysical => "non-physical",
            PointStatus::NonConvergence => "non-convergence",
            PointStatus::NotImplemented => "not implemented",
            PointStatus::DataNumber => "field length mismatch",
            PointStatus::InputProperty => "unsupported input set",
        };
        f.write_str(s)
    }
}

/// A value together with the soft status its evaluator raised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flagged<T> {
    pub value: T,
    pub status: PointStatus,
}

impl<T> Flagged<T> {
    pub fn good(value: T) -> Self {
        Self {
            value,
            status: PointStatus::Good,
        }
    }

    pub fn new(value: T, status: PointStatus) -> Self {
        Self { value, status }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flagged<U> {
        Flagged {
            value: f(self.value),
            status: self.status,
        }
    }

    /// Raise the status to at least `status`.
    pub fn flag(mut self, status: PointStatus) -> Self {
        self.status = self.status.worst(status);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order() {
        assert!(Severity::Good < Severity::Warning);
        assert!(Severity::Warning < Severity::Bad);
        assert!(Severity::Bad < Severity::Error);
    }

    #[test]
    fn worst_wins() {
        assert_eq!(
            PointStatus::OutOfRange.worst(PointStatus::Good),
            PointStatus::OutOfRange
        );
        assert_eq!(
            PointStatus::NonConvergence.worst(PointStatus::OutOfRange),
            PointStatus::NonConvergence
        );
    }

    #[test]
    fn flagged_map_keeps_status() {
        let f = Flagged::new(2.0, PointStatus::OutOfRange).map(|v| v * 2.0);
        assert_eq!(f.value, 4.0);
        assert_eq!(f.status, PointStatus::OutOfRange);
        assert_eq!(f.flag(PointStatus::Good).status, PointStatus::OutOfRange);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [PointStatus; 7] = [
        PointStatus::Good,
        PointStatus::OutOfRange,
        PointStatus::NonPhysical,
        PointStatus::NonConvergence,
        PointStatus::NotImplemented,
        PointStatus::DataNumber,
        PointStatus::InputProperty,
    ];

    proptest! {
        #[test]
        fn worst_is_monotone_in_severity(a in 0usize..7, b in 0usize..7) {
            let (a, b) = (ALL[a], ALL[b]);
            let w = a.worst(b);
            prop_assert!(w.severity() >= a.severity());
            prop_assert!(w.severity() >= b.severity());
            prop_assert_eq!(w, b.worst(a));
        }
    }
}
