//! Batch evaluation on the perfect-gas path.

use crate::error::{MixingError, MixingResult};
use crate::inputs::{InputLayout, StatePath};
use crate::point::{MixturePoint, SaturationPoint};
use crate::split::PerfectGasMixing;
use tracing::debug;
use vm_fluids::{ErrorField, FieldMut, Flagged, PointStatus, Property};

/// Outcome at one point: a value with its soft status, or the status of a hard failure.
type PointOutcome<T> = Result<Flagged<T>, PointStatus>;

impl PerfectGasMixing<'_> {
    /// Fill `outputs` from classified inputs.
    ///
    /// Every point is evaluated before anything is written. A split or temperature solver
    /// failure aborts the batch with the failing point marked in `errors`.
    pub(crate) fn compute_batch(
        &self,
        layout: &InputLayout<'_>,
        outputs: &mut [FieldMut<'_>],
        errors: &mut ErrorField<'_>,
    ) -> MixingResult<()> {
        let n = errors.len();
        match layout.path {
            StatePath::SaturationFromPressure | StatePath::SaturationFromTemperature => {
                let template = SaturationPoint::default();
                check_outputs(
                    outputs,
                    |p| template.get(p).is_some(),
                    "on the saturation path",
                )?;
                let points: Vec<_> = (0..n).map(|i| self.saturation_point(layout, i)).collect();
                write_outputs(&points, outputs, errors, |point, p| point.get(p));
            }
            StatePath::PressureEnthalpy | StatePath::PressureTemperature => {
                let template = MixturePoint::template(self.gas_count());
                check_outputs(
                    outputs,
                    |p| template.get(p).is_some(),
                    "for this perfect-gas mixture",
                )?;
                let mut points = Vec::with_capacity(n);
                for i in 0..n {
                    match self.mixture_point(layout, i) {
                        Ok(point) => points.push(Ok(point)),
                        Err(err @ MixingError::NonConvergence { .. }) => {
                            errors.raise(i, PointStatus::NonConvergence);
                            return Err(err.at(i));
                        }
                        Err(err) => {
                            debug!(point = i, error = %err, "point evaluation failed");
                            points.push(Err(err.status()));
                        }
                    }
                }
                write_outputs(&points, outputs, errors, |point, p| point.get(p));
            }
        }
        Ok(())
    }

    fn mixture_point(
        &self,
        layout: &InputLayout<'_>,
        i: usize,
    ) -> MixingResult<Flagged<MixturePoint>> {
        let c = layout.composition(i);
        match (layout.pressure, layout.enthalpy, layout.temperature) {
            (Some(p), Some(h), _) => self.evaluate_point(p[i], h[i], &c),
            (Some(p), None, Some(t)) => {
                let h = self.enthalpy_pt(p[i], t[i], &c)?;
                Ok(self.evaluate_point(p[i], h.value, &c)?.flag(h.status))
            }
            _ => Err(MixingError::input_property("state variables missing")),
        }
    }

    fn saturation_point(
        &self,
        layout: &InputLayout<'_>,
        i: usize,
    ) -> PointOutcome<SaturationPoint> {
        let pressure = match (layout.pressure, layout.temperature) {
            (Some(p), _) => Flagged::good(p[i]),
            (None, Some(t)) => self
                .vapor
                .saturation_pressure(t[i])
                .map_err(|err| err.status())?,
            (None, None) => return Err(PointStatus::InputProperty),
        };
        let sat = self
            .vapor
            .saturation(pressure.value)
            .map_err(|err| err.status())?;
        Ok(Flagged::new(
            SaturationPoint {
                p: pressure.value,
                sat: sat.value,
            },
            pressure.status.worst(sat.status),
        ))
    }
}

fn check_outputs(
    outputs: &[FieldMut<'_>],
    supported: impl Fn(Property) -> bool,
    context: &'static str,
) -> MixingResult<()> {
    match outputs.iter().find(|f| !supported(f.property())) {
        Some(field) => Err(MixingError::UnsupportedOutput {
            property: field.property(),
            context,
        }),
        None => Ok(()),
    }
}

fn write_outputs<T>(
    points: &[PointOutcome<T>],
    outputs: &mut [FieldMut<'_>],
    errors: &mut ErrorField<'_>,
    lookup: impl Fn(&T, Property) -> Option<f64>,
) {
    for (i, outcome) in points.iter().enumerate() {
        let status = match outcome {
            Ok(flagged) => {
                for field in outputs.iter_mut() {
                    // availability depends only on the gas count, already checked on a template
                    let value = lookup(&flagged.value, field.property());
                    debug_assert!(
                        value.is_some(),
                        "{} passed the template check",
                        field.property()
                    );
                    field.values_mut()[i] = value.unwrap_or(f64::NAN);
                }
                flagged.status
            }
            Err(status) => {
                for field in outputs.iter_mut() {
                    field.values_mut()[i] = f64::NAN;
                }
                *status
            }
        };
        errors.raise(i, status);
    }
}
