//! Mode selection, configuration and legacy forwarding.

mod common;

use common::steam_air;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vm_fluids::{
    ErrorField, Field, FieldMut, GasTable, IdealSteam, IncondensableGas, PointStatus, Property,
    ReferenceState, Severity, VaporModel, catalog,
};
use vm_mixing::{
    Component, LegacyFlavor, LegacyMixing, MixingError, MixingMode, MixingResult, Mixture,
    SolverConfig,
};

struct RecordingKernel {
    flavor: LegacyFlavor,
    vapor: Option<IdealSteam>,
    calls: Arc<AtomicUsize>,
}

impl RecordingKernel {
    fn new(flavor: LegacyFlavor) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let kernel = Self {
            flavor,
            vapor: None,
            calls: Arc::clone(&calls),
        };
        (kernel, calls)
    }
}

impl LegacyMixing for RecordingKernel {
    fn name(&self) -> &str {
        "recording kernel"
    }

    fn flavor(&self) -> LegacyFlavor {
        self.flavor
    }

    fn vapor(&self) -> Option<&dyn VaporModel> {
        self.vapor.as_ref().map(|v| v as &dyn VaporModel)
    }

    fn compute_mixing(
        &self,
        _gases: &[&dyn IncondensableGas],
        _inputs: &[Field<'_>],
        outputs: &mut [FieldMut<'_>],
        _errors: &mut ErrorField<'_>,
    ) -> MixingResult<Severity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for field in outputs.iter_mut() {
            field.values_mut().fill(1.0);
        }
        Ok(Severity::Good)
    }
}

fn cathare_gas(name: &str) -> Component {
    Component::gas(catalog::gas(name).unwrap().with_table(GasTable::Cathare))
}

const X: [f64; 2] = [1.0, 2.0];

#[test]
fn cathare_mode_forwards_four_to_seven_inputs() {
    let (kernel, calls) = RecordingKernel::new(LegacyFlavor::Cathare);
    let mixture = Mixture::new(vec![Component::legacy(kernel), cathare_gas("nitrogen")]).unwrap();
    assert_eq!(mixture.mode(), MixingMode::Cathare);

    let mut out = [0.0; 2];
    let mut statuses = [PointStatus::Good; 2];

    let three = [
        Field::new(Property::PRESSURE, &X),
        Field::new(Property::ENTHALPY, &X),
        Field::new(Property::fraction(0), &X),
    ];
    let mut outputs = [FieldMut::new(Property::DENSITY, &mut out)];
    let mut errors = ErrorField::new(&mut statuses);
    let err = mixture.compute(&three, &mut outputs, &mut errors).unwrap_err();
    assert!(matches!(err, MixingError::NotImplemented { .. }));
    assert_eq!(errors.worst(), PointStatus::NotImplemented);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let four = [
        Field::new(Property::PRESSURE, &X),
        Field::new(Property::ENTHALPY, &X),
        Field::new(Property::fraction(0), &X),
        Field::new(Property::fraction(1), &X),
    ];
    let severity = mixture.compute(&four, &mut outputs, &mut errors).unwrap();
    assert_eq!(severity, Severity::Good);
    assert_eq!(errors.worst(), PointStatus::Good);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    drop(outputs);
    assert_eq!(out, [1.0, 1.0]);
}

#[test]
fn cathare2_mode_requires_cathare_gases() {
    let (kernel, calls) = RecordingKernel::new(LegacyFlavor::Cathare2);
    let mut mixture = Mixture::new(vec![
        Component::legacy(kernel),
        Component::gas(catalog::gas("nitrogen").unwrap()),
        cathare_gas("hydrogen"),
    ])
    .unwrap();
    assert_eq!(mixture.mode(), MixingMode::Cathare2);

    let inputs = [
        Field::new(Property::PRESSURE, &X),
        Field::new(Property::ENTHALPY, &X),
    ];
    let mut out = [0.0; 2];
    let mut statuses = [PointStatus::Good; 2];
    let mut outputs = [FieldMut::new(Property::DENSITY, &mut out)];
    let mut errors = ErrorField::new(&mut statuses);
    let err = mixture.compute(&inputs, &mut outputs, &mut errors).unwrap_err();
    assert!(matches!(err, MixingError::NotImplemented { .. }));

    mixture.set_component(1, cathare_gas("nitrogen")).unwrap();
    assert_eq!(mixture.mode(), MixingMode::Cathare2);
    mixture.compute(&inputs, &mut outputs, &mut errors).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn kernel_with_vapor_and_perfect_gases_uses_perfect_gas_mixing() {
    let (mut kernel, calls) = RecordingKernel::new(LegacyFlavor::Cathare2);
    kernel.vapor = Some(IdealSteam::new());
    let mixture = Mixture::new(vec![
        Component::legacy(kernel),
        Component::gas(catalog::gas("air").unwrap()),
    ])
    .unwrap();
    assert_eq!(mixture.mode(), MixingMode::PerfectGas);

    let c = vm_fluids::Composition::new(&[0.9, 0.1]).unwrap();
    assert!(mixture.split_ph(1e5, 2.7e6, &c).is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn mode_follows_component_changes() {
    let mut mixture = steam_air();
    assert_eq!(mixture.mode(), MixingMode::PerfectGas);

    mixture.set_component(1, cathare_gas("argon")).unwrap();
    assert_eq!(mixture.mode(), MixingMode::Unsupported);

    let p = [1e5];
    let mut statuses = [PointStatus::Good];
    let mut errors = ErrorField::new(&mut statuses);
    let err = mixture
        .compute(&[Field::new(Property::PRESSURE, &p)], &mut [], &mut errors)
        .unwrap_err();
    assert!(matches!(err, MixingError::NotImplemented { .. }));

    mixture
        .set_component(1, Component::gas(catalog::gas("argon").unwrap()))
        .unwrap();
    assert_eq!(mixture.mode(), MixingMode::PerfectGas);

    assert!(matches!(
        mixture.set_component(5, Component::gas(catalog::gas("argon").unwrap())),
        Err(MixingError::Core(_))
    ));
}

#[test]
fn gases_follow_the_vapor_reference_state() {
    let reference = ReferenceState {
        t_ref: 273.15,
        h_ref: 0.0,
    };
    let mixture = Mixture::new(vec![
        Component::vapor(IdealSteam::new().with_reference(reference)),
        Component::gas(catalog::gas("air").unwrap()),
    ])
    .unwrap();
    let air = mixture.gases().next().unwrap();
    assert!(air.h_pt(1e5, 273.15).unwrap().abs() < 1e-9);

    let plain = steam_air();
    let air = plain.gases().next().unwrap();
    assert!(air.h_pt(1e5, 273.15).unwrap() > 2e5);
}

#[test]
fn alpha_bookkeeping() {
    let mut mixture = steam_air();
    assert_eq!(mixture.alphas(), &[1.0, 0.0]);

    mixture.set_alphas(&[0.3, 0.7]).unwrap();
    assert_eq!(mixture.alpha(1).unwrap(), 0.7);
    mixture.set_alpha(0, 0.4).unwrap();
    assert_eq!(mixture.alphas(), &[0.4, 0.7]);

    assert!(matches!(
        mixture.set_alphas(&[1.0]),
        Err(MixingError::DataNumber { len: 1, expected: 2, .. })
    ));
    assert!(mixture.alpha(2).is_err());
    assert!(mixture.set_alpha(2, 0.1).is_err());
}

#[test]
fn options_and_config() {
    let mut mixture = steam_air();
    mixture
        .init(&["split.max_iterations=2", "temperature.tolerance=0.5"])
        .unwrap();
    assert_eq!(mixture.config().split.max_iterations, 2);
    assert!(mixture.init(&["split.nope=1"]).is_err());
    assert_eq!(mixture.config().split.max_iterations, 2);

    let mut config = SolverConfig::default();
    config.split.max_iterations = 0;
    assert!(steam_air().with_config(config).is_err());
}

#[test]
fn constituent_count_is_bounded() {
    assert!(Mixture::new(Vec::new()).is_err());
    let too_many = (0..6)
        .map(|_| Component::gas(catalog::gas("air").unwrap()))
        .collect();
    assert!(Mixture::new(too_many).is_err());
}

#[test]
fn description_lists_constituents() {
    let text = steam_air().to_string();
    assert!(text.contains("perfect-gas"), "{text}");
    assert!(text.contains("ideal steam"), "{text}");
    assert!(text.contains("air") || text.contains("Air"), "{text}");
}

#[test]
fn typed_scalar_state() {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    use uom::si::thermodynamic_temperature::kelvin;

    let mixture = steam_air();
    let c = vm_fluids::Composition::new(&[0.95, 0.05]).unwrap();
    let state = mixture.state_ph(vm_core::pa(1e5), 2.6e6, &c).unwrap();
    let t = state.temperature.get::<kelvin>();
    let rho = state.density.get::<kilogram_per_cubic_meter>();
    assert!((t - 393.0).abs() < 3.0);
    assert!(rho > 0.5 && rho < 0.6);
    assert_eq!(state.status, PointStatus::Good);
}
