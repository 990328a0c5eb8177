//! Batch evaluation through `Mixture::compute`.

mod common;

use common::{rel_diff, steam_air, steam_n2_he};
use vm_fluids::{
    Composition, ErrorField, Field, FieldMut, IdealSteam, PointStatus, Property, Severity,
    VaporModel,
};
use vm_mixing::{MixingError, MixturePoint};

const P: [f64; 3] = [1e5, 5e5, 2e6];
const H: [f64; 3] = [2.6e6, 2.9e6, 3.1e6];
const C0: [f64; 3] = [0.95, 0.8, 0.9];
const C1: [f64; 3] = [0.05, 0.2, 0.1];

fn inputs() -> Vec<Field<'static>> {
    vec![
        Field::new(Property::PRESSURE, &P),
        Field::new(Property::ENTHALPY, &H),
        Field::new(Property::fraction(0), &C0),
        Field::new(Property::fraction(1), &C1),
    ]
}

#[test]
fn batch_matches_scalar_evaluation() {
    let mixture = steam_air();
    let (mut rho, mut t, mut pv, mut mu) = ([0.0; 3], [0.0; 3], [0.0; 3], [0.0; 3]);
    let mut statuses = [PointStatus::Good; 3];
    {
        let mut outputs = [
            FieldMut::named("rho", &mut rho).unwrap(),
            FieldMut::named("T", &mut t).unwrap(),
            FieldMut::named("p_0", &mut pv).unwrap(),
            FieldMut::named("mu", &mut mu).unwrap(),
        ];
        let mut errors = ErrorField::new(&mut statuses);
        let severity = mixture
            .compute(&inputs(), &mut outputs, &mut errors)
            .unwrap();
        assert_eq!(severity, Severity::Good);
    }

    for i in 0..3 {
        let c = Composition::new(&[C0[i], C1[i]]).unwrap();
        let point = mixture.evaluate_ph(P[i], H[i], &c).unwrap().value;
        assert_eq!(rho[i], point.rho.value);
        assert_eq!(t[i], point.t.value);
        assert_eq!(pv[i], point.pv.value);
        assert!(mu[i] > 1e-5 && mu[i] < 5e-5, "mu = {}", mu[i]);
        assert_eq!(statuses[i], PointStatus::Good);
    }
}

#[test]
fn derivatives_match_finite_differences() {
    let mixture = steam_n2_he();
    let (p, h) = (3e5, 2.8e6);
    let c = [0.85, 0.1, 0.05];
    let eval = |p: f64, h: f64, c: [f64; 3]| {
        let c = Composition::new(&c).unwrap();
        mixture.evaluate_ph(p, h, &c).unwrap().value
    };
    let base = eval(p, h, c);

    let dp = 50.0;
    let fd = (eval(p + dp, h, c).rho.value - eval(p - dp, h, c).rho.value) / (2.0 * dp);
    assert!(rel_diff(base.rho.d_p, fd) < 1e-3, "d_rho_d_p: {} vs {fd}", base.rho.d_p);

    let dh = 100.0;
    let fd = (eval(p, h + dh, c).t.value - eval(p, h - dh, c).t.value) / (2.0 * dh);
    assert!(rel_diff(base.t.d_h, fd) < 1e-3, "d_T_d_h: {} vs {fd}", base.t.d_h);

    let fd = (eval(p, h + dh, c).cp.value - eval(p, h - dh, c).cp.value) / (2.0 * dh);
    assert!((base.cp.d_h - fd).abs() < 1e-6 + 1e-3 * fd.abs(), "d_cp_d_h");

    // vapor fraction absorbs the change
    let dc = 1e-4;
    let plus = eval(p, h, [c[0] - dc, c[1] + dc, c[2]]);
    let minus = eval(p, h, [c[0] + dc, c[1] - dc, c[2]]);
    let fd = (plus.rho.value - minus.rho.value) / (2.0 * dc);
    assert!(rel_diff(base.rho.d_c[0], fd) < 1e-3, "d_rho_d_c_1: {} vs {fd}", base.rho.d_c[0]);
    let fd = (plus.pv.value - minus.pv.value) / (2.0 * dc);
    assert!(rel_diff(base.pv.d_c[0], fd) < 1e-3, "d_p_0_d_c_1: {} vs {fd}", base.pv.d_c[0]);
    let fd = (plus.lambda.value - minus.lambda.value) / (2.0 * dc);
    assert!(rel_diff(base.lambda.d_c[0], fd) < 1e-3, "d_lambda_d_c_1");
    let fd = (plus.dncv.value - minus.dncv.value) / (2.0 * dc);
    assert!(rel_diff(base.dncv.d_c[0], fd) < 1e-3, "d_dncv_d_c_1");
}

#[test]
fn tagged_derivative_outputs() {
    let mixture = steam_air();
    let mut d_rho = [0.0; 3];
    let mut d_tsat = [0.0; 3];
    let mut x = [0.0; 3];
    let mut statuses = [PointStatus::Good; 3];
    let mut outputs = [
        FieldMut::named("d_rho_d_c_1_ph", &mut d_rho).unwrap(),
        FieldMut::named("d_T_sat_d_p", &mut d_tsat).unwrap(),
        FieldMut::named("xnc", &mut x).unwrap(),
    ];
    let mut errors = ErrorField::new(&mut statuses);
    mixture
        .compute(&inputs(), &mut outputs, &mut errors)
        .unwrap();
    drop(outputs);

    let steam = IdealSteam::new();
    for i in 0..3 {
        assert!(d_rho[i].is_finite());
        let sat = steam.saturation(P[i]).unwrap().value;
        assert_eq!(d_tsat[i], sat.dt_dp);
        assert!((x[i] - C1[i]).abs() < 1e-12);
    }
}

#[test]
fn saturation_pass_through_from_temperature() {
    let mixture = steam_air();
    let t = [373.15, 450.0];
    let mut p_sat = [0.0; 2];
    let mut t_sat = [0.0; 2];
    let mut statuses = [PointStatus::Good; 2];
    let (c0, c1) = ([0.9, 0.9], [0.1, 0.1]);
    let inputs = [
        Field::new(Property::TEMPERATURE, &t),
        Field::new(Property::fraction(0), &c0),
        Field::new(Property::fraction(1), &c1),
    ];
    {
        let mut outputs = [
            FieldMut::new(Property::SAT_PRESSURE, &mut p_sat),
            FieldMut::new(Property::SAT_TEMPERATURE, &mut t_sat),
        ];
        let mut errors = ErrorField::new(&mut statuses);
        mixture.compute(&inputs, &mut outputs, &mut errors).unwrap();
    }
    assert!((p_sat[0] - 101_325.0).abs() < 1.0);
    assert!((t_sat[0] - 373.15).abs() < 1e-6);
    assert!((t_sat[1] - 450.0).abs() < 1e-6);
}

#[test]
fn saturation_without_fractions_is_an_input_error() {
    let mixture = steam_air();
    let p = [1e5];
    let mut t_sat = [-1.0];
    let mut statuses = [PointStatus::Good];
    let inputs = [Field::new(Property::PRESSURE, &p)];
    let mut outputs = [FieldMut::new(Property::SAT_TEMPERATURE, &mut t_sat)];
    let mut errors = ErrorField::new(&mut statuses);
    let err = mixture
        .compute(&inputs, &mut outputs, &mut errors)
        .unwrap_err();
    assert!(matches!(err, MixingError::InputProperty { .. }), "{err}");
    assert_eq!(errors.worst(), PointStatus::InputProperty);
    drop(outputs);
    assert_eq!(t_sat[0], -1.0);
}

#[test]
fn unsupported_output_is_rejected_before_writing() {
    let mixture = steam_air();
    let mut rho = [-1.0; 3];
    let mut bad = [-1.0; 3];
    let mut statuses = [PointStatus::Good; 3];
    let mut outputs = [
        FieldMut::named("rho", &mut rho).unwrap(),
        FieldMut::named("p_3", &mut bad).unwrap(),
    ];
    let mut errors = ErrorField::new(&mut statuses);
    let err = mixture
        .compute(&inputs(), &mut outputs, &mut errors)
        .unwrap_err();
    assert!(matches!(err, MixingError::UnsupportedOutput { .. }), "{err}");
    assert_eq!(errors.worst(), PointStatus::InputProperty);
    drop(outputs);
    assert_eq!(rho, [-1.0; 3]);
}

#[test]
fn evaluated_points_produce_every_template_output() {
    let c = Composition::new(&[0.8, 0.15, 0.05]).unwrap();
    let point = steam_n2_he().evaluate_ph(5e5, 2.9e6, &c).unwrap().value;
    let template = MixturePoint::template(2);
    for name in [
        "rho", "T", "p_0", "c_2", "sigma", "dncv", "xnc", "p_1", "p_2",
        "d_rho_d_p_h", "d_rho_d_c_2_ph", "d2_T_sat_d_p_d_p", "d_T_sat_0_d_p_0_h",
    ] {
        let property = name.parse::<Property>().unwrap();
        assert!(template.get(property).is_some(), "{name}");
        assert!(point.get(property).is_some(), "{name}");
    }
}

#[test]
fn gas_outputs_need_gases() {
    let mixture = vm_mixing::Mixture::new(vec![vm_mixing::Component::vapor(IdealSteam::new())])
        .unwrap();
    let p = [1e5];
    let h = [2.7e6];
    let c = [1.0];
    let inputs = [
        Field::new(Property::PRESSURE, &p),
        Field::new(Property::ENTHALPY, &h),
        Field::new(Property::fraction(0), &c),
    ];
    let mut out = [0.0];
    let mut statuses = [PointStatus::Good];
    let mut outputs = [FieldMut::named("dncv", &mut out).unwrap()];
    let mut errors = ErrorField::new(&mut statuses);
    let err = mixture.compute(&inputs, &mut outputs, &mut errors).unwrap_err();
    assert!(matches!(err, MixingError::UnsupportedOutput { .. }));

    let mut rho = [0.0];
    let mut outputs = [FieldMut::named("rho", &mut rho).unwrap()];
    mixture.compute(&inputs, &mut outputs, &mut errors).unwrap();
    drop(outputs);
    assert!((rho[0] - IdealSteam::new().state_ph(1e5, 2.7e6).unwrap().value.rho).abs() < 1e-9);
}

#[test]
fn length_mismatch_fills_errors() {
    let mixture = steam_air();
    let mut rho = [0.0; 2];
    let mut statuses = [PointStatus::Good; 3];
    let mut outputs = [FieldMut::named("rho", &mut rho).unwrap()];
    let mut errors = ErrorField::new(&mut statuses);
    let err = mixture
        .compute(&inputs(), &mut outputs, &mut errors)
        .unwrap_err();
    assert!(matches!(err, MixingError::DataNumber { len: 2, expected: 3, .. }));
    assert!(errors.statuses().iter().all(|s| *s == PointStatus::DataNumber));
}

#[test]
fn out_of_range_point_is_flagged() {
    let mixture = steam_air();
    let p = [1e5, 1e5];
    let h = [2.6e6, 5.0e6];
    let c0 = [0.95, 0.95];
    let c1 = [0.05, 0.05];
    let inputs = [
        Field::new(Property::PRESSURE, &p),
        Field::new(Property::ENTHALPY, &h),
        Field::new(Property::fraction(0), &c0),
        Field::new(Property::fraction(1), &c1),
    ];
    let mut t = [0.0; 2];
    let mut statuses = [PointStatus::Good; 2];
    let mut outputs = [FieldMut::named("T", &mut t).unwrap()];
    let mut errors = ErrorField::new(&mut statuses);
    let severity = mixture.compute(&inputs, &mut outputs, &mut errors).unwrap();
    assert_eq!(severity, Severity::Warning);
    assert_eq!(errors.get(0), Some(PointStatus::Good));
    assert_eq!(errors.get(1), Some(PointStatus::OutOfRange));
}

#[test]
fn non_convergence_aborts_the_batch() {
    let mixture = steam_air();
    let p = [1e5, -1e5];
    let h = [2.6e6, 2.6e6];
    let c0 = [0.95, 0.95];
    let c1 = [0.05, 0.05];
    let inputs = [
        Field::new(Property::PRESSURE, &p),
        Field::new(Property::ENTHALPY, &h),
        Field::new(Property::fraction(0), &c0),
        Field::new(Property::fraction(1), &c1),
    ];
    let mut rho = [-1.0; 2];
    let mut statuses = [PointStatus::Good; 2];
    let mut outputs = [FieldMut::named("rho", &mut rho).unwrap()];
    let mut errors = ErrorField::new(&mut statuses);
    let err = mixture.compute(&inputs, &mut outputs, &mut errors).unwrap_err();
    assert!(matches!(err, MixingError::NonConvergence { point: Some(1), .. }), "{err}");
    assert_eq!(errors.get(1), Some(PointStatus::NonConvergence));
    drop(outputs);
    assert_eq!(rho, [-1.0; 2]);
}

#[test]
fn more_gases_more_diffusion_outputs() {
    let mixture = steam_n2_he();
    let c = Composition::new(&[0.7, 0.2, 0.1]).unwrap();
    let point = mixture.evaluate_ph(2e5, 2.8e6, &c).unwrap().value;

    let d_n2 = point.get("dncv_1".parse().unwrap()).unwrap();
    let d_he = point.get("dncv_2".parse().unwrap()).unwrap();
    // helium diffuses faster in steam than nitrogen
    assert!(d_he > d_n2);
    assert!(point.dncv.value > d_n2.min(d_he) && point.dncv.value < d_n2.max(d_he));

    let p1 = point.get("p_1".parse().unwrap()).unwrap();
    let p2 = point.get("p_2".parse().unwrap()).unwrap();
    assert!(rel_diff(point.pv.value + p1 + p2, 2e5) < 1e-6);
}
