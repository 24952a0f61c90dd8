use std::f64::consts::FRAC_PI_2;

use approx::assert_abs_diff_eq;
use isospin::{
    Axis, EnsembleConfig, EventKind, EventSeq, MagnetizationModel, ModelError, ModelKind,
    SequenceError, SignalRecorder, SimulationConfig, SingleVector, SteadyStateConfig, Tissue,
    build_model,
};

const TR: f64 = 50.0;
const TE: f64 = 5.0;

fn spoiled_gre(angle: f64) -> EventSeq {
    EventSeq::from_events([
        (0.0, EventKind::Pulse { angle, axis: Axis::X }),
        (TE, EventKind::Sample { tag: 0 }),
        (TR, EventKind::Spoiler),
        (TR, EventKind::Repeat),
    ])
    .unwrap()
}

fn tight() -> SteadyStateConfig {
    SteadyStateConfig {
        threshold: 1e-12,
        max_repetitions: 10_000,
    }
}

/// Longitudinal magnetization right before each pulse of an ideally spoiled
/// gradient echo in steady state.
fn ernst_mz(tissue: &Tissue, angle: f64) -> f64 {
    let e1 = (-TR / tissue.t1).exp();
    tissue.nh * (1.0 - e1) / (1.0 - e1 * angle.cos())
}

#[test]
fn free_induction_decay() {
    let mut model = SingleVector::new(Tissue::new(600.0, 100.0, 100.0, 1.0)).unwrap();
    let mut seq =
        EventSeq::from_events([(0.0, EventKind::Pulse { angle: FRAC_PI_2, axis: Axis::X })])
            .unwrap();
    seq.apply_next_event(&mut model, &mut |_| {}).unwrap();

    let m = model.relax(10.0).unwrap();
    assert_abs_diff_eq!(m.x, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(m.y, (-0.1f64).exp(), epsilon = 1e-12);
    assert_abs_diff_eq!(m.z, 1.0 - (-10.0f64 / 600.0).exp(), epsilon = 1e-12);
}

#[test]
fn spoiled_gradient_echo_reaches_ernst_steady_state() {
    let tissue = Tissue::new(600.0, 80.0, 40.0, 1.0);
    let angle = 30f64.to_radians();
    let mut model = SingleVector::new(tissue).unwrap();
    let mut seq = spoiled_gre(angle);

    let steady = seq
        .apply_to_steady_state(&mut model, &tight(), &mut |_| {})
        .unwrap();
    let mz = ernst_mz(&tissue, angle);
    assert_abs_diff_eq!(steady.magnetization.z, mz, epsilon = 1e-9);
    assert_eq!(steady.magnetization.transverse().norm(), 0.0);

    let mut recorder = SignalRecorder::new();
    seq.apply_one_repetition(&mut model, &mut recorder.callback())
        .unwrap();
    let signal = recorder.into_signal();
    assert_eq!(signal.times, [TE]);

    let expected = angle.sin() * mz * (-TE / tissue.t2_star).exp();
    assert_abs_diff_eq!(signal.samples[0].re, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(signal.samples[0].im, expected, epsilon = 1e-3);
}

#[test]
fn all_models_agree_on_spoiled_longitudinal_steady_state() {
    let tissue = Tissue::new(600.0, 80.0, 40.0, 1.0);
    let angle = 30f64.to_radians();
    let mz = ernst_mz(&tissue, angle);

    for kind in [ModelKind::SingleVector, ModelKind::Ensemble, ModelKind::Spectral] {
        let mut model = build_model(kind, tissue, None, &EnsembleConfig::default()).unwrap();
        let steady = spoiled_gre(angle)
            .apply_to_steady_state(model.as_mut(), &tight(), &mut |_| {})
            .unwrap();
        assert_abs_diff_eq!(steady.magnetization.z, mz, epsilon = 1e-9);
    }
}

#[test]
fn ensemble_echo_decays_close_to_t2_star() {
    let tissue = Tissue::new(600.0, 80.0, 40.0, 1.0);
    let angle = 30f64.to_radians();
    let mut model =
        build_model(ModelKind::Spectral, tissue, None, &EnsembleConfig::default()).unwrap();
    let mut seq = spoiled_gre(angle);
    seq.apply_to_steady_state(model.as_mut(), &tight(), &mut |_| {})
        .unwrap();

    let mut recorder = SignalRecorder::new();
    seq.apply_one_repetition(model.as_mut(), &mut recorder.callback())
        .unwrap();
    let sample = recorder.signal().samples[0];
    let expected = angle.sin() * ernst_mz(&tissue, angle) * (-TE / tissue.t2_star).exp();
    assert!((sample.norm() - expected).abs() < 0.03 * expected);
}

#[test]
fn flip_error_scales_every_pulse() {
    let tissue = Tissue::new(600.0, 80.0, 40.0, 1.0);
    let mut scaled = SingleVector::new(tissue).unwrap();
    scaled.set_flip_error(0.5);
    let mut reference = SingleVector::new(tissue).unwrap();

    let a = spoiled_gre(60f64.to_radians())
        .apply_to_steady_state(&mut scaled, &tight(), &mut |_| {})
        .unwrap();
    let b = spoiled_gre(30f64.to_radians())
        .apply_to_steady_state(&mut reference, &tight(), &mut |_| {})
        .unwrap();
    assert_abs_diff_eq!(a.magnetization.z, b.magnetization.z, epsilon = 1e-9);
}

#[test]
fn apply_to_time_follows_the_periodic_program() {
    let tissue = Tissue::new(600.0, 80.0, 40.0, 1.0);
    let mut seq = spoiled_gre(FRAC_PI_2);
    let mut model = SingleVector::new(tissue).unwrap();
    let mut samples = 0;

    // two full repetitions, then the echo time of the third
    let m = seq
        .apply_to_time(&mut model, 2.0 * TR + TE, &mut |_| samples += 1)
        .unwrap();
    assert_eq!(samples, 3);
    let mz = 1.0 - (-TR / 600.0f64).exp();
    assert_abs_diff_eq!(m.y, mz * (-TE / 40.0f64).exp(), epsilon = 1e-12);
}

#[test]
fn t2_star_must_be_shorter_than_t2() {
    let tissue = Tissue::new(600.0, 80.0, 80.0, 1.0);
    for kind in [ModelKind::Ensemble, ModelKind::Spectral] {
        let err = build_model(kind, tissue, None, &EnsembleConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::T2StarNotBelowT2 { .. }));
    }
    // the single vector has no T2' to derive
    assert!(build_model(ModelKind::SingleVector, tissue, None, &EnsembleConfig::default()).is_ok());
}

#[test]
fn runaway_sequence_reports_no_convergence() {
    let tissue = Tissue::new(600.0, 80.0, 40.0, 1.0);
    let mut model = SingleVector::new(tissue).unwrap();
    let config = SteadyStateConfig {
        threshold: 0.0,
        max_repetitions: 5,
    };
    let err = spoiled_gre(0.5)
        .apply_to_steady_state(&mut model, &config, &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, SequenceError::NoConvergence { repetitions: 5, .. }));
}

#[test]
fn configured_simulation() {
    let config = SimulationConfig::from_json(
        r#"{ "steady_state": { "threshold": 1e-10 }, "ensemble": { "min_isochromats": 256 } }"#,
    )
    .unwrap();
    let tissue = Tissue::new(600.0, 80.0, 40.0, 1.0);
    let mut model = build_model(ModelKind::Ensemble, tissue, None, &config.ensemble).unwrap();
    assert_eq!(model.isochromat_count(), 256);

    let angle = 30f64.to_radians();
    let steady = spoiled_gre(angle)
        .apply_to_steady_state(model.as_mut(), &config.steady_state, &mut |_| {})
        .unwrap();
    assert_abs_diff_eq!(steady.magnetization.z, ernst_mz(&tissue, angle), epsilon = 1e-7);
}
