use std::f64::consts::{FRAC_PI_2, PI};

use approx::assert_abs_diff_eq;
use isospin::{
    Axis, Ensemble, EnsembleConfig, FrequencyGrid, IsochromatLayout, MagnetizationModel,
    MagnetizationVector, SpectralEnsemble, Tissue,
};

fn tissue() -> Tissue {
    Tissue::new(700.0, 90.0, 30.0, 0.8)
}

fn assert_same(a: MagnetizationVector, b: MagnetizationVector, epsilon: f64) {
    assert_abs_diff_eq!(a.x, b.x, epsilon = epsilon);
    assert_abs_diff_eq!(a.y, b.y, epsilon = epsilon);
    assert_abs_diff_eq!(a.z, b.z, epsilon = epsilon);
}

/// Drives both models through the same pulse train and compares them at every
/// step.
fn compare(layout: IsochromatLayout) {
    let mut explicit = Ensemble::with_layout(tissue(), layout.clone()).unwrap();
    let mut spectral = SpectralEnsemble::from_layout(tissue(), &layout).unwrap();
    assert_eq!(explicit.isochromat_count(), spectral.isochromat_count());

    let pulses = [
        (0.0, FRAC_PI_2, Axis::X),
        (12.5, PI, Axis::Y),
        (31.0, 0.7, Axis::Vector([1.0, 1.0, 0.0])),
        (55.0, 1.1, Axis::X),
    ];
    for (t, angle, axis) in pulses {
        for offset in [0.0, 0.3, 4.0, 9.75] {
            assert_same(
                explicit.relax(explicit.time() + offset).unwrap(),
                spectral.relax(spectral.time() + offset).unwrap(),
                1e-9,
            );
        }
        explicit.rotate(t, angle, axis).unwrap();
        spectral.rotate(t, angle, axis).unwrap();
        assert_same(explicit.net_magnetization(), spectral.net_magnetization(), 1e-9);
    }

    explicit.zero_transverse_magnetization(80.0).unwrap();
    spectral.zero_transverse_magnetization(80.0).unwrap();
    assert_same(explicit.relax(200.0).unwrap(), spectral.relax(200.0).unwrap(), 1e-9);

    let per_isochromat = explicit.isochromats().zip(spectral.isochromats());
    for (a, b) in per_isochromat {
        assert_same(a, b, 1e-9);
    }
}

#[test]
fn spectral_matches_explicit_ensemble_on_lorentzian_grid() {
    let layout = IsochromatLayout::lorentzian(&tissue(), None, &EnsembleConfig::default()).unwrap();
    assert!(layout.len().is_power_of_two());
    compare(layout);
}

#[test]
fn spectral_matches_explicit_ensemble_on_odd_grid() {
    compare(IsochromatLayout::uniform(&tissue(), 45, 0.3).unwrap());
}

#[test]
fn bulk_sampling_matches_relax() {
    let mut model = SpectralEnsemble::new(tissue(), Some(256), &EnsembleConfig::default()).unwrap();
    model.rotate(3.0, FRAC_PI_2, Axis::X).unwrap();
    model.rotate(8.0, PI, Axis::Y).unwrap();

    let samples = model.get_time_samples(40, 8.25, 0.6).unwrap();
    for (k, sample) in samples.into_iter().enumerate() {
        let t = 8.25 + k as f64 * 0.6;
        assert_same(sample, model.relax(t).unwrap(), 1e-9);
    }

    let step = model.grid_step();
    let grid = model.get_grid_samples().unwrap();
    for k in [0, 1, 17, 100] {
        let t = model.time() + k as f64 * step;
        assert_same(grid[k], model.relax(t).unwrap(), 1e-9);
        assert_same(model.get_time_sample(t).unwrap(), model.relax(t).unwrap(), 1e-9);
    }
}

#[test]
fn discrete_ensemble_revives_after_one_period() {
    let grid = FrequencyGrid::new(64, 0.05).unwrap();
    let layout = IsochromatLayout::on_grid(grid, vec![1.0 / 64.0; 64]).unwrap();
    let mut model = Ensemble::with_layout(Tissue::new(1e9, 1e9, 10.0, 1.0), layout).unwrap();
    model.rotate(0.0, FRAC_PI_2, Axis::X).unwrap();

    let revival = grid.revival_period();
    assert!(model.relax(revival / 2.0).unwrap().transverse().norm() < 1e-9);
    let revived = model.relax(revival).unwrap();
    assert_abs_diff_eq!(revived.y, 1.0, epsilon = 1e-6);
}
