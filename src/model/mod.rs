//! Magnetization models: one contract, three implementations trading fidelity
//! for speed.
//!
//! | model                | isochromats | cost per operation |
//! |----------------------|-------------|--------------------|
//! | [`SingleVector`]     | 1           | O(1)               |
//! | [`Ensemble`]         | n           | O(n), one sin/cos per isochromat |
//! | [`SpectralEnsemble`] | n           | O(n) with O(1) sin/cos, O(n log n) bulk sampling |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Axis, EnsembleConfig, MagnetizationVector, ModelError, Tissue};

mod ensemble;
mod layout;
mod single;
mod spectral;

pub use ensemble::Ensemble;
pub use layout::{FrequencyGrid, IsochromatLayout};
pub use single::SingleVector;
pub use spectral::SpectralEnsemble;

/// Simulation contract shared by all models.
///
/// A model keeps a reference state `m0` at time `t0`. Every query for a later
/// time is a pure function of that snapshot, only [`rotate`], [`update`],
/// [`zero_transverse_magnetization`], [`set_time`] and
/// [`restore_equilibrium`] move it.
///
/// [`rotate`]: MagnetizationModel::rotate
/// [`update`]: MagnetizationModel::update
/// [`zero_transverse_magnetization`]: MagnetizationModel::zero_transverse_magnetization
/// [`set_time`]: MagnetizationModel::set_time
/// [`restore_equilibrium`]: MagnetizationModel::restore_equilibrium
pub trait MagnetizationModel: fmt::Debug {
    fn tissue(&self) -> &Tissue;

    /// Reference time `t0`.
    fn time(&self) -> f64;

    /// Net magnetization of the reference state.
    fn net_magnetization(&self) -> MagnetizationVector;

    fn isochromat_count(&self) -> usize;

    /// RF inhomogeneity factor multiplied onto every commanded flip angle.
    fn flip_error(&self) -> f64;

    fn set_flip_error(&mut self, flip_error: f64);

    /// No transverse magnetization, full longitudinal equilibrium, `t0 = 0`.
    fn restore_equilibrium(&mut self);

    /// Relaxes to `t`, rotates by `flip_error · angle` about `axis` and rebases
    /// to the rotated state.
    fn rotate(&mut self, t: f64, angle: f64, axis: Axis) -> Result<(), ModelError>;

    /// Magnetization at `t >= t0` without touching the reference state.
    fn relax(&self, t: f64) -> Result<MagnetizationVector, ModelError>;

    /// [`relax`](MagnetizationModel::relax) and rebase to the result.
    fn update(&mut self, t: f64) -> Result<MagnetizationVector, ModelError>;

    /// Relaxes to `t` and destroys all transverse magnetization (ideal spoiler).
    fn zero_transverse_magnetization(&mut self, t: f64) -> Result<(), ModelError>;

    /// Moves the reference time without changing the magnetization.
    fn set_time(&mut self, t: f64);

    /// Net magnetization at a single time. Ensemble models may interpolate.
    fn get_time_sample(&self, t: f64) -> Result<MagnetizationVector, ModelError> {
        self.relax(t)
    }

    /// Net magnetization at `t_start + k · t_step` for `k = 0..count`.
    fn get_time_samples(
        &self,
        count: usize,
        t_start: f64,
        t_step: f64,
    ) -> Result<Vec<MagnetizationVector>, ModelError> {
        (0..count)
            .map(|k| self.relax(t_start + k as f64 * t_step))
            .collect()
    }
}

/// Time elapsed since the reference time, rejecting queries into the past.
pub(crate) fn elapsed(t: f64, t0: f64) -> Result<f64, ModelError> {
    if t < t0 || t.is_nan() {
        return Err(ModelError::TimeBeforeReference { t, t0 });
    }
    Ok(t - t0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    SingleVector,
    Ensemble,
    Spectral,
}

/// Builds a model for `tissue` in its equilibrium state.
///
/// `count` fixes the number of isochromats of the ensemble models; without it
/// the Lorentzian grid picks a power of two from the T2/T2* ratio. The
/// single-vector model ignores both `count` and `config`.
pub fn build_model(
    kind: ModelKind,
    tissue: Tissue,
    count: Option<usize>,
    config: &EnsembleConfig,
) -> Result<Box<dyn MagnetizationModel>, ModelError> {
    let model: Box<dyn MagnetizationModel> = match kind {
        ModelKind::SingleVector => Box::new(SingleVector::new(tissue)?),
        ModelKind::Ensemble => Box::new(Ensemble::new(tissue, count, config)?),
        ModelKind::Spectral => Box::new(SpectralEnsemble::new(tissue, count, config)?),
    };
    debug!(
        ?kind,
        isochromats = model.isochromat_count(),
        t1 = tissue.t1,
        t2 = tissue.t2,
        t2_star = tissue.t2_star,
        "built magnetization model"
    );
    Ok(model)
}
