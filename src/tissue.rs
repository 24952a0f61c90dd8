use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Relaxation constants and proton density of one voxel.
///
/// All times share one unit (the tests use milliseconds); frequencies used by
/// the models are angular frequencies in radians per that unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tissue {
    pub t1: f64,
    pub t2: f64,
    pub t2_star: f64,
    /// Proton density, the equilibrium longitudinal magnetization.
    pub nh: f64,
}

impl Tissue {
    pub fn new(t1: f64, t2: f64, t2_star: f64, nh: f64) -> Self {
        Self {
            t1,
            t2,
            t2_star,
            nh,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if !(self.t1 > 0.0) {
            return Err(ModelError::InvalidTissue("T1 must be positive"));
        }
        if !(self.t2 > 0.0) {
            return Err(ModelError::InvalidTissue("T2 must be positive"));
        }
        if !(self.t2_star > 0.0) {
            return Err(ModelError::InvalidTissue("T2* must be positive"));
        }
        if !self.nh.is_finite() {
            return Err(ModelError::InvalidTissue("proton density must be finite"));
        }
        Ok(())
    }

    /// Decay constant of the field inhomogeneity alone:
    /// `1/T2' = 1/T2* - 1/T2`.
    pub fn t2_prime(&self) -> Result<f64, ModelError> {
        if self.t2_star >= self.t2 {
            return Err(ModelError::T2StarNotBelowT2 {
                t2: self.t2,
                t2_star: self.t2_star,
            });
        }
        Ok(self.t2 * self.t2_star / (self.t2 - self.t2_star))
    }

    /// `(E1, E2)` decay factors after `dt`, using `t2` as transverse constant.
    pub(crate) fn decay(&self, dt: f64, t2: f64) -> (f64, f64) {
        ((-dt / self.t1).exp(), (-dt / t2).exp())
    }
}
