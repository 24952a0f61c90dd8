use crate::{Axis, MagnetizationVector, ModelError, Rotation, Tissue};

use super::{MagnetizationModel, elapsed};

/// One magnetization vector for the whole voxel.
///
/// There is no intra-voxel dephasing, so the transverse part decays with T2*
/// directly and cannot be refocused.
#[derive(Debug, Clone)]
pub struct SingleVector {
    tissue: Tissue,
    m0: MagnetizationVector,
    t0: f64,
    flip_error: f64,
}

impl SingleVector {
    pub fn new(tissue: Tissue) -> Result<Self, ModelError> {
        tissue.validate()?;
        let mut model = Self {
            tissue,
            m0: MagnetizationVector::ZERO,
            t0: 0.0,
            flip_error: 1.0,
        };
        model.restore_equilibrium();
        Ok(model)
    }
}

impl MagnetizationModel for SingleVector {
    fn tissue(&self) -> &Tissue {
        &self.tissue
    }

    fn time(&self) -> f64 {
        self.t0
    }

    fn net_magnetization(&self) -> MagnetizationVector {
        self.m0
    }

    fn isochromat_count(&self) -> usize {
        1
    }

    fn flip_error(&self) -> f64 {
        self.flip_error
    }

    fn set_flip_error(&mut self, flip_error: f64) {
        self.flip_error = flip_error;
    }

    fn restore_equilibrium(&mut self) {
        self.m0 = MagnetizationVector::new(0.0, 0.0, self.tissue.nh);
        self.t0 = 0.0;
    }

    fn rotate(&mut self, t: f64, angle: f64, axis: Axis) -> Result<(), ModelError> {
        let rotation = Rotation::new(self.flip_error * angle, axis)?;
        let m = self.relax(t)?;
        self.m0 = rotation.apply(m);
        self.t0 = t;
        Ok(())
    }

    fn relax(&self, t: f64) -> Result<MagnetizationVector, ModelError> {
        let dt = elapsed(t, self.t0)?;
        let (e1, e2) = self.tissue.decay(dt, self.tissue.t2_star);
        Ok(MagnetizationVector::new(
            self.m0.x * e2,
            self.m0.y * e2,
            self.m0.z * e1 + self.tissue.nh * (1.0 - e1),
        ))
    }

    fn update(&mut self, t: f64) -> Result<MagnetizationVector, ModelError> {
        self.m0 = self.relax(t)?;
        self.t0 = t;
        Ok(self.m0)
    }

    fn zero_transverse_magnetization(&mut self, t: f64) -> Result<(), ModelError> {
        let m = self.update(t)?;
        self.m0 = MagnetizationVector::new(0.0, 0.0, m.z);
        Ok(())
    }

    fn set_time(&mut self, t: f64) {
        self.t0 = t;
    }
}
