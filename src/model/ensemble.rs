use num_complex::Complex64;

use crate::{Axis, EnsembleConfig, MagnetizationVector, ModelError, Rotation, Tissue};

use super::{IsochromatLayout, MagnetizationModel, elapsed};

/// Explicit ensemble of isochromats, each relaxing with T2 and precessing at
/// its own off-resonance frequency (`x + iy` picks up `exp(iω·dt)`).
///
/// Works for any layout, including unevenly spaced custom frequencies.
#[derive(Debug, Clone)]
pub struct Ensemble {
    tissue: Tissue,
    layout: IsochromatLayout,
    transverse: Vec<Complex64>,
    longitudinal: Vec<f64>,
    t0: f64,
    flip_error: f64,
}

impl Ensemble {
    /// Lorentzian T2* distribution, see [`IsochromatLayout::lorentzian`].
    pub fn new(
        tissue: Tissue,
        count: Option<usize>,
        config: &EnsembleConfig,
    ) -> Result<Self, ModelError> {
        let layout = IsochromatLayout::lorentzian(&tissue, count, config)?;
        Self::with_layout(tissue, layout)
    }

    pub fn with_layout(tissue: Tissue, layout: IsochromatLayout) -> Result<Self, ModelError> {
        tissue.validate()?;
        if layout.is_empty() {
            return Err(ModelError::EmptyEnsemble);
        }
        let n = layout.len();
        let mut model = Self {
            tissue,
            layout,
            transverse: vec![Complex64::new(0.0, 0.0); n],
            longitudinal: vec![0.0; n],
            t0: 0.0,
            flip_error: 1.0,
        };
        model.restore_equilibrium();
        Ok(model)
    }

    pub fn layout(&self) -> &IsochromatLayout {
        &self.layout
    }

    /// Magnetization of every isochromat in layout order at the reference time.
    pub fn isochromats(&self) -> impl Iterator<Item = MagnetizationVector> + '_ {
        self.transverse
            .iter()
            .zip(&self.longitudinal)
            .map(|(&m, &z)| MagnetizationVector::from_parts(m, z))
    }

    fn relax_in_place(&mut self, dt: f64) {
        let (e1, e2) = self.tissue.decay(dt, self.tissue.t2);
        let isochromats = self
            .transverse
            .iter_mut()
            .zip(self.longitudinal.iter_mut())
            .zip(self.layout.frequencies().iter().zip(self.layout.magnitudes()));
        for ((m, z), (&omega, &m_eq)) in isochromats {
            *m *= Complex64::from_polar(e2, omega * dt);
            *z = *z * e1 + m_eq * (1.0 - e1);
        }
    }
}

impl MagnetizationModel for Ensemble {
    fn tissue(&self) -> &Tissue {
        &self.tissue
    }

    fn time(&self) -> f64 {
        self.t0
    }

    fn net_magnetization(&self) -> MagnetizationVector {
        MagnetizationVector::from_parts(
            self.transverse.iter().sum(),
            self.longitudinal.iter().sum(),
        )
    }

    fn isochromat_count(&self) -> usize {
        self.layout.len()
    }

    fn flip_error(&self) -> f64 {
        self.flip_error
    }

    fn set_flip_error(&mut self, flip_error: f64) {
        self.flip_error = flip_error;
    }

    fn restore_equilibrium(&mut self) {
        self.transverse.fill(Complex64::new(0.0, 0.0));
        self.longitudinal.copy_from_slice(self.layout.magnitudes());
        self.t0 = 0.0;
    }

    fn rotate(&mut self, t: f64, angle: f64, axis: Axis) -> Result<(), ModelError> {
        let rotation = Rotation::new(self.flip_error * angle, axis)?;
        self.update(t)?;
        for (m, z) in self.transverse.iter_mut().zip(self.longitudinal.iter_mut()) {
            rotation.apply_parts(m, z);
        }
        Ok(())
    }

    fn relax(&self, t: f64) -> Result<MagnetizationVector, ModelError> {
        let dt = elapsed(t, self.t0)?;
        let (e1, e2) = self.tissue.decay(dt, self.tissue.t2);
        let transverse: Complex64 = self
            .transverse
            .iter()
            .zip(self.layout.frequencies())
            .map(|(&m, &omega)| m * Complex64::from_polar(e2, omega * dt))
            .sum();
        let z0: f64 = self.longitudinal.iter().sum();
        let z = z0 * e1 + self.layout.total_magnitude() * (1.0 - e1);
        Ok(MagnetizationVector::from_parts(transverse, z))
    }

    fn update(&mut self, t: f64) -> Result<MagnetizationVector, ModelError> {
        let dt = elapsed(t, self.t0)?;
        self.relax_in_place(dt);
        self.t0 = t;
        Ok(self.net_magnetization())
    }

    fn zero_transverse_magnetization(&mut self, t: f64) -> Result<(), ModelError> {
        self.update(t)?;
        self.transverse.fill(Complex64::new(0.0, 0.0));
        Ok(())
    }

    fn set_time(&mut self, t: f64) {
        self.t0 = t;
    }
}
