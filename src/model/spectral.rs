use std::f64::consts::PI;

use num_complex::Complex64;

use crate::spectral::{self, Direction};
use crate::{Axis, EnsembleConfig, MagnetizationVector, ModelError, Rotation, Tissue};

use super::{FrequencyGrid, IsochromatLayout, MagnetizationModel, elapsed};

/// Isochromat ensemble on an evenly spaced frequency grid, stored in FFT bin
/// order so that the spectral toolkit can evaluate it.
///
/// Physically identical to [`super::Ensemble`] with the same layout, but:
/// - relaxation walks the bins with a fixed complex rotor instead of one
///   sin/cos per isochromat,
/// - [`get_grid_samples`](Self::get_grid_samples) yields one sample per grid
///   time with a single inverse FFT,
/// - [`get_time_sample`](MagnetizationModel::get_time_sample) evaluates the two
///   bracketing grid times with Goertzel and interpolates linearly,
/// - [`get_time_samples`](MagnetizationModel::get_time_samples) evaluates
///   arbitrarily spaced times exactly with the chirp-z transform.
#[derive(Debug, Clone)]
pub struct SpectralEnsemble {
    tissue: Tissue,
    grid: FrequencyGrid,
    /// Equilibrium magnitudes, bin order
    magnitudes: Vec<f64>,
    total_magnitude: f64,
    /// `x + iy` per isochromat, bin order
    transverse: Vec<Complex64>,
    longitudinal: Vec<f64>,
    t0: f64,
    flip_error: f64,
}

impl SpectralEnsemble {
    /// Lorentzian T2* distribution, see [`FrequencyGrid::for_tissue`].
    pub fn new(
        tissue: Tissue,
        count: Option<usize>,
        config: &EnsembleConfig,
    ) -> Result<Self, ModelError> {
        let grid = FrequencyGrid::for_tissue(&tissue, count, config)?;
        let magnitudes = grid.lorentzian_magnitudes(&tissue)?;
        Self::with_grid(tissue, grid, magnitudes)
    }

    /// Custom equilibrium magnitudes, given in ascending frequency order.
    pub fn with_grid(
        tissue: Tissue,
        grid: FrequencyGrid,
        mut magnitudes: Vec<f64>,
    ) -> Result<Self, ModelError> {
        tissue.validate()?;
        if magnitudes.len() != grid.count {
            return Err(ModelError::LayoutMismatch {
                frequencies: grid.count,
                magnitudes: magnitudes.len(),
            });
        }
        spectral::ifftshift(&mut magnitudes);

        let n = grid.count;
        let mut model = Self {
            tissue,
            grid,
            total_magnitude: magnitudes.iter().sum(),
            magnitudes,
            transverse: vec![Complex64::new(0.0, 0.0); n],
            longitudinal: vec![0.0; n],
            t0: 0.0,
            flip_error: 1.0,
        };
        model.restore_equilibrium();
        Ok(model)
    }

    /// Grid based layouts only, custom frequencies have no bin order.
    pub fn from_layout(tissue: Tissue, layout: &IsochromatLayout) -> Result<Self, ModelError> {
        let grid = *layout.grid().ok_or(ModelError::NotOnGrid)?;
        Self::with_grid(tissue, grid, layout.magnitudes().to_vec())
    }

    pub fn grid(&self) -> &FrequencyGrid {
        &self.grid
    }

    /// Spacing of the times returned by [`get_grid_samples`](Self::get_grid_samples).
    pub fn grid_step(&self) -> f64 {
        2.0 * PI / (self.grid.count as f64 * self.grid.spacing)
    }

    /// Magnetization of every isochromat in ascending frequency order.
    pub fn isochromats(&self) -> Vec<MagnetizationVector> {
        let mut sorted: Vec<_> = self
            .transverse
            .iter()
            .zip(&self.longitudinal)
            .map(|(&m, &z)| MagnetizationVector::from_parts(m, z))
            .collect();
        spectral::fftshift(&mut sorted);
        sorted
    }

    /// Net magnetization at `t0 + k · grid_step()` for `k = 0..n`, all from one
    /// inverse FFT. Needs a power of two isochromat count.
    pub fn get_grid_samples(&self) -> Result<Vec<MagnetizationVector>, ModelError> {
        let n = self.grid.count;
        if !n.is_power_of_two() {
            return Err(ModelError::NonPowerOfTwo(n));
        }
        let mut dephased = spectral::zeroed(n)?;
        dephased.copy_from_slice(&self.transverse);
        // exp(2πi·jk/n) is exp(i·s_j·Δω·k·step) for every signed bin index s_j
        spectral::fft(&mut dephased, Direction::Inverse)?;

        let step = self.grid_step();
        Ok(dephased
            .into_iter()
            .enumerate()
            .map(|(k, d)| self.decayed(d, k as f64 * step))
            .collect())
    }

    fn longitudinal_sum(&self) -> f64 {
        self.longitudinal.iter().sum()
    }

    /// Applies relaxation over `dt` to a dephased transverse sum.
    fn decayed(&self, dephased: Complex64, dt: f64) -> MagnetizationVector {
        let (e1, e2) = self.tissue.decay(dt, self.tissue.t2);
        let z = self.longitudinal_sum() * e1 + self.total_magnitude * (1.0 - e1);
        MagnetizationVector::from_parts(dephased * e2, z)
    }

    fn phasors(&self, dt: f64) -> Phasors {
        Phasors::new(&self.grid, self.grid.spacing * dt)
    }
}

impl MagnetizationModel for SpectralEnsemble {
    fn tissue(&self) -> &Tissue {
        &self.tissue
    }

    fn time(&self) -> f64 {
        self.t0
    }

    fn net_magnetization(&self) -> MagnetizationVector {
        MagnetizationVector::from_parts(self.transverse.iter().sum(), self.longitudinal_sum())
    }

    fn isochromat_count(&self) -> usize {
        self.grid.count
    }

    fn flip_error(&self) -> f64 {
        self.flip_error
    }

    fn set_flip_error(&mut self, flip_error: f64) {
        self.flip_error = flip_error;
    }

    fn restore_equilibrium(&mut self) {
        self.transverse.fill(Complex64::new(0.0, 0.0));
        self.longitudinal.copy_from_slice(&self.magnitudes);
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
        let dephased: Complex64 = self
            .transverse
            .iter()
            .zip(self.phasors(dt))
            .map(|(&m, p)| m * p)
            .sum();
        Ok(self.decayed(dephased, dt))
    }

    fn update(&mut self, t: f64) -> Result<MagnetizationVector, ModelError> {
        let dt = elapsed(t, self.t0)?;
        let (e1, e2) = self.tissue.decay(dt, self.tissue.t2);
        let phasors = self.phasors(dt);
        let isochromats = self
            .transverse
            .iter_mut()
            .zip(self.longitudinal.iter_mut())
            .zip(self.magnitudes.iter().zip(phasors));
        for ((m, z), (&m_eq, p)) in isochromats {
            *m *= p * e2;
            *z = *z * e1 + m_eq * (1.0 - e1);
        }
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

    fn get_time_sample(&self, t: f64) -> Result<MagnetizationVector, ModelError> {
        let dt = elapsed(t, self.t0)?;
        let n = self.grid.count;
        let position = dt / self.grid_step();
        let node = position.floor();
        let frac = position - node;

        // Inverse DFT value k is the forward coefficient at n - k
        let k = (node as usize) % n;
        let mut bins = vec![(n - k) % n];
        if frac > 0.0 {
            bins.push((n - (k + 1) % n) % n);
        }
        let values = spectral::goertzel(&self.transverse, &bins)?;
        let dephased = match values.get(1) {
            Some(&d1) => values[0] * (1.0 - frac) + d1 * frac,
            None => values[0],
        };
        Ok(self.decayed(dephased, dt))
    }

    fn get_time_samples(
        &self,
        count: usize,
        t_start: f64,
        t_step: f64,
    ) -> Result<Vec<MagnetizationVector>, ModelError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let dt_start = elapsed(t_start, self.t0)?;
        elapsed(t_start + (count - 1) as f64 * t_step, self.t0)?;

        // Ascending order turns the ensemble sum into a geometric arc:
        // Σ_q m_q exp(i(q - h)Δω·dt) = exp(-ihΔω·dt) · Σ_q m_q exp(iqΔω·dt)
        let mut sorted = spectral::zeroed(self.grid.count)?;
        sorted.copy_from_slice(&self.transverse);
        spectral::fftshift(&mut sorted);

        let spacing = self.grid.spacing;
        let half = (self.grid.count / 2) as f64;
        let arc = spectral::chirp_z_transform(
            &sorted,
            -spacing * dt_start,
            -spacing * t_step,
            count,
        )?;

        Ok(arc
            .into_iter()
            .enumerate()
            .map(|(k, x)| {
                let dt = dt_start + k as f64 * t_step;
                let dephased = x * Complex64::from_polar(1.0, -half * spacing * dt);
                self.decayed(dephased, dt)
            })
            .collect())
    }
}

/// `exp(i·s_j·θ)` for every bin `j` in order, by angle recursion.
///
/// Below the wrap point the phase is multiplied by a fixed rotor. At the wrap
/// point the signed index jumps from positive to `-n/2`; since cosine is even
/// and sine is odd, that phase is the conjugate of the one at `+n/2`.
struct Phasors {
    rotor: Complex64,
    phase: Complex64,
    half: Complex64,
    bin: usize,
    half_bin: usize,
    wrap: usize,
    count: usize,
}

impl Phasors {
    fn new(grid: &FrequencyGrid, theta: f64) -> Self {
        Self {
            rotor: Complex64::from_polar(1.0, theta),
            phase: Complex64::new(1.0, 0.0),
            half: Complex64::new(1.0, 0.0),
            bin: 0,
            half_bin: grid.count / 2,
            wrap: grid.wrap_point(),
            count: grid.count,
        }
    }
}

impl Iterator for Phasors {
    type Item = Complex64;

    fn next(&mut self) -> Option<Complex64> {
        if self.bin == self.count {
            return None;
        }
        if self.bin == self.half_bin {
            self.half = self.phase;
        }
        if self.bin == self.wrap {
            self.phase = self.half.conj();
        }
        let phase = self.phase;
        self.phase *= self.rotor;
        self.bin += 1;
        Some(phase)
    }
}
