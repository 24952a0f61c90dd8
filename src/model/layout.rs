use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{EnsembleConfig, ModelError, Tissue};

/// Evenly spaced off-resonance frequencies `ω_q = (q - count/2) · spacing`
/// for `q = 0..count`, in ascending order.
///
/// The spectral model stores its isochromats in FFT bin order instead: bin `j`
/// holds the signed index `j` below the wrap point `count - count/2` and
/// `j - count` from there on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyGrid {
    pub count: usize,
    pub spacing: f64,
}

impl FrequencyGrid {
    pub fn new(count: usize, spacing: f64) -> Result<Self, ModelError> {
        if count == 0 {
            return Err(ModelError::EmptyEnsemble);
        }
        Ok(Self { count, spacing })
    }

    /// Grid spanning `±lorentz_widths / T2'`.
    ///
    /// Without an explicit `count` the ensemble size is chosen so that the
    /// revival period `2π / spacing` is at least `revival_periods · T2`, which
    /// scales with `T2/T2* - 1`, rounded up to a power of two.
    pub fn for_tissue(
        tissue: &Tissue,
        count: Option<usize>,
        config: &EnsembleConfig,
    ) -> Result<Self, ModelError> {
        tissue.validate()?;
        let t2_prime = tissue.t2_prime()?;
        let count = match count {
            Some(count) => count,
            None => {
                let ratio = tissue.t2 / tissue.t2_star - 1.0;
                let raw = (config.lorentz_widths * config.revival_periods / PI * ratio).ceil();
                (raw as usize)
                    .clamp(config.min_isochromats.max(1), config.max_isochromats.max(1))
                    .next_power_of_two()
            }
        };
        let bandwidth = 2.0 * config.lorentz_widths / t2_prime;
        Self::new(count, bandwidth / count as f64)
    }

    /// Index of the first negative frequency in bin order.
    pub fn wrap_point(&self) -> usize {
        self.count - self.count / 2
    }

    /// Signed frequency index of FFT bin `j`.
    pub fn signed_index(&self, bin: usize) -> isize {
        if bin < self.wrap_point() {
            bin as isize
        } else {
            bin as isize - self.count as isize
        }
    }

    pub fn frequency(&self, q: usize) -> f64 {
        (q as f64 - (self.count / 2) as f64) * self.spacing
    }

    pub fn frequencies(&self) -> Vec<f64> {
        (0..self.count).map(|q| self.frequency(q)).collect()
    }

    /// Period after which the discrete ensemble rephases.
    pub fn revival_period(&self) -> f64 {
        2.0 * PI / self.spacing
    }

    /// Lorentzian line shape `γ / (γ² + ω²)` with `γ = 1/T2'`, normalized to
    /// the proton density. Its ensemble sum decays like `exp(-t/T2')`.
    pub fn lorentzian_magnitudes(&self, tissue: &Tissue) -> Result<Vec<f64>, ModelError> {
        let gamma = 1.0 / tissue.t2_prime()?;
        let shape: Vec<f64> = (0..self.count)
            .map(|q| {
                let w = self.frequency(q);
                gamma / (gamma * gamma + w * w)
            })
            .collect();
        let total: f64 = shape.iter().sum();
        Ok(shape.into_iter().map(|s| tissue.nh * s / total).collect())
    }
}

/// Off-resonance frequency and equilibrium magnitude of every isochromat, in
/// ascending frequency order for grid based layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsochromatLayout {
    frequencies: Vec<f64>,
    magnitudes: Vec<f64>,
    grid: Option<FrequencyGrid>,
}

impl IsochromatLayout {
    /// Standard T2* model: Lorentzian magnitudes on an automatic grid.
    pub fn lorentzian(
        tissue: &Tissue,
        count: Option<usize>,
        config: &EnsembleConfig,
    ) -> Result<Self, ModelError> {
        let grid = FrequencyGrid::for_tissue(tissue, count, config)?;
        let magnitudes = grid.lorentzian_magnitudes(tissue)?;
        Self::on_grid(grid, magnitudes)
    }

    /// Equal magnitudes evenly spread over `bandwidth`.
    pub fn uniform(tissue: &Tissue, count: usize, bandwidth: f64) -> Result<Self, ModelError> {
        let grid = FrequencyGrid::new(count, bandwidth / count.max(1) as f64)?;
        Self::on_grid(grid, vec![tissue.nh / count as f64; count])
    }

    /// Caller supplied magnitudes on a grid, in ascending frequency order.
    pub fn on_grid(grid: FrequencyGrid, magnitudes: Vec<f64>) -> Result<Self, ModelError> {
        if magnitudes.len() != grid.count {
            return Err(ModelError::LayoutMismatch {
                frequencies: grid.count,
                magnitudes: magnitudes.len(),
            });
        }
        Ok(Self {
            frequencies: grid.frequencies(),
            magnitudes,
            grid: Some(grid),
        })
    }

    /// Fully custom frequencies, which do not have to be evenly spaced.
    pub fn custom(frequencies: Vec<f64>, magnitudes: Vec<f64>) -> Result<Self, ModelError> {
        if frequencies.len() != magnitudes.len() {
            return Err(ModelError::LayoutMismatch {
                frequencies: frequencies.len(),
                magnitudes: magnitudes.len(),
            });
        }
        if frequencies.is_empty() {
            return Err(ModelError::EmptyEnsemble);
        }
        Ok(Self {
            frequencies,
            magnitudes,
            grid: None,
        })
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    pub fn grid(&self) -> Option<&FrequencyGrid> {
        self.grid.as_ref()
    }

    pub fn total_magnitude(&self) -> f64 {
        self.magnitudes.iter().sum()
    }
}
