//! Stand-alone spectral toolkit: radix-2 FFT (1D and N-D), chirp-z transform,
//! Goertzel recursion and fftshift helpers.
//!
//! All transforms work on slices of [`Complex64`], which are laid out as
//! interleaved real / imaginary pairs. Indexing is 0-based: element `k` of a
//! spectrum is the coefficient of `exp(∓2πi·jk/n)`.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::SpectralError;

mod chirp_z;
mod fft;
mod goertzel;
mod shift;

pub use chirp_z::chirp_z_transform;
pub use fft::{fft, fft_nd};
pub use goertzel::goertzel;
pub use shift::{fftshift, fftshift_2d, ifftshift, ifftshift_2d};

/// Sign of the exponent of a transform. Neither direction normalizes, divide
/// by `n` after an inverse transform to undo a forward one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `X[k] = Σ x[j] exp(-2πi·jk/n)`
    Forward,
    /// `x[j] = Σ X[k] exp(+2πi·jk/n)`
    Inverse,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => -1.0,
            Direction::Inverse => 1.0,
        }
    }
}

/// Allocates a zeroed scratch buffer, reporting failure instead of aborting.
pub(crate) fn zeroed(len: usize) -> Result<Vec<Complex64>, SpectralError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(SpectralError::allocation(len))?;
    buf.resize(len, Complex64::new(0.0, 0.0));
    Ok(buf)
}
