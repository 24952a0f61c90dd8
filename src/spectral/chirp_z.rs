use num_complex::Complex64;

use super::{Direction, fft, zeroed};
use crate::SpectralError;

/// Chirp-z transform (Bluestein's algorithm).
///
/// Evaluates `len` values of the z-transform of `input` on the arc
/// `z_k = exp(i·(w0 + k·wstep))`:
///
/// `X[k] = Σ_n input[n] · exp(-i·n·(w0 + k·wstep))`
///
/// Neither `input.len()` nor `len` has to be a power of two; the convolution is
/// zero-padded to the next power of two `>= input.len() + len - 1`. With
/// `w0 = 0` and `wstep = 2π/n` this is the forward DFT.
pub fn chirp_z_transform(
    input: &[Complex64],
    w0: f64,
    wstep: f64,
    len: usize,
) -> Result<Vec<Complex64>, SpectralError> {
    let n = input.len();
    if n == 0 {
        return Err(SpectralError::Empty);
    }
    if len == 0 {
        return Ok(Vec::new());
    }

    let m = (n + len - 1).next_power_of_two();
    let chirp = |k: usize| {
        let k = k as f64;
        Complex64::from_polar(1.0, 0.5 * wstep * k * k)
    };

    // Input pre-multiplied by the start phase and the down-chirp
    let mut a = zeroed(m)?;
    for (j, (slot, &x)) in a.iter_mut().zip(input).enumerate() {
        *slot = x * Complex64::from_polar(1.0, -w0 * j as f64) * chirp(j).conj();
    }

    // Up-chirp filter, wrapped so negative lags sit at the end of the buffer
    let mut b = zeroed(m)?;
    b[0] = chirp(0);
    for k in 1..len.max(n) {
        let c = chirp(k);
        if k < len {
            b[k] = c;
        }
        if k < n {
            b[m - k] = c;
        }
    }

    fft(&mut a, Direction::Forward)?;
    fft(&mut b, Direction::Forward)?;
    for (x, y) in a.iter_mut().zip(&b) {
        *x *= *y;
    }
    fft(&mut a, Direction::Inverse)?;

    let scale = 1.0 / m as f64;
    Ok(a.into_iter()
        .take(len)
        .enumerate()
        .map(|(k, c)| c * scale * chirp(k).conj())
        .collect())
}
