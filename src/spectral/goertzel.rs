use std::f64::consts::PI;

use num_complex::Complex64;

use crate::SpectralError;

/// Computes the forward DFT coefficients `X[k]` of `input` for the requested
/// bin positions only, each with an O(n) second order recursion.
///
/// Positions are taken modulo `input.len()`. There is no restriction on the
/// length, which makes this the cheap choice when only a handful of bins is
/// needed.
pub fn goertzel(input: &[Complex64], positions: &[usize]) -> Result<Vec<Complex64>, SpectralError> {
    let n = input.len();
    if n == 0 {
        return Err(SpectralError::Empty);
    }

    let bin = |k: usize| {
        let omega = 2.0 * PI * (k % n) as f64 / n as f64;
        let coeff = 2.0 * omega.cos();
        let mut s1 = Complex64::new(0.0, 0.0);
        let mut s2 = Complex64::new(0.0, 0.0);
        for &x in input {
            let s0 = x + s1 * coeff - s2;
            s2 = s1;
            s1 = s0;
        }
        // y[n-1] scaled back by exp(-iω(n-1)), which equals exp(iω) on a bin
        Complex64::from_polar(1.0, omega) * s1 - s2
    };

    Ok(positions.iter().map(|&k| bin(k)).collect())
}
