use std::f64::consts::PI;

use num_complex::Complex64;

use super::{Direction, zeroed};
use crate::SpectralError;

/// Iterative in-place decimation-in-time FFT. `data.len()` must be a power of
/// two. The result is not normalized.
pub fn fft(data: &mut [Complex64], direction: Direction) -> Result<(), SpectralError> {
    let n = data.len();
    if n == 0 {
        return Err(SpectralError::Empty);
    }
    if !n.is_power_of_two() {
        return Err(SpectralError::NonPowerOfTwo(n));
    }

    bit_reverse_permute(data);

    let sign = direction.sign();
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let theta = sign * 2.0 * PI / len as f64;
        // Twiddle recurrence w <- w * exp(iθ), written as w + w * (exp(iθ) - 1)
        // with exp(iθ) - 1 = -2 sin²(θ/2) + i sin θ to keep the rounding small.
        let s = (0.5 * theta).sin();
        let step = Complex64::new(-2.0 * s * s, theta.sin());

        for block in data.chunks_exact_mut(len) {
            let (lo, hi) = block.split_at_mut(half);
            let mut w = Complex64::new(1.0, 0.0);
            for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                let t = w * *b;
                *b = *a - t;
                *a += t;
                w += w * step;
            }
        }
        len *= 2;
    }
    Ok(())
}

fn bit_reverse_permute(data: &mut [Complex64]) {
    let n = data.len();
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            data.swap(i, j);
        }
    }
}

/// N-dimensional FFT over a row-major array of the given `shape` (last axis
/// contiguous). Every extent must be a power of two.
pub fn fft_nd(
    data: &mut [Complex64],
    shape: &[usize],
    direction: Direction,
) -> Result<(), SpectralError> {
    let total: usize = shape.iter().product();
    if shape.is_empty() || total != data.len() {
        return Err(SpectralError::ShapeMismatch {
            len: data.len(),
            shape: shape.to_vec(),
        });
    }
    if let Some(&bad) = shape.iter().find(|&&d| !d.is_power_of_two()) {
        return Err(SpectralError::NonPowerOfTwo(bad));
    }

    let mut line = zeroed(shape.iter().copied().max().unwrap_or(0))?;
    for (axis, &extent) in shape.iter().enumerate() {
        if extent == 1 {
            continue;
        }
        let stride: usize = shape[axis + 1..].iter().product();
        let outer = total / (extent * stride);
        let line = &mut line[..extent];

        for o in 0..outer {
            for inner in 0..stride {
                let base = o * extent * stride + inner;
                for (k, v) in line.iter_mut().enumerate() {
                    *v = data[base + k * stride];
                }
                fft(line, direction)?;
                for (k, v) in line.iter().enumerate() {
                    data[base + k * stride] = *v;
                }
            }
        }
    }
    Ok(())
}
