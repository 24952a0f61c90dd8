use crate::SpectralError;

/// Moves the zero-frequency term to the center: `out[i] = in[(i - n/2) mod n]`.
pub fn fftshift<T>(data: &mut [T]) {
    let half = data.len() / 2;
    data.rotate_right(half);
}

/// Inverse of [`fftshift`], also for odd lengths: `out[i] = in[(i + n/2) mod n]`.
pub fn ifftshift<T>(data: &mut [T]) {
    let half = data.len() / 2;
    data.rotate_left(half);
}

/// Swaps quadrants of a row-major `rows x cols` array. The data is left
/// untouched if the shape does not fit.
pub fn fftshift_2d<T>(data: &mut [T], rows: usize, cols: usize) -> Result<(), SpectralError> {
    shift_2d(data, rows, cols, false)
}

pub fn ifftshift_2d<T>(data: &mut [T], rows: usize, cols: usize) -> Result<(), SpectralError> {
    shift_2d(data, rows, cols, true)
}

fn shift_2d<T>(
    data: &mut [T],
    rows: usize,
    cols: usize,
    inverse: bool,
) -> Result<(), SpectralError> {
    if rows.checked_mul(cols) != Some(data.len()) || cols == 0 {
        return Err(SpectralError::ShapeMismatch {
            len: data.len(),
            shape: vec![rows, cols],
        });
    }
    // shifting whole rows is a rotation by a multiple of `cols`
    let row_shift = (rows / 2) * cols;
    if inverse {
        data.chunks_exact_mut(cols).for_each(ifftshift);
        data.rotate_left(row_shift);
    } else {
        data.chunks_exact_mut(cols).for_each(fftshift);
        data.rotate_right(row_shift);
    }
    Ok(())
}
