//! Internal utility functions for cswl1-demosaic.
//!
//! This module contains buffer allocation, validation and boundary
//! extension helpers shared by the solver stages.

use crate::error::Cswl1Error;

/// Minimum accepted image width.
pub const MIN_WIDTH: usize = 4;
/// Minimum accepted image height.
pub const MIN_HEIGHT: usize = 4;

/// Allocates a vector of `len` copies of `value`, reporting allocation failure.
///
/// # Arguments
///
/// * `len` - Number of elements
/// * `value` - Fill value
///
/// # Returns
///
/// The filled vector, or [`Cswl1Error::AllocationFailed`] if the memory
/// could not be reserved
pub fn try_filled_vec<T: Clone>(len: usize, value: T) -> Result<Vec<T>, Cswl1Error> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| Cswl1Error::AllocationFailed { elements: len })?;
    buffer.resize(len, value);
    Ok(buffer)
}

/// Copies a slice into a freshly allocated vector, reporting allocation failure.
pub fn try_clone_slice<T: Clone>(source: &[T]) -> Result<Vec<T>, Cswl1Error> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(source.len())
        .map_err(|_| Cswl1Error::AllocationFailed {
            elements: source.len(),
        })?;
    buffer.extend_from_slice(source);
    Ok(buffer)
}

/// Validates that an image meets the minimum size of the solver.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
///
/// # Returns
///
/// `Ok(())` if the dimensions are at least 4x4, otherwise an error
pub fn validate_dimensions(width: usize, height: usize) -> Result<(), Cswl1Error> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        Err(Cswl1Error::ImageTooSmall {
            width,
            height,
            min_width: MIN_WIDTH,
            min_height: MIN_HEIGHT,
        })
    } else {
        Ok(())
    }
}

/// Length of a planar RGB buffer for a `width x height` image.
///
/// # Returns
///
/// `3 * width * height`, or [`Cswl1Error::DimensionOverflow`] if the product
/// does not fit in `usize`
pub fn planar_len(width: usize, height: usize) -> Result<usize, Cswl1Error> {
    width
        .checked_mul(height)
        .and_then(|npix| npix.checked_mul(3))
        .ok_or(Cswl1Error::DimensionOverflow { width, height })
}

/// Validates that a buffer holds exactly `expected` elements.
pub fn validate_buffer_len(expected: usize, actual: usize) -> Result<(), Cswl1Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(Cswl1Error::BufferSizeMismatch { expected, actual })
    }
}

/// Clamps a signed coordinate to `[0, n)` (edge replication).
#[inline]
pub fn clamp_index(i: isize, n: usize) -> usize {
    i.clamp(0, n as isize - 1) as usize
}

/// Maps a signed coordinate into `[0, n)` by whole-sample symmetric extension.
///
/// The border sample is not repeated: `-1 -> 1`, `n -> n - 2`. Coordinates
/// further out are reflected again, so any offset is valid. Parity of the
/// coordinate is preserved, which keeps CFA colors aligned.
#[inline]
pub fn symmetric_index(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let folded = i.rem_euclid(period);
    if folded < n as isize {
        folded as usize
    } else {
        (period - folded) as usize
    }
}

/// Euclidean norm of a slice, accumulated in double precision.
pub fn l2_norm(values: &[f32]) -> f32 {
    values
        .iter()
        .map(|&v| f64::from(v) * f64::from(v))
        .sum::<f64>()
        .sqrt() as f32
}

/// Convert interleaved HWC samples to planar CHW.
///
/// - `interleaved`: `[R0,G0,B0, R1,G1,B1, ...]`
/// - returns `[R0..Rn, G0..Gn, B0..Bn]`
pub fn interleaved_to_planar(interleaved: &[f32]) -> Result<Vec<f32>, Cswl1Error> {
    let npix = interleaved.len() / 3;
    let mut planar = try_filled_vec(interleaved.len(), 0.0f32)?;
    for (i, rgb) in interleaved.chunks_exact(3).enumerate() {
        planar[i] = rgb[0];
        planar[npix + i] = rgb[1];
        planar[2 * npix + i] = rgb[2];
    }
    Ok(planar)
}

/// Scatter planar CHW samples back into an interleaved HWC buffer.
pub fn planar_to_interleaved(planar: &[f32], interleaved: &mut [f32]) {
    let npix = planar.len() / 3;
    for (i, rgb) in interleaved.chunks_exact_mut(3).enumerate() {
        rgb[0] = planar[i];
        rgb[1] = planar[npix + i];
        rgb[2] = planar[2 * npix + i];
    }
}
