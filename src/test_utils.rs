//! Test utilities for cswl1-demosaic
//!
//! Synthetic planar RGB images and comparison helpers shared by the unit
//! tests. Planar data holds the R, G and B planes consecutively.
//! It is only compiled when running tests.

use image::Rgb;
use imageproc::definitions::Image;

/// Creates planar RGB data where every pixel has the color `rgb`.
pub fn constant_planes(width: usize, height: usize, rgb: [f32; 3]) -> Vec<f32> {
    let npix = width * height;
    rgb.iter()
        .flat_map(|&value| std::iter::repeat(value).take(npix))
        .collect()
}

/// Creates a two-color checkerboard with 1x1 cells.
///
/// - even `x + y`: [0.9, 0.2, 0.4]
/// - odd `x + y`: [0.1, 0.7, 0.6]
pub fn checkerboard_planes(width: usize, height: usize) -> Vec<f32> {
    const EVEN: [f32; 3] = [0.9, 0.2, 0.4];
    const ODD: [f32; 3] = [0.1, 0.7, 0.6];

    let npix = width * height;
    let mut planes = vec![0.0f32; 3 * npix];
    for y in 0..height {
        for x in 0..width {
            let rgb = if (x + y) % 2 == 0 { EVEN } else { ODD };
            for c in 0..3 {
                planes[c * npix + y * width + x] = rgb[c];
            }
        }
    }
    planes
}

/// Creates a smooth diagonal ramp with a different slope per channel.
pub fn ramp_planes(width: usize, height: usize) -> Vec<f32> {
    let npix = width * height;
    let mut planes = vec![0.0f32; 3 * npix];
    let scale = 1.0 / (width + height) as f32;
    for y in 0..height {
        for x in 0..width {
            let m = y * width + x;
            planes[m] = (x + y) as f32 * scale;
            planes[npix + m] = (2 * x + y) as f32 * scale * 0.5;
            planes[2 * npix + m] = (x + 2 * y) as f32 * scale * 0.5;
        }
    }
    planes
}

/// Largest absolute difference between two equally sized buffers.
pub fn planes_max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "buffer length mismatch");
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

/// Creates a 4x4 RGB f32 image with a distinct value in every channel.
pub fn create_test_rgb_f32_image() -> Image<Rgb<f32>> {
    Image::from_fn(4, 4, |x, y| {
        let i = (y * 4 + x) as f32;
        Rgb([i / 16.0, 1.0 - i / 16.0, 0.5])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_planes_with_valid_input_fills_each_plane() {
        let planes = constant_planes(3, 2, [0.1, 0.2, 0.3]);
        assert_eq!(planes.len(), 18);
        assert!(planes[..6].iter().all(|&v| v == 0.1));
        assert!(planes[6..12].iter().all(|&v| v == 0.2));
        assert!(planes[12..].iter().all(|&v| v == 0.3));
    }

    #[test]
    fn checkerboard_planes_with_valid_input_alternates_colors() {
        let planes = checkerboard_planes(4, 4);
        assert_eq!(planes[0], 0.9);
        assert_eq!(planes[1], 0.1);
        assert_eq!(planes[16 + 4], 0.7);
        assert_eq!(planes[32 + 5], 0.4);
    }

    #[test]
    fn planes_max_abs_diff_with_equal_input_returns_zero() {
        let a = ramp_planes(5, 5);
        assert_eq!(planes_max_abs_diff(&a, &a), 0.0);

        let mut b = a.clone();
        b[7] += 0.25;
        assert!((planes_max_abs_diff(&a, &b) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn create_test_rgb_f32_image_with_valid_input_creates_image() {
        let image = create_test_rgb_f32_image();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0.0, 1.0, 0.5]));
    }
}
