use crate::error::Cswl1Error;
use crate::utils::{symmetric_index, try_filled_vec};

/// Normalized, truncated 1-D Gaussian kernel.
///
/// Taps are `exp(-t^2 / (2 sigma^2))` for `|t| <= ceil(4 sigma)`, scaled to
/// unit sum. `sigma == 0` yields the identity kernel.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    radius: usize,
    taps: Vec<f32>,
}

impl GaussianKernel {
    /// Create a kernel with standard deviation `sigma`.
    ///
    /// # Errors
    ///
    /// * `Cswl1Error::InvalidParameter` - If `sigma` is negative or not finite
    pub fn new(sigma: f32) -> Result<Self, Cswl1Error> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(Cswl1Error::InvalidParameter(format!(
                "sigma must be finite and non-negative, got {sigma}"
            )));
        }

        if sigma == 0.0 {
            return Ok(Self {
                radius: 0,
                taps: vec![1.0],
            });
        }

        let radius = (4.0 * sigma).ceil() as usize;
        let mut taps = try_filled_vec(2 * radius + 1, 0.0f32)?;
        let denom = 2.0 * f64::from(sigma) * f64::from(sigma);

        let gauss = |i: usize| {
            let t = i as f64 - radius as f64;
            (-t * t / denom).exp()
        };
        let sum: f64 = (0..taps.len()).map(gauss).sum();

        for (i, tap) in taps.iter_mut().enumerate() {
            *tap = (gauss(i) / sum) as f32;
        }

        Ok(Self { radius, taps })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    pub fn is_identity(&self) -> bool {
        self.radius == 0
    }

    /// Separable convolution of a `width x height` plane, in place.
    ///
    /// Samples outside the plane are taken by whole-sample symmetric
    /// extension. `scratch` must hold at least `width * height` values.
    pub fn smooth_plane(&self, plane: &mut [f32], scratch: &mut [f32], width: usize, height: usize) {
        if self.is_identity() {
            return;
        }
        let r = self.radius as isize;

        // Horizontal pass into scratch
        for y in 0..height {
            let row = &plane[y * width..(y + 1) * width];
            for x in 0..width {
                scratch[y * width + x] = self
                    .taps
                    .iter()
                    .enumerate()
                    .map(|(k, &tap)| tap * row[symmetric_index(x as isize + k as isize - r, width)])
                    .sum();
            }
        }

        // Vertical pass back into the plane
        for y in 0..height {
            for x in 0..width {
                plane[y * width + x] = self
                    .taps
                    .iter()
                    .enumerate()
                    .map(|(k, &tap)| {
                        tap * scratch[symmetric_index(y as isize + k as isize - r, height) * width + x]
                    })
                    .sum();
            }
        }
    }
}
