use image::Rgb;
use imageproc::definitions::Image;

use crate::cswl1::cfa::CfaPhase;
use crate::cswl1::solver::{Cswl1Params, Cswl1Solver, DemosaicReport};
use crate::error::Cswl1Error;
use crate::utils::{interleaved_to_planar, planar_to_interleaved};

/// Demosaic planar RGB data in place with the default collaborators.
///
/// `planes` holds the R, G and B planes (`3 * width * height` values, each
/// plane row-major). Only the CFA-sampled component of each pixel is used as
/// input.
///
/// # Errors
///
/// See [`Cswl1Solver::run`]. Invalid parameters yield
/// `Cswl1Error::InvalidParameter`.
///
/// # Examples
///
/// ```rust
/// use cswl1_demosaic::{demosaic_planar, CfaPhase, Cswl1Params};
///
/// let (width, height) = (4, 4);
/// let mut planes = vec![0.25f32; 3 * width * height];
/// let report = demosaic_planar(&mut planes, width, height, CfaPhase::GRBG, &Cswl1Params::default())?;
/// assert!(report.converged());
/// # Ok::<(), cswl1_demosaic::Cswl1Error>(())
/// ```
pub fn demosaic_planar(
    planes: &mut [f32],
    width: usize,
    height: usize,
    phase: CfaPhase,
    params: &Cswl1Params,
) -> Result<DemosaicReport, Cswl1Error> {
    Cswl1Solver::new(params.clone())?.run(planes, width, height, phase)
}

/// Trait for demosaicing a Bayer-mosaiced RGB image with CSWL1
///
/// The image is expected to hold the raw CFA sample in the channel matching
/// each pixel's color; the other two channels are ignored and overwritten.
pub trait Cswl1Demosaic {
    /// Demosaics the image and returns it
    ///
    /// # Arguments
    ///
    /// * `phase` - Bayer pattern of the mosaic
    /// * `params` - Solver parameters
    ///
    /// # Errors
    ///
    /// * `Cswl1Error::ImageTooSmall` - When the image is smaller than 4x4
    /// * `Cswl1Error::InvalidParameter` - When `params` fails validation
    /// * `Cswl1Error::AllocationFailed` - When a working buffer cannot be allocated
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cswl1_demosaic::{CfaPhase, Cswl1Demosaic, Cswl1Params, Image};
    /// use image::{ImageBuffer, Rgb};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mosaiced: Image<Rgb<f32>> = ImageBuffer::new(64, 64);
    /// let restored = mosaiced.cswl1_demosaic(CfaPhase::RGGB, &Cswl1Params::default())?;
    /// # Ok(())
    /// # }
    /// ```
    fn cswl1_demosaic(self, phase: CfaPhase, params: &Cswl1Params) -> Result<Self, Cswl1Error>
    where
        Self: Sized;

    /// Demosaics the image in-place
    fn cswl1_demosaic_mut(
        &mut self,
        phase: CfaPhase,
        params: &Cswl1Params,
    ) -> Result<&mut Self, Cswl1Error>;

    /// Demosaics the image in-place and returns the solver report
    fn cswl1_demosaic_with_report(
        &mut self,
        phase: CfaPhase,
        params: &Cswl1Params,
    ) -> Result<DemosaicReport, Cswl1Error>;
}

impl Cswl1Demosaic for Image<Rgb<f32>> {
    fn cswl1_demosaic(mut self, phase: CfaPhase, params: &Cswl1Params) -> Result<Self, Cswl1Error> {
        self.cswl1_demosaic_mut(phase, params)?;
        Ok(self)
    }

    fn cswl1_demosaic_mut(
        &mut self,
        phase: CfaPhase,
        params: &Cswl1Params,
    ) -> Result<&mut Self, Cswl1Error> {
        self.cswl1_demosaic_with_report(phase, params)?;
        Ok(self)
    }

    fn cswl1_demosaic_with_report(
        &mut self,
        phase: CfaPhase,
        params: &Cswl1Params,
    ) -> Result<DemosaicReport, Cswl1Error> {
        let (width, height) = self.dimensions();
        let mut planes = interleaved_to_planar(self.as_raw())?;

        let report = demosaic_planar(&mut planes, width as usize, height as usize, phase, params)?;

        planar_to_interleaved(&planes, self);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cswl1::cfa::flatten;
    use crate::test_utils::create_test_rgb_f32_image;
    use image::ImageBuffer;

    fn gradient_image(width: u32, height: u32) -> Image<Rgb<f32>> {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                x as f32 / width as f32,
                y as f32 / height as f32,
                (x + y) as f32 / (width + height) as f32,
            ])
        })
    }

    #[test]
    fn test_image_and_planar_paths_agree() {
        let image = gradient_image(8, 6);
        let params = Cswl1Params::default().with_max_iterations(10);

        let mut planes = interleaved_to_planar(image.as_raw()).unwrap();
        demosaic_planar(&mut planes, 8, 6, CfaPhase::GBRG, &params).unwrap();

        let restored = image.cswl1_demosaic(CfaPhase::GBRG, &params).unwrap();
        let restored_planes = interleaved_to_planar(restored.as_raw()).unwrap();
        assert_eq!(planes, restored_planes);
    }

    #[test]
    fn test_known_samples_survive_the_image_path() {
        let original = gradient_image(6, 6);
        let mosaic =
            flatten(&interleaved_to_planar(original.as_raw()).unwrap(), 6, 6, CfaPhase::RGGB).unwrap();

        let mut image = original.clone();
        let report = image
            .cswl1_demosaic_with_report(CfaPhase::RGGB, &Cswl1Params::default().with_max_iterations(4))
            .unwrap();
        assert!(report.iterations <= 4);

        for (x, y, pixel) in image.enumerate_pixels() {
            let c = CfaPhase::RGGB.color_at(x as usize, y as usize).index();
            assert_eq!(pixel.0[c], mosaic[(y * 6 + x) as usize]);
        }
    }

    #[test]
    fn test_minimum_size_image_demosaics_for_every_phase() {
        let original = create_test_rgb_f32_image();
        let planes = interleaved_to_planar(original.as_raw()).unwrap();

        for phase in [CfaPhase::RGGB, CfaPhase::GRBG, CfaPhase::GBRG, CfaPhase::BGGR] {
            let mosaic = flatten(&planes, 4, 4, phase).unwrap();
            let restored = original.clone().cswl1_demosaic(phase, &Cswl1Params::default()).unwrap();

            assert_eq!(restored.dimensions(), (4, 4));
            for (x, y, pixel) in restored.enumerate_pixels() {
                let c = phase.color_at(x as usize, y as usize).index();
                assert_eq!(pixel.0[c], mosaic[(y * 4 + x) as usize], "{phase} ({x},{y})");
                assert!(pixel.0.iter().all(|v| v.is_finite()));
            }
        }
    }

    #[test]
    fn test_small_image_is_rejected() {
        let image = gradient_image(3, 8);
        assert!(matches!(
            image.cswl1_demosaic(CfaPhase::RGGB, &Cswl1Params::default()),
            Err(Cswl1Error::ImageTooSmall { width: 3, height: 8, .. })
        ));
    }
}
