use crate::cswl1::cfa::{CfaColor, CfaPhase};

/// Source of the initial RGB estimate for the Bregman iteration.
///
/// Any interpolator may be plugged in; the solver only requires that every
/// component of `output` is written.
pub trait InitialEstimate {
    /// Fill `output` (planar `[R, G, B]`, length `3 * width * height`) from `mosaic`.
    fn estimate(
        &self,
        mosaic: &[f32],
        width: usize,
        height: usize,
        phase: CfaPhase,
        output: &mut [f32],
    );
}

/// Bilinear demosaicing.
///
/// Missing components are the average of the nearest same-color samples:
/// horizontal or vertical pairs at green sites, the 4-neighborhood for green
/// at red/blue sites, and the diagonal neighbors for the opposite chroma.
/// At the image border only in-bounds samples are averaged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BilinearDemosaic;

impl InitialEstimate for BilinearDemosaic {
    fn estimate(
        &self,
        mosaic: &[f32],
        width: usize,
        height: usize,
        phase: CfaPhase,
        output: &mut [f32],
    ) {
        bilinear_demosaic(mosaic, width, height, phase, output);
    }
}

const HORIZONTAL: [(isize, isize); 2] = [(-1, 0), (1, 0)];
const VERTICAL: [(isize, isize); 2] = [(0, -1), (0, 1)];
const CROSS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Mean of the in-bounds samples at the given offsets from `(x, y)`.
#[inline]
fn mean_at(
    mosaic: &[f32],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    offsets: &[(isize, isize)],
) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0u32;

    for &(dx, dy) in offsets {
        let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
            continue;
        };
        if nx < width && ny < height {
            sum += mosaic[ny * width + nx];
            count += 1;
        }
    }

    if count > 0 {
        sum / count as f32
    } else {
        0.0
    }
}

/// Bilinear demosaicing of a Bayer mosaic into planar RGB.
///
/// - `mosaic`: single-channel CFA data, row-major, length = `width * height`
/// - `output`: planar CHW buffer, length = `3 * width * height`
pub fn bilinear_demosaic(
    mosaic: &[f32],
    width: usize,
    height: usize,
    phase: CfaPhase,
    output: &mut [f32],
) {
    let npix = width * height;
    let (red, rest) = output.split_at_mut(npix);
    let (green, blue) = rest.split_at_mut(npix);

    for y in 0..height {
        for x in 0..width {
            let m = y * width + x;
            let mean = |offsets: &[(isize, isize)]| mean_at(mosaic, width, height, x, y, offsets);

            match phase.color_at(x, y) {
                CfaColor::Green => {
                    green[m] = mosaic[m];
                    if phase.is_red_row(y) {
                        // Left and right neighbors are red
                        red[m] = mean(&HORIZONTAL);
                        blue[m] = mean(&VERTICAL);
                    } else {
                        red[m] = mean(&VERTICAL);
                        blue[m] = mean(&HORIZONTAL);
                    }
                }
                CfaColor::Red => {
                    red[m] = mosaic[m];
                    green[m] = mean(&CROSS);
                    blue[m] = mean(&DIAGONAL);
                }
                CfaColor::Blue => {
                    blue[m] = mosaic[m];
                    green[m] = mean(&CROSS);
                    red[m] = mean(&DIAGONAL);
                }
            }
        }
    }
}
