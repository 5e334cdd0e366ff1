//! D-subproblem: grouped shrinkage of the split edge variables.

use crate::cswl1::color::to_luma_chroma;
use crate::cswl1::graph::{EdgeWeights, NEIGHBOR_DX, NEIGHBOR_DY, NUM_NEIGHBORS};
use crate::cswl1::GAMMA1;
use crate::error::Cswl1Error;
use crate::utils::try_filled_vec;

/// `(Y, C1, C2)` vector for each of the 8 edges of a pixel.
pub type EdgeVectors = [[f32; 3]; NUM_NEIGHBORS];

/// Split variable `d` and its Bregman accumulator `d~`.
///
/// Both hold one [`EdgeVectors`] per pixel, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVariables {
    pub d: Vec<EdgeVectors>,
    pub dtilde: Vec<EdgeVectors>,
}

impl EdgeVariables {
    /// Zero-initialized variables for `npix` pixels.
    pub fn zeroed(npix: usize) -> Result<Self, Cswl1Error> {
        Ok(Self {
            d: try_filled_vec(npix, [[0.0; 3]; NUM_NEIGHBORS])?,
            dtilde: try_filled_vec(npix, [[0.0; 3]; NUM_NEIGHBORS])?,
        })
    }
}

#[inline]
fn sqr(x: f32) -> f32 {
    x * x
}

/// Shrink one group of components (`channels`) over the 8 edges of a pixel.
///
/// `scale` multiplies `w^2` in the denominator: `1/gamma_1` for luma,
/// `alpha/gamma_1` for chroma.
#[inline]
fn shrink_group(
    d: &mut EdgeVectors,
    dtilde: &mut EdgeVectors,
    cu: &EdgeVectors,
    weights: &[f32; NUM_NEIGHBORS],
    channels: std::ops::Range<usize>,
    scale: f32,
) {
    let mut target = [[0.0f32; 3]; NUM_NEIGHBORS];
    let mut norm = 0.0f32;

    for n in 0..NUM_NEIGHBORS {
        for c in channels.clone() {
            target[n][c] = cu[n][c] + d[n][c] - dtilde[n][c];
            norm += sqr(weights[n] * d[n][c]);
        }
    }

    // All-zero d would stall the fixed point; fall back to the target norm
    if norm == 0.0 {
        for n in 0..NUM_NEIGHBORS {
            for c in channels.clone() {
                norm += sqr(weights[n] * target[n][c]);
            }
        }
    }
    let norm = norm.sqrt();

    for n in 0..NUM_NEIGHBORS {
        let factor = if norm > 0.0 {
            norm / (sqr(weights[n]) * scale + norm)
        } else {
            0.0
        };
        for c in channels.clone() {
            let new_d = target[n][c] * factor;
            dtilde[n][c] += 2.0 * new_d - d[n][c] - cu[n][c];
            d[n][c] = new_d;
        }
    }
}

/// One fixed-point pass of the D-subproblem over all interior pixels.
///
/// For each interior pixel `m` and neighbor `n` the transformed difference
/// `Cu = C(u_m - u_n)` is taken from `image` (planar RGB). The chroma group
/// is updated first, then luma. Border pixels are left untouched.
pub fn shrink(
    vars: &mut EdgeVariables,
    image: &[f32],
    graph: &EdgeWeights,
    alpha: f32,
) {
    let (width, height) = (graph.width(), graph.height());
    let npix = width * height;
    let (red, rest) = image.split_at(npix);
    let (green, blue) = rest.split_at(npix);

    let offsets: [isize; NUM_NEIGHBORS] =
        std::array::from_fn(|n| NEIGHBOR_DX[n] + width as isize * NEIGHBOR_DY[n]);

    let luma_scale = 1.0 / GAMMA1;
    let chroma_scale = alpha / GAMMA1;

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let m = y * width + x;

            let cu: EdgeVectors = std::array::from_fn(|n| {
                let j = m.wrapping_add_signed(offsets[n]);
                to_luma_chroma([red[m] - red[j], green[m] - green[j], blue[m] - blue[j]])
            });

            let weights = graph.weights(m);
            shrink_group(&mut vars.d[m], &mut vars.dtilde[m], &cu, weights, 1..3, chroma_scale);
            shrink_group(&mut vars.d[m], &mut vars.dtilde[m], &cu, weights, 0..1, luma_scale);
        }
    }
}
