//! U-subproblem: one Gauss-Seidel sweep over the image estimate.

use crate::cswl1::cfa::CfaPhase;
use crate::cswl1::color::{from_luma_chroma, mul, system_inverse, to_luma_chroma};
use crate::cswl1::graph::{neighbor_index, opposite, NUM_NEIGHBORS};
use crate::cswl1::shrinkage::EdgeVectors;
use crate::cswl1::MU;

/// Number of in-bounds neighbors of `(x, y)`.
///
/// 8 in the interior, 5 along an edge and 3 at a corner.
pub fn active_neighbor_count(x: usize, y: usize, width: usize, height: usize) -> usize {
    (0..NUM_NEIGHBORS)
        .filter(|&n| neighbor_index(x, y, n, width, height).is_some())
        .count()
}

/// Update `image` and `b` in place, visiting pixels in row-major order.
///
/// Each pixel solves
///
/// ```text
/// (C^T C + mu e_k e_k^T) u_m = C^T (sum_n (d~_mn - d~_nm) / 2 + C sum_n u_n) / N
///                              + mu e_k (f_m - b_m)
/// ```
///
/// over its `N` in-bounds neighbors, where `k` is the CFA color of `m`.
/// Neighbors earlier in the sweep contribute their already updated values.
/// Returns the Euclidean norm of the change in `image`.
pub fn gauss_seidel_sweep(
    image: &mut [f32],
    b: &mut [f32],
    dtilde: &[EdgeVectors],
    mosaic: &[f32],
    width: usize,
    height: usize,
    phase: CfaPhase,
) -> f32 {
    let npix = width * height;
    let mut diff_norm = 0.0f64;

    for y in 0..height {
        for x in 0..width {
            let m = y * width + x;
            let mut rgb_sum = [0.0f32; 3];
            let mut consensus = [0.0f32; 3];
            let mut count = 0usize;

            for n in 0..NUM_NEIGHBORS {
                let Some(j) = neighbor_index(x, y, n, width, height) else {
                    continue;
                };
                count += 1;
                for c in 0..3 {
                    rgb_sum[c] += image[c * npix + j];
                    consensus[c] += dtilde[m][n][c] - dtilde[j][opposite(n)][c];
                }
            }

            let c_sum = to_luma_chroma(rgb_sum);
            let inv_count = 1.0 / count as f32;
            let average: [f32; 3] =
                std::array::from_fn(|c| (consensus[c] / 2.0 + c_sum[c]) * inv_count);
            let mut rhs = from_luma_chroma(average);

            let color = phase.color_at(x, y);
            let k = color.index();
            rhs[k] += MU * (mosaic[m] - b[m]);

            let updated = mul(system_inverse(color), rhs);
            b[m] += updated[k] - mosaic[m];

            for (c, &value) in updated.iter().enumerate() {
                let old = &mut image[c * npix + m];
                diff_norm += f64::from(value - *old).powi(2);
                *old = value;
            }
        }
    }

    diff_norm.sqrt() as f32
}
