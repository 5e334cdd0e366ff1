use crate::cswl1::cfa::{copy_known_samples, CfaPhase};
use crate::cswl1::color::to_luma_chroma;
use crate::cswl1::graph::{neighbor_index, EdgeWeights, NUM_NEIGHBORS};
use crate::error::Cswl1Error;
use crate::utils::try_clone_slice;

/// Evaluate the CSWL1 energy of `image` (planar RGB).
///
/// ```text
/// E(u) = sum_m sqrt(sum_n w_mn |Y(u_m - u_n)|^2)
///      + alpha sum_m sqrt(sum_n w_mn |C(u_m - u_n)|^2)
/// ```
///
/// The sum runs over in-bounds neighbors. The CFA-known samples are forced
/// to their mosaic values on a copy of the image first; `image` itself is
/// not modified.
///
/// # Errors
///
/// * `Cswl1Error::AllocationFailed` - If the working copy cannot be allocated
pub fn evaluate_energy(
    image: &[f32],
    mosaic: &[f32],
    graph: &EdgeWeights,
    phase: CfaPhase,
    alpha: f32,
) -> Result<f32, Cswl1Error> {
    let (width, height) = (graph.width(), graph.height());
    let npix = width * height;

    let mut u = try_clone_slice(image)?;
    copy_known_samples(&mut u, mosaic, width, height, phase);

    let mut energy = 0.0f64;
    for y in 0..height {
        for x in 0..width {
            let m = y * width + x;
            let mut luma = 0.0f32;
            let mut chroma = 0.0f32;

            for n in 0..NUM_NEIGHBORS {
                let Some(j) = neighbor_index(x, y, n, width, height) else {
                    continue;
                };
                let diff = std::array::from_fn(|c| u[c * npix + m] - u[c * npix + j]);
                let [dy, dc1, dc2] = to_luma_chroma(diff);
                let w = graph.weight(m, n);
                luma += w * dy * dy;
                chroma += w * (dc1 * dc1 + dc2 * dc2);
            }

            energy += f64::from(luma.sqrt()) + f64::from(alpha) * f64::from(chroma.sqrt());
        }
    }

    Ok(energy as f32)
}
