//! Contour-adapted weighted graph over the 8-neighborhood.
//!
//! Every pixel stores the weights of its 8 outgoing edges. Neighbor slots
//! run counter-clockwise starting from the right, with y growing downward:
//!
//! ```text
//! 3  2  1
//! 4  .  0
//! 5  6  7
//! ```
//!
//! The graph is undirected; the weight stored at `(m, n)` is kept equal to
//! the one stored at the neighbor for the opposite slot.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use log::debug;

use crate::cswl1::gaussian::GaussianKernel;
use crate::cswl1::stencils::Orientation;
use crate::error::Cswl1Error;
use crate::utils::{clamp_index, try_filled_vec};

/// Number of neighbors of a pixel.
pub const NUM_NEIGHBORS: usize = 8;

/// Horizontal offset of each neighbor slot.
pub const NEIGHBOR_DX: [isize; NUM_NEIGHBORS] = [1, 1, 0, -1, -1, -1, 0, 1];
/// Vertical offset of each neighbor slot.
pub const NEIGHBOR_DY: [isize; NUM_NEIGHBORS] = [0, -1, -1, -1, 0, 1, 1, 1];

const THIRD: f32 = 1.0 / 3.0;
const TWO_THIRDS: f32 = 2.0 / 3.0;

/// Edge weights contributed by each orientation, before the floor is added.
///
/// Axis-aligned and diagonal orientations connect the two neighbors along the
/// contour; intermediate orientations split between the two closest ones.
pub const ORIENTATION_WEIGHTS: [[f32; NUM_NEIGHBORS]; 8] = [
    [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    [TWO_THIRDS, THIRD, 0.0, 0.0, TWO_THIRDS, THIRD, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, THIRD, TWO_THIRDS, 0.0, 0.0, THIRD, TWO_THIRDS, 0.0],
    [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, TWO_THIRDS, THIRD, 0.0, 0.0, TWO_THIRDS, THIRD],
    [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    [TWO_THIRDS, 0.0, 0.0, THIRD, TWO_THIRDS, 0.0, 0.0, THIRD],
];

/// Slot pointing back from the neighbor in slot `n`.
#[inline]
pub const fn opposite(n: usize) -> usize {
    (n + 4) % NUM_NEIGHBORS
}

/// Index of the neighbor of `(x, y)` in slot `n`, or `None` outside the image.
#[inline]
pub fn neighbor_index(x: usize, y: usize, n: usize, width: usize, height: usize) -> Option<usize> {
    let nx = x.checked_add_signed(NEIGHBOR_DX[n])?;
    let ny = y.checked_add_signed(NEIGHBOR_DY[n])?;
    (nx < width && ny < height).then_some(ny * width + nx)
}

/// Index of the neighbor of `(x, y)` in slot `n`, replicating the border.
#[inline]
fn clamped_neighbor_index(x: usize, y: usize, n: usize, width: usize, height: usize) -> usize {
    let nx = clamp_index(x as isize + NEIGHBOR_DX[n], width);
    let ny = clamp_index(y as isize + NEIGHBOR_DY[n], height);
    ny * width + nx
}

/// Per-pixel edge weights of the contour graph.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeWeights {
    width: usize,
    height: usize,
    data: Vec<[f32; NUM_NEIGHBORS]>,
}

impl EdgeWeights {
    /// Build the graph from per-pixel orientation labels.
    ///
    /// Weights start at `floor + ORIENTATION_WEIGHTS[label]`, are averaged
    /// with the opposite edge stored at the neighbor (border replicated),
    /// then each slot is smoothed spatially with a Gaussian of width `sigma`.
    ///
    /// # Errors
    ///
    /// * `Cswl1Error::DimensionMismatch` - If `labels.len() != width * height`
    /// * `Cswl1Error::InvalidParameter` - If `floor` is not positive or `sigma` is invalid
    /// * `Cswl1Error::AllocationFailed` - If a buffer cannot be allocated
    pub fn build(
        labels: &[Orientation],
        width: usize,
        height: usize,
        floor: f32,
        sigma: f32,
    ) -> Result<Self, Cswl1Error> {
        let npix = width * height;
        if labels.len() != npix {
            return Err(Cswl1Error::DimensionMismatch {
                expected: npix,
                actual: labels.len(),
            });
        }
        if !floor.is_finite() || floor <= 0.0 {
            return Err(Cswl1Error::InvalidParameter(format!(
                "floor weight must be positive, got {floor}"
            )));
        }
        let kernel = GaussianKernel::new(sigma)?;

        let mut data = try_filled_vec(npix, [0.0f32; NUM_NEIGHBORS])?;
        for (weights, label) in data.iter_mut().zip(labels) {
            for (w, &table) in weights.iter_mut().zip(&ORIENTATION_WEIGHTS[label.index()]) {
                *w = floor + table;
            }
        }

        let mut graph = Self {
            width,
            height,
            data,
        };
        graph.symmetrize();
        graph.smooth(&kernel)?;

        debug!(
            "Built contour graph {}x{} (floor = {floor}, sigma = {sigma}, kernel radius = {})",
            width,
            height,
            kernel.radius()
        );

        Ok(graph)
    }

    /// Build a graph with the same weight on every edge.
    pub fn uniform(width: usize, height: usize, weight: f32) -> Result<Self, Cswl1Error> {
        Ok(Self {
            width,
            height,
            data: try_filled_vec(width * height, [weight; NUM_NEIGHBORS])?,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Weight of the edge from pixel `m` in slot `n`.
    #[inline]
    pub fn weight(&self, m: usize, n: usize) -> f32 {
        self.data[m][n]
    }

    /// All 8 weights of pixel `m`.
    #[inline]
    pub fn weights(&self, m: usize) -> &[f32; NUM_NEIGHBORS] {
        &self.data[m]
    }

    /// Smallest weight in the graph.
    pub fn min_weight(&self) -> f32 {
        self.data
            .iter()
            .flatten()
            .copied()
            .fold(f32::INFINITY, f32::min)
    }

    fn symmetrize(&mut self) {
        let (width, height) = (self.width, self.height);

        // Forward slots take the average of both directions
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                for n in 0..4 {
                    let j = clamped_neighbor_index(x, y, n, width, height);
                    self.data[i][n] = (self.data[i][n] + self.data[j][opposite(n)]) / 2.0;
                }
            }
        }

        // Backward slots copy the averaged forward slot of the neighbor
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                for n in 4..NUM_NEIGHBORS {
                    let j = clamped_neighbor_index(x, y, n, width, height);
                    self.data[i][n] = self.data[j][opposite(n)];
                }
            }
        }
    }

    fn smooth(&mut self, kernel: &GaussianKernel) -> Result<(), Cswl1Error> {
        if kernel.is_identity() {
            return Ok(());
        }
        let (width, height) = (self.width, self.height);
        let npix = width * height;

        // One plane per slot
        let mut planes = try_filled_vec(NUM_NEIGHBORS * npix, 0.0f32)?;
        for (m, weights) in self.data.iter().enumerate() {
            for (n, &w) in weights.iter().enumerate() {
                planes[n * npix + m] = w;
            }
        }

        #[cfg(feature = "rayon")]
        {
            let mut scratch = try_filled_vec(NUM_NEIGHBORS * npix, 0.0f32)?;
            planes
                .par_chunks_mut(npix)
                .zip(scratch.par_chunks_mut(npix))
                .for_each(|(plane, scratch)| kernel.smooth_plane(plane, scratch, width, height));
        }

        #[cfg(not(feature = "rayon"))]
        {
            let mut scratch = try_filled_vec(npix, 0.0f32)?;
            for plane in planes.chunks_mut(npix) {
                kernel.smooth_plane(plane, &mut scratch, width, height);
            }
        }

        for (m, weights) in self.data.iter_mut().enumerate() {
            for (n, w) in weights.iter_mut().enumerate() {
                *w = planes[n * npix + m];
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(width: usize, height: usize, f: impl Fn(usize, usize) -> usize) -> Vec<Orientation> {
        (0..width * height)
            .map(|i| Orientation::ALL[f(i % width, i / width) % 8])
            .collect()
    }

    fn assert_symmetric(graph: &EdgeWeights, margin: usize, tol: f32) {
        let (w, h) = (graph.width(), graph.height());
        for y in margin..h - margin {
            for x in margin..w - margin {
                let m = y * w + x;
                for n in 0..NUM_NEIGHBORS {
                    let j = neighbor_index(x, y, n, w, h).unwrap();
                    let forward = graph.weight(m, n);
                    let backward = graph.weight(j, opposite(n));
                    assert!(
                        (forward - backward).abs() <= tol,
                        "({x},{y}) slot {n}: {forward} vs {backward}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_table_rows_are_symmetric_about_the_center() {
        for row in ORIENTATION_WEIGHTS {
            for n in 0..NUM_NEIGHBORS {
                assert_eq!(row[n], row[opposite(n)]);
            }
            assert!(row.iter().filter(|&&w| w > 0.0).count() <= 4);
        }
    }

    #[test]
    fn test_neighbor_index() {
        assert_eq!(neighbor_index(0, 0, 0, 4, 4), Some(1));
        assert_eq!(neighbor_index(0, 0, 7, 4, 4), Some(5));
        assert_eq!(neighbor_index(0, 0, 2, 4, 4), None);
        assert_eq!(neighbor_index(3, 3, 0, 4, 4), None);
        assert_eq!(neighbor_index(2, 2, 3, 4, 4), Some(5));
    }

    #[test]
    fn test_uniform_label_without_smoothing() {
        let (w, h) = (5, 5);
        let graph = EdgeWeights::build(&labels(w, h, |_, _| 0), w, h, 0.15, 0.0).unwrap();
        // Interior: horizontal edges are strong, others carry the floor
        let m = 2 * w + 2;
        let expected = [1.15, 0.15, 0.15, 0.15, 1.15, 0.15, 0.15, 0.15];
        for n in 0..NUM_NEIGHBORS {
            assert!((graph.weight(m, n) - expected[n]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_symmetry_without_smoothing() {
        let (w, h) = (7, 6);
        let graph =
            EdgeWeights::build(&labels(w, h, |x, y| x * 3 + y * 5), w, h, 0.15, 0.0).unwrap();
        assert_symmetric(&graph, 1, 1e-6);
    }

    #[test]
    fn test_symmetry_after_smoothing_in_the_interior() {
        let (w, h) = (16, 16);
        let sigma = 0.6;
        let radius = GaussianKernel::new(sigma).unwrap().radius();
        let graph =
            EdgeWeights::build(&labels(w, h, |x, y| x * y + x), w, h, 0.15, sigma).unwrap();
        assert_symmetric(&graph, radius + 1, 1e-5);
    }

    #[test]
    fn test_weights_stay_above_floor() {
        let (w, h) = (9, 8);
        let floor = 0.05;
        let graph = EdgeWeights::build(&labels(w, h, |x, y| x ^ y), w, h, floor, 1.2).unwrap();
        assert!(graph.min_weight() >= floor - 1e-6);
    }

    #[test]
    fn test_build_rejects_bad_input() {
        let l = labels(4, 4, |_, _| 0);
        assert!(matches!(
            EdgeWeights::build(&l, 5, 4, 0.15, 0.6),
            Err(Cswl1Error::DimensionMismatch { expected: 20, actual: 16 })
        ));
        assert!(matches!(
            EdgeWeights::build(&l, 4, 4, 0.0, 0.6),
            Err(Cswl1Error::InvalidParameter(_))
        ));
        assert!(matches!(
            EdgeWeights::build(&l, 4, 4, 0.15, -1.0),
            Err(Cswl1Error::InvalidParameter(_))
        ));
    }
}
