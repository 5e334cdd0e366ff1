//! Contour orientation estimation with mosaiced contour stencils.
//!
//! A contour stencil is a set of edges between nearby pixels. The total
//! variation of the image along a stencil is small when the stencil runs
//! parallel to the local contour. Mosaiced stencils only connect samples of
//! the same CFA color, so the orientation can be estimated directly on the
//! raw mosaic before any interpolation.
//!
//! Eight orientations `k * pi/8` are detected. The four base stencils
//! (`0`, `pi/4`, `pi/2`, `3pi/4`) are built geometrically; the four
//! intermediate orientations combine the two adjacent base stencils.

use std::f32::consts::FRAC_PI_8;

use itertools::iproduct;

use crate::cswl1::cfa::{CfaColor, CfaPhase};
use crate::error::Cswl1Error;
use crate::utils::{symmetric_index, try_filled_vec};

/// Discrete local contour orientation `k * pi/8`, `k = 0..8`.
///
/// Angles are measured counter-clockwise with the y axis pointing up, so
/// `Pi4` runs from lower-left to upper-right on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Orientation {
    Horizontal = 0,
    Pi8 = 1,
    Pi4 = 2,
    Pi3_8 = 3,
    Vertical = 4,
    Pi5_8 = 5,
    Pi3_4 = 6,
    Pi7_8 = 7,
}

impl Orientation {
    /// All orientations in label order.
    pub const ALL: [Self; 8] = [
        Self::Horizontal,
        Self::Pi8,
        Self::Pi4,
        Self::Pi3_8,
        Self::Vertical,
        Self::Pi5_8,
        Self::Pi3_4,
        Self::Pi7_8,
    ];

    /// Integer label in `0..8`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Orientation for label `index`, or `None` if `index >= 8`.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Angle in radians.
    pub fn angle(self) -> f32 {
        self.index() as f32 * FRAC_PI_8
    }
}

/// Producer of one orientation label per pixel.
///
/// The CSWL1 graph is built from these labels; any estimator returning
/// `width * height` labels in row-major order may be substituted.
pub trait OrientationEstimator {
    fn estimate(
        &self,
        mosaic: &[f32],
        width: usize,
        height: usize,
        phase: CfaPhase,
    ) -> Result<Vec<Orientation>, Cswl1Error>;
}

/// Step vectors of the base stencils (y grows downward).
const BASE_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (1, -1), (0, -1), (-1, -1)];

/// `1 + (cot(pi/16) - 1) / sqrt(2)`
const INTERMEDIATE_FACTOR: f32 = 3.847_759;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StencilEdge {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

#[derive(Clone, Debug, PartialEq)]
struct Stencil {
    edges: Vec<StencilEdge>,
    arc_length: f32,
}

/// Base stencils for one class of center pixel.
#[derive(Clone, Debug, PartialEq)]
struct StencilSet {
    base: [Stencil; 4],
}

/// Same-color relation of two offsets around a center pixel.
///
/// With the center at the origin, `center_is_green` fixes the whole local
/// pattern up to swapping red and blue, which does not change which samples
/// share a color.
fn offset_color(center_is_green: bool, x: i32, y: i32) -> CfaColor {
    // Red at (0,0) for red/blue centers, red at (1,0) for green centers.
    let phase = if center_is_green {
        CfaPhase::GRBG
    } else {
        CfaPhase::RGGB
    };
    phase.color_at(x.rem_euclid(2) as usize, y.rem_euclid(2) as usize)
}

impl StencilSet {
    fn build(radius: f32, center_is_green: bool) -> Self {
        let reach = radius as i32;
        let sqr_radius = (radius * radius) as i32;

        let base = BASE_DIRECTIONS.map(|(dx, dy)| {
            let edges: Vec<StencilEdge> = iproduct!(-reach..=reach, -reach..=reach, 1..=2)
                .filter_map(|(y1, x1, dist)| {
                    let edge = StencilEdge {
                        x1,
                        y1,
                        x2: x1 + dist * dx,
                        y2: y1 + dist * dy,
                    };
                    is_valid_edge(center_is_green, sqr_radius, &edge).then_some(edge)
                })
                .collect();
            let arc_length = edges
                .iter()
                .map(|e| (((e.x1 - e.x2).pow(2) + (e.y1 - e.y2).pow(2)) as f32).sqrt())
                .sum();
            Stencil { edges, arc_length }
        });

        Self { base }
    }

    fn is_complete(&self) -> bool {
        self.base.iter().all(|s| !s.edges.is_empty())
    }

    /// Normalized total variation of all eight orientations at `(x, y)`.
    fn costs(&self, mosaic: &[f32], width: usize, height: usize, x: usize, y: usize) -> [f32; 8] {
        let sample = |dx: i32, dy: i32| {
            let sx = symmetric_index(x as isize + dx as isize, width);
            let sy = symmetric_index(y as isize + dy as isize, height);
            mosaic[sy * width + sx]
        };

        let tv = self.base.each_ref().map(|stencil| {
            stencil
                .edges
                .iter()
                .map(|e| (sample(e.x1, e.y1) - sample(e.x2, e.y2)).abs())
                .sum::<f32>()
        });

        let axial_arc = self.base[0].arc_length;
        let diagonal_to_axial = axial_arc / self.base[1].arc_length;
        let intermediate_norm = axial_arc * INTERMEDIATE_FACTOR;

        let mut costs = [0.0f32; 8];
        for j in 0..4 {
            costs[2 * j] = tv[j] / self.base[j].arc_length;

            // Adjacent base stencils pair one axial (even j) with one diagonal (odd j)
            let next = (j + 1) % 4;
            let (axial, diagonal) = if j % 2 == 0 {
                (tv[j], tv[next])
            } else {
                (tv[next], tv[j])
            };
            costs[2 * j + 1] = (axial + diagonal_to_axial * diagonal) / intermediate_norm;
        }
        costs
    }
}

fn is_valid_edge(center_is_green: bool, sqr_radius: i32, e: &StencilEdge) -> bool {
    let color = offset_color(center_is_green, e.x1, e.y1);
    let max_dist_sqr = if color == CfaColor::Green { 4 } else { 8 };

    color == offset_color(center_is_green, e.x2, e.y2)
        && e.x1 * e.x1 + e.y1 * e.y1 <= sqr_radius
        && e.x2 * e.x2 + e.y2 * e.y2 <= sqr_radius
        && (e.x1 - e.x2).pow(2) + (e.y1 - e.y2).pow(2) <= max_dist_sqr
}

/// Mosaiced contour stencil orientation estimator.
///
/// For every pixel the stencil total variations are evaluated directly on
/// the mosaic and the orientation with the smallest normalized variation is
/// selected. Samples outside the image are mirrored (whole-sample symmetric),
/// which keeps the CFA pattern intact across the border.
///
/// # Examples
///
/// ```rust
/// use cswl1_demosaic::{CfaPhase, MosaicedContourStencils, Orientation, OrientationEstimator};
///
/// // A vertical ramp has horizontal contours
/// let (width, height) = (8, 8);
/// let mosaic: Vec<f32> = (0..width * height).map(|i| (i / width) as f32 * 0.1).collect();
///
/// let labels = MosaicedContourStencils::default()
///     .estimate(&mosaic, width, height, CfaPhase::RGGB)
///     .unwrap();
/// assert!(labels.iter().all(|&o| o == Orientation::Horizontal));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MosaicedContourStencils {
    radius: f32,
    green: StencilSet,
    red_blue: StencilSet,
}

impl MosaicedContourStencils {
    /// Default neighborhood radius.
    pub const DEFAULT_RADIUS: f32 = 2.0;

    /// Create an estimator with the given neighborhood radius.
    ///
    /// # Errors
    ///
    /// * `Cswl1Error::InvalidParameter` - If the radius is not finite or too
    ///   small for every stencil to contain at least one edge
    pub fn new(radius: f32) -> Result<Self, Cswl1Error> {
        if !(1.0..=16.0).contains(&radius) {
            return Err(Cswl1Error::InvalidParameter(format!(
                "stencil radius must be within [1, 16], got {radius}"
            )));
        }

        let stencils = Self::build(radius);
        if !(stencils.green.is_complete() && stencils.red_blue.is_complete()) {
            return Err(Cswl1Error::InvalidParameter(format!(
                "stencil radius {radius} leaves a stencil without edges"
            )));
        }
        Ok(stencils)
    }

    fn build(radius: f32) -> Self {
        Self {
            radius,
            green: StencilSet::build(radius, true),
            red_blue: StencilSet::build(radius, false),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Default for MosaicedContourStencils {
    fn default() -> Self {
        Self::build(Self::DEFAULT_RADIUS)
    }
}

impl OrientationEstimator for MosaicedContourStencils {
    fn estimate(
        &self,
        mosaic: &[f32],
        width: usize,
        height: usize,
        phase: CfaPhase,
    ) -> Result<Vec<Orientation>, Cswl1Error> {
        let mut labels = try_filled_vec(width * height, Orientation::Horizontal)?;

        for y in 0..height {
            for x in 0..width {
                let set = if phase.color_at(x, y) == CfaColor::Green {
                    &self.green
                } else {
                    &self.red_blue
                };
                let costs = set.costs(mosaic, width, height, x, y);

                let mut best = 0;
                for (k, &cost) in costs.iter().enumerate().skip(1) {
                    if cost < costs[best] {
                        best = k;
                    }
                }
                labels[y * width + x] = Orientation::ALL[best];
            }
        }

        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_for(
        width: usize,
        height: usize,
        f: impl Fn(usize, usize) -> f32,
    ) -> Vec<Orientation> {
        let mosaic: Vec<f32> = (0..width * height).map(|i| f(i % width, i / width)).collect();
        MosaicedContourStencils::default()
            .estimate(&mosaic, width, height, CfaPhase::RGGB)
            .unwrap()
    }

    #[test]
    fn test_orientation_labels() {
        for (k, o) in Orientation::ALL.iter().enumerate() {
            assert_eq!(o.index(), k);
            assert_eq!(Orientation::from_index(k), Some(*o));
        }
        assert_eq!(Orientation::from_index(8), None);
        assert!((Orientation::Vertical.angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_default_stencils_are_complete() {
        let stencils = MosaicedContourStencils::default();
        assert!(stencils.green.is_complete());
        assert!(stencils.red_blue.is_complete());
        // Axial stencils coincide for both center classes
        assert_eq!(stencils.green.base[0], stencils.red_blue.base[0]);
        assert_eq!(stencils.green.base[2], stencils.red_blue.base[2]);
    }

    #[test]
    fn test_stencil_edges_connect_same_colors() {
        let stencils = MosaicedContourStencils::default();
        for (is_green, set) in [(true, &stencils.green), (false, &stencils.red_blue)] {
            for (j, stencil) in set.base.iter().enumerate() {
                let (dx, dy) = BASE_DIRECTIONS[j];
                for e in &stencil.edges {
                    assert_eq!(
                        offset_color(is_green, e.x1, e.y1),
                        offset_color(is_green, e.x2, e.y2)
                    );
                    // Edges are parallel to the stencil direction
                    assert_eq!((e.x2 - e.x1) * dy, (e.y2 - e.y1) * dx);
                }
            }
        }
    }

    #[test]
    fn test_new_rejects_invalid_radius() {
        assert!(MosaicedContourStencils::new(0.5).is_err());
        assert!(MosaicedContourStencils::new(f32::NAN).is_err());
        // Radius 1 has no diagonal green-center edges
        assert!(MosaicedContourStencils::new(1.0).is_err());
        assert!(MosaicedContourStencils::new(2.0).is_ok());
        assert!(MosaicedContourStencils::new(3.0).is_ok());
    }

    #[test]
    fn test_horizontal_contours() {
        let labels = labels_for(10, 10, |_, y| y as f32 * 0.05);
        assert!(labels.iter().all(|&o| o == Orientation::Horizontal));
    }

    #[test]
    fn test_vertical_contours() {
        let labels = labels_for(10, 10, |x, _| x as f32 * 0.05);
        assert!(labels.iter().all(|&o| o == Orientation::Vertical));
    }

    #[test]
    fn test_constant_mosaic_defaults_to_horizontal() {
        let labels = labels_for(6, 6, |_, _| 0.3);
        assert!(labels.iter().all(|&o| o == Orientation::Horizontal));
    }

    #[test]
    fn test_estimate_length() {
        let labels = labels_for(7, 5, |x, y| ((x * 3 + y * 5) % 7) as f32);
        assert_eq!(labels.len(), 35);
    }
}
