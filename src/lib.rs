mod cswl1;
mod error;
mod utils;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use cswl1::bilinear::{bilinear_demosaic, BilinearDemosaic, InitialEstimate};
pub use cswl1::cfa::{copy_known_samples, flatten, CfaColor, CfaPhase};
pub use cswl1::color::{from_luma_chroma, to_luma_chroma};
pub use cswl1::demosaic::{demosaic_planar, Cswl1Demosaic};
pub use cswl1::energy::evaluate_energy;
pub use cswl1::gaussian::GaussianKernel;
pub use cswl1::graph::{
    neighbor_index, opposite, EdgeWeights, NEIGHBOR_DX, NEIGHBOR_DY, NUM_NEIGHBORS,
    ORIENTATION_WEIGHTS,
};
pub use cswl1::relaxation::{active_neighbor_count, gauss_seidel_sweep};
pub use cswl1::shrinkage::{shrink, EdgeVariables, EdgeVectors};
pub use cswl1::solver::{Cswl1Params, Cswl1Solver, DemosaicReport, Termination};
pub use cswl1::stencils::{MosaicedContourStencils, Orientation, OrientationEstimator};
pub use cswl1::{GAMMA1, GAMMA2, MU};
pub use error::Cswl1Error;
pub use utils::{interleaved_to_planar, planar_to_interleaved, MIN_HEIGHT, MIN_WIDTH};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
