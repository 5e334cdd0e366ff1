//! Split Bregman driver for contour stencil weighted-L1 demosaicing.

use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::cswl1::bilinear::{BilinearDemosaic, InitialEstimate};
use crate::cswl1::cfa::{copy_known_samples, flatten, CfaPhase};
use crate::cswl1::energy::evaluate_energy;
use crate::cswl1::graph::EdgeWeights;
use crate::cswl1::relaxation::gauss_seidel_sweep;
use crate::cswl1::shrinkage::{shrink, EdgeVariables};
use crate::cswl1::stencils::{MosaicedContourStencils, OrientationEstimator};
use crate::error::Cswl1Error;
use crate::utils::{l2_norm, planar_len, try_filled_vec, validate_buffer_len, validate_dimensions};

/// Parameters of the CSWL1 solver.
///
/// # Examples
///
/// ```rust
/// use cswl1_demosaic::Cswl1Params;
///
/// let params = Cswl1Params::default().with_alpha(2.0).with_max_iterations(50);
/// assert!(params.validate().is_ok());
/// assert!(Cswl1Params::default().with_epsilon(0.0).validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Cswl1Params {
    /// Weight of the chromatic term relative to luma.
    pub alpha: f32,
    /// Floor weight added to every graph edge.
    pub epsilon: f32,
    /// Standard deviation of the Gaussian smoothing the graph weights.
    pub sigma: f32,
    /// Stopping tolerance, relative to the L2 norm of the mosaic.
    pub tolerance: f32,
    /// Maximum number of Bregman iterations.
    pub max_iterations: usize,
    /// Evaluate the energy after every iteration.
    pub report_energy: bool,
}

impl Default for Cswl1Params {
    fn default() -> Self {
        Self {
            alpha: 1.8,
            epsilon: 0.15,
            sigma: 0.6,
            tolerance: 0.001,
            max_iterations: 250,
            report_energy: false,
        }
    }
}

impl Cswl1Params {
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_report_energy(mut self, report_energy: bool) -> Self {
        self.report_energy = report_energy;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// * `Cswl1Error::InvalidParameter` - If `alpha`, `epsilon` or `tolerance`
    ///   is not positive, `sigma` is negative, or any value is not finite
    pub fn validate(&self) -> Result<(), Cswl1Error> {
        let positive = [
            ("alpha", self.alpha),
            ("epsilon", self.epsilon),
            ("tolerance", self.tolerance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Cswl1Error::InvalidParameter(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(Cswl1Error::InvalidParameter(format!(
                "sigma must be non-negative, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

/// How the iteration loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The update norm fell below the tolerance after at least 3 iterations.
    Converged,
    /// The iteration cap was reached first. The estimate is still returned.
    MaxIterReached,
}

/// Outcome of a solver run.
#[derive(Clone, Debug, PartialEq)]
pub struct DemosaicReport {
    pub termination: Termination,
    /// Number of completed Bregman iterations.
    pub iterations: usize,
    /// Update norm returned by the last relaxation sweep (0 if none ran).
    pub final_update_norm: f32,
    /// Tolerance after scaling by the mosaic norm.
    pub scaled_tolerance: f32,
    /// Energy of the initial estimate followed by one value per iteration.
    /// Empty unless `report_energy` is set. A value the evaluator could not
    /// compute is logged and left out.
    pub energies: Vec<f32>,
    pub elapsed: Duration,
}

impl DemosaicReport {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// CSWL1 solver with pluggable orientation estimator and initial estimate.
///
/// # Examples
///
/// ```rust
/// use cswl1_demosaic::{CfaPhase, Cswl1Params, Cswl1Solver, Termination};
///
/// let (width, height) = (8, 8);
/// let mut planes = vec![0.5f32; 3 * width * height];
///
/// let solver = Cswl1Solver::new(Cswl1Params::default()).unwrap();
/// let report = solver.run(&mut planes, width, height, CfaPhase::RGGB).unwrap();
/// assert_eq!(report.termination, Termination::Converged);
/// assert_eq!(report.iterations, 3);
/// ```
#[derive(Clone, Debug)]
pub struct Cswl1Solver<E = MosaicedContourStencils, I = BilinearDemosaic> {
    params: Cswl1Params,
    estimator: E,
    initial: I,
}

impl Cswl1Solver {
    /// Create a solver with the default collaborators.
    ///
    /// # Errors
    ///
    /// * `Cswl1Error::InvalidParameter` - If `params` fails validation
    pub fn new(params: Cswl1Params) -> Result<Self, Cswl1Error> {
        params.validate()?;
        Ok(Self {
            params,
            estimator: MosaicedContourStencils::default(),
            initial: BilinearDemosaic,
        })
    }
}

impl<E, I> Cswl1Solver<E, I> {
    /// Replace the orientation estimator.
    pub fn with_estimator<E2>(self, estimator: E2) -> Cswl1Solver<E2, I> {
        Cswl1Solver {
            params: self.params,
            estimator,
            initial: self.initial,
        }
    }

    /// Replace the initial estimate.
    pub fn with_initial_estimate<I2>(self, initial: I2) -> Cswl1Solver<E, I2> {
        Cswl1Solver {
            params: self.params,
            estimator: self.estimator,
            initial,
        }
    }
}

impl<E, I> Cswl1Solver<E, I>
where
    E: OrientationEstimator,
    I: InitialEstimate,
{
    /// Demosaic planar RGB data in place.
    ///
    /// `planes` holds the R, G and B planes of a `width x height` image. Only
    /// the component matching each pixel's CFA color is read; on success all
    /// three planes hold the reconstruction, and the CFA-known components
    /// are exactly the input samples.
    ///
    /// # Errors
    ///
    /// * `Cswl1Error::ImageTooSmall` - If the image is smaller than 4x4
    /// * `Cswl1Error::DimensionOverflow` - If `3 * width * height` overflows `usize`
    /// * `Cswl1Error::BufferSizeMismatch` - If `planes.len() != 3 * width * height`
    /// * `Cswl1Error::DimensionMismatch` - If the estimator returns the wrong number of labels
    /// * `Cswl1Error::AllocationFailed` - If a working buffer cannot be allocated
    pub fn run(
        &self,
        planes: &mut [f32],
        width: usize,
        height: usize,
        phase: CfaPhase,
    ) -> Result<DemosaicReport, Cswl1Error> {
        validate_dimensions(width, height)?;
        validate_buffer_len(planar_len(width, height)?, planes.len())?;
        let params = &self.params;
        let npix = width * height;
        let start = Instant::now();

        let mosaic = flatten(planes, width, height, phase)?;
        let labels = self.estimator.estimate(&mosaic, width, height, phase)?;
        let graph = EdgeWeights::build(&labels, width, height, params.epsilon, params.sigma)?;

        let tolerance = params.tolerance * l2_norm(&mosaic);
        debug!("Scaled tolerance: {tolerance}");

        self.initial.estimate(&mosaic, width, height, phase, planes);
        let mut vars = EdgeVariables::zeroed(npix)?;
        let mut b = try_filled_vec(npix, 0.0f32)?;

        let mut energies = Vec::new();
        if params.report_energy {
            let energy = evaluate_energy(planes, &mosaic, &graph, phase, params.alpha);
            record_energy(&mut energies, 0, energy);
        }

        let mut termination = Termination::MaxIterReached;
        let mut iterations = 0;
        let mut update_norm = 0.0f32;

        for iter in 1..=params.max_iterations {
            shrink(&mut vars, planes, &graph, params.alpha);
            update_norm =
                gauss_seidel_sweep(planes, &mut b, &vars.dtilde, &mosaic, width, height, phase);
            iterations = iter;
            trace!("Iteration {iter}: update norm {update_norm}");

            if params.report_energy {
                let energy = evaluate_energy(planes, &mosaic, &graph, phase, params.alpha);
                record_energy(&mut energies, iter, energy);
            }

            if update_norm <= tolerance && iter > 2 {
                termination = Termination::Converged;
                info!("Converged in {iter} iterations");
                break;
            }
        }

        if termination == Termination::MaxIterReached && !(update_norm <= tolerance) {
            warn!(
                "Maximum number of iterations ({}) exceeded, update norm {update_norm} > {tolerance}",
                params.max_iterations
            );
        }

        copy_known_samples(planes, &mosaic, width, height, phase);

        Ok(DemosaicReport {
            termination,
            iterations,
            final_update_norm: update_norm,
            scaled_tolerance: tolerance,
            energies,
            elapsed: start.elapsed(),
        })
    }
}

/// Append an energy value to the history.
///
/// The energy is a diagnostic only, so a failed evaluation is logged and the
/// run continues without that entry.
fn record_energy(energies: &mut Vec<f32>, iter: usize, energy: Result<f32, Cswl1Error>) {
    let energy = energy.and_then(|value| {
        energies
            .try_reserve(1)
            .map(|()| value)
            .map_err(|_| Cswl1Error::AllocationFailed { elements: 1 })
    });
    match energy {
        Ok(value) => {
            info!("{:5} {:10.1}", iter, value);
            energies.push(value);
        }
        Err(err) => warn!("Energy of iteration {iter} skipped: {err}"),
    }
}
