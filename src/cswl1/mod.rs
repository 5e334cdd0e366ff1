pub mod bilinear;
pub mod cfa;
pub mod color;
pub mod demosaic;
pub mod energy;
pub mod gaussian;
pub mod graph;
pub mod relaxation;
pub mod shrinkage;
pub mod solver;
pub mod stencils;

/// Penalty weight enforcing `d = C(u_m - u_n)`.
pub const GAMMA1: f32 = 4.0;
/// Penalty weight enforcing the observation constraint.
pub const GAMMA2: f32 = 256.0;
/// `mu = gamma_2 / (2 * 8 * gamma_1)`
pub const MU: f32 = GAMMA2 / (2.0 * graph::NUM_NEIGHBORS as f32 * GAMMA1);
