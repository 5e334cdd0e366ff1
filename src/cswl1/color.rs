//! Orthonormal luma/chroma transform and the per-color system inverses.
//!
//! The regularizer measures color differences in the basis
//!
//! ```text
//! Y  = (R + G + B) / sqrt(3)
//! C1 = (R - B) / sqrt(2)
//! C2 = (R - 2G + B) / sqrt(6)
//! ```
//!
//! The Gauss-Seidel update solves `(C^T C + mu e_k e_k^T) u = rhs` at every
//! pixel, where `e_k` selects the channel observed by the CFA. The three
//! matrices only depend on the transform and `mu`, so their inverses are
//! computed once, on first use, by Cramer's rule.

use std::sync::LazyLock;

use crate::cswl1::cfa::CfaColor;
use crate::cswl1::MU;

/// 3x3 matrix, row-major.
pub type Mat3 = [[f32; 3]; 3];

const INV_SQRT3: f64 = 5.773502691896258e-1;
const INV_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;
const INV_SQRT6: f64 = 4.08248290463863e-1;

/// Rows of the transform `C`: luma, chroma1, chroma2.
const TRANSFORM: [[f64; 3]; 3] = [
    [INV_SQRT3, INV_SQRT3, INV_SQRT3],
    [INV_SQRT2, 0.0, -INV_SQRT2],
    [INV_SQRT6, -2.0 * INV_SQRT6, INV_SQRT6],
];

const TRANSFORM_F32: Mat3 = [
    [TRANSFORM[0][0] as f32, TRANSFORM[0][1] as f32, TRANSFORM[0][2] as f32],
    [TRANSFORM[1][0] as f32, TRANSFORM[1][1] as f32, TRANSFORM[1][2] as f32],
    [TRANSFORM[2][0] as f32, TRANSFORM[2][1] as f32, TRANSFORM[2][2] as f32],
];

static SYSTEM_INVERSES: LazyLock<[Mat3; 3]> = LazyLock::new(|| {
    [CfaColor::Red, CfaColor::Green, CfaColor::Blue]
        .map(|color| to_f32(&cramer_inverse(&system_matrix(color, f64::from(MU)))))
});

/// Map an RGB triple (or RGB difference) to `(Y, C1, C2)`.
#[inline]
pub fn to_luma_chroma(rgb: [f32; 3]) -> [f32; 3] {
    mul(&TRANSFORM_F32, rgb)
}

/// Apply the adjoint `C^T`, mapping `(Y, C1, C2)` back to RGB.
#[inline]
pub fn from_luma_chroma(ycc: [f32; 3]) -> [f32; 3] {
    let c = &TRANSFORM_F32;
    [
        c[0][0] * ycc[0] + c[1][0] * ycc[1] + c[2][0] * ycc[2],
        c[0][1] * ycc[0] + c[1][1] * ycc[1] + c[2][1] * ycc[2],
        c[0][2] * ycc[0] + c[1][2] * ycc[1] + c[2][2] * ycc[2],
    ]
}

/// `(C^T C + mu e_k e_k^T)^-1` for the CFA color `k`.
#[inline]
pub fn system_inverse(color: CfaColor) -> &'static Mat3 {
    &SYSTEM_INVERSES[color.index()]
}

/// Matrix-vector product.
#[inline]
pub fn mul(m: &Mat3, v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn system_matrix(color: CfaColor, mu: f64) -> [[f64; 3]; 3] {
    let c = &TRANSFORM;
    let mut m = [[0.0f64; 3]; 3];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = (0..3).map(|k| c[k][i] * c[k][j]).sum();
        }
    }
    let k = color.index();
    m[k][k] += mu;
    m
}

fn cramer_inverse(m: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[2][1] * m[1][2])
        - m[0][1] * (m[1][0] * m[2][2] - m[2][0] * m[1][2])
        + m[0][2] * (m[1][0] * m[2][1] - m[2][0] * m[1][1]);

    [
        [
            (m[1][1] * m[2][2] - m[2][1] * m[1][2]) / det,
            (m[0][2] * m[2][1] - m[2][2] * m[0][1]) / det,
            (m[0][1] * m[1][2] - m[1][1] * m[0][2]) / det,
        ],
        [
            (m[1][2] * m[2][0] - m[2][2] * m[1][0]) / det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
            (m[0][2] * m[1][0] - m[1][2] * m[0][0]) / det,
        ],
        [
            (m[1][0] * m[2][1] - m[2][0] * m[1][1]) / det,
            (m[0][1] * m[2][0] - m[2][1] * m[0][0]) / det,
            (m[0][0] * m[1][1] - m[1][0] * m[0][1]) / det,
        ],
    ]
}

fn to_f32(m: &[[f64; 3]; 3]) -> Mat3 {
    m.map(|row| row.map(|v| v as f32))
}
