use std::fmt;
use std::str::FromStr;

use crate::error::Cswl1Error;
use crate::utils::try_filled_vec;

/// Color channel sampled at a CFA site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CfaColor {
    /// Red channel.
    Red = 0,
    /// Green channel.
    Green = 1,
    /// Blue channel.
    Blue = 2,
}

impl CfaColor {
    /// Plane index of this color in planar RGB data.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CfaColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("R"),
            Self::Green => f.write_str("G"),
            Self::Blue => f.write_str("B"),
        }
    }
}

/// Phase of a 2x2 Bayer pattern.
///
/// `(red_x, red_y)` is the position of the red sample inside the upper-left
/// 2x2 tile. The four combinations give the four canonical patterns:
///
/// ```text
/// RGGB (0,0)   GRBG (1,0)   GBRG (0,1)   BGGR (1,1)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct CfaPhase {
    red_x: usize,
    red_y: usize,
}

impl CfaPhase {
    /// Red at (0,0).
    pub const RGGB: Self = Self::new(0, 0);
    /// Red at (1,0).
    pub const GRBG: Self = Self::new(1, 0);
    /// Red at (0,1).
    pub const GBRG: Self = Self::new(0, 1);
    /// Red at (1,1).
    pub const BGGR: Self = Self::new(1, 1);

    /// Create a phase from the red sample position. Coordinates are taken modulo 2.
    pub const fn new(red_x: usize, red_y: usize) -> Self {
        Self {
            red_x: red_x & 1,
            red_y: red_y & 1,
        }
    }

    /// Parity of `x + y` at green sites.
    #[inline]
    const fn green_parity(&self) -> usize {
        1 - ((self.red_x + self.red_y) & 1)
    }

    /// Return the color sampled at pixel `(x, y)`.
    #[inline]
    pub const fn color_at(&self, x: usize, y: usize) -> CfaColor {
        if (x + y) & 1 == self.green_parity() {
            CfaColor::Green
        } else if y & 1 == self.red_y {
            CfaColor::Red
        } else {
            CfaColor::Blue
        }
    }

    /// Returns `true` if the row `y` carries red samples.
    #[inline]
    pub const fn is_red_row(&self, y: usize) -> bool {
        y & 1 == self.red_y
    }

    /// Canonical four-letter name of the pattern.
    pub const fn name(&self) -> &'static str {
        match (self.red_x, self.red_y) {
            (0, 0) => "RGGB",
            (1, 0) => "GRBG",
            (0, _) => "GBRG",
            _ => "BGGR",
        }
    }
}

impl fmt::Display for CfaPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CfaPhase {
    type Err = Cswl1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RGGB" => Ok(Self::RGGB),
            "GRBG" => Ok(Self::GRBG),
            "GBRG" => Ok(Self::GBRG),
            "BGGR" => Ok(Self::BGGR),
            _ => Err(Cswl1Error::UnknownPattern(s.to_string())),
        }
    }
}

/// Flatten planar RGB data to a single-channel mosaic.
///
/// Each pixel keeps only the component its CFA color samples.
///
/// - `planes`: `[R plane, G plane, B plane]`, length = `3 * width * height`
pub fn flatten(
    planes: &[f32],
    width: usize,
    height: usize,
    phase: CfaPhase,
) -> Result<Vec<f32>, Cswl1Error> {
    let npix = width * height;
    let mut mosaic = try_filled_vec(npix, 0.0f32)?;

    for y in 0..height {
        for x in 0..width {
            let m = y * width + x;
            mosaic[m] = planes[phase.color_at(x, y).index() * npix + m];
        }
    }

    Ok(mosaic)
}

/// Overwrite every CFA-known component of `planes` with its mosaic sample.
///
/// After this call `planes[color(x,y)][m] == mosaic[m]` holds bit for bit.
pub fn copy_known_samples(
    planes: &mut [f32],
    mosaic: &[f32],
    width: usize,
    height: usize,
    phase: CfaPhase,
) {
    let npix = width * height;

    for y in 0..height {
        for x in 0..width {
            let m = y * width + x;
            planes[phase.color_at(x, y).index() * npix + m] = mosaic[m];
        }
    }
}
