use thiserror::Error;

/// Error type for CSWL1 demosaicing
///
/// Every failure mode of the solver and its collaborators is reported
/// through this type. Non-convergence within the iteration budget is not an
/// error; it is reported through [`crate::Termination::MaxIterReached`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Cswl1Error {
    /// A working buffer could not be allocated
    ///
    /// Raised when the graph, the auxiliary split variables or a temporary
    /// buffer cannot be reserved. No partial result is produced.
    #[error("Failed to allocate a buffer of {elements} elements")]
    AllocationFailed {
        /// Number of elements requested
        elements: usize,
    },

    /// Image is below the minimum supported size
    ///
    /// The relaxation solver and the stencil estimator need at least a
    /// 4x4 image.
    #[error("Image is too small ({width}x{height}), minimum is {min_width}x{min_height}")]
    ImageTooSmall {
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },

    /// `3 * width * height` does not fit in `usize`
    #[error("Image dimensions {width}x{height} overflow the buffer size")]
    DimensionOverflow { width: usize, height: usize },

    /// Planar buffer length does not match `3 * width * height`
    #[error("Buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// A collaborator produced a result of the wrong size
    ///
    /// This error is returned when an orientation estimator yields a label
    /// field whose length differs from the number of pixels.
    #[error("Dimension mismatch: expected {expected} pixels, got {actual}")]
    DimensionMismatch {
        /// Expected number of pixels
        expected: usize,
        /// Actual number of pixels
        actual: usize,
    },

    /// Invalid parameter provided to the solver
    ///
    /// This error is returned when a parameter value is non-finite or
    /// outside the acceptable range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// CFA pattern name could not be parsed
    #[error("Unknown CFA pattern \"{0}\", expected RGGB, GRBG, GBRG or BGGR")]
    UnknownPattern(String),
}
