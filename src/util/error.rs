//! Error types for ringcorr.

use thiserror::Error;

/// Result alias for ringcorr operations.
pub type RingCorrResult<T> = std::result::Result<T, RingCorrError>;

/// Errors that can occur when running the detection pipeline.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RingCorrError {
    /// A scalar parameter is out of its valid range.
    #[error("invalid parameter `{param}`: {reason}")]
    InvalidParameter {
        param: &'static str,
        reason: &'static str,
    },
    /// The image has zero variance and cannot be normalized.
    #[error("image has zero variance")]
    EmptyImage,
    /// The kernel does not fit inside the image.
    #[error("kernel of size {kernel} does not fit a {width}x{height} image")]
    KernelTooLarge {
        kernel: usize,
        width: usize,
        height: usize,
    },
    /// No correlation peak reached the threshold.
    #[error("no peaks found at threshold {threshold}")]
    EmptyResult { threshold: f32 },
    /// Width or height is zero or overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer is shorter than the declared dimensions need.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Two grids that must share a shape do not.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// The requested backend needs a cargo feature that is not enabled.
    #[error("feature `{feature}` is not enabled")]
    FeatureDisabled { feature: &'static str },
    /// Image decoding or encoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
