//! Low-level building blocks for custom detection pipelines.
//!
//! These expose the correlation backends, morphology, suppression and the
//! individual sub-pixel estimators. Most users should prefer [`crate::Detector`].

pub use crate::candidate::nms::nms_2d;
pub use crate::image::morph::{edge_emphasis, erode};
pub use crate::kernel::scalar::DirectScalar;
pub use crate::kernel::{correlate_raw_with, CorrelationKernel};
pub use crate::refine::centroid::{axis_centroid, centroid_2d};
pub use crate::refine::quad1d::{gauss_peak_offset_1d, quad_peak_offset_1d};
pub use crate::refine::quad2d::refine_separable_3x3;

#[cfg(feature = "fft")]
pub use crate::kernel::fft::FftCorrelator;
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::DirectRayon;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::DirectSimd;
