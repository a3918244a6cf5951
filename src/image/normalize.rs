//! Image normalization ahead of correlation.
//!
//! The normalized image has zero mean and a maximum absolute value of one, so
//! correlation scores do not depend on exposure or bit depth.

use crate::image::morph::{edge_emphasis, Footprint};
use crate::image::Grid;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{max_abs, mean};
use crate::util::{RingCorrError, RingCorrResult};

const MIN_SPREAD: f32 = 1e-12;

/// How the image is prepared before normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Normalize the raw intensities.
    Plain,
    /// Normalize `image - erode(image)`, widening particle rims.
    EdgeEmphasis(Footprint),
}

impl Default for NormalizeMode {
    fn default() -> Self {
        NormalizeMode::EdgeEmphasis(Footprint::Cross)
    }
}

/// Subtracts the mean and divides by the resulting maximum absolute value.
///
/// Returns `EmptyImage` for constant images.
pub fn normalize(image: &Grid) -> RingCorrResult<Grid> {
    let mu = mean(image.data()) as f32;
    let centered = image.map(|v| v - mu);
    let spread = max_abs(centered.data());
    if spread <= MIN_SPREAD {
        return Err(RingCorrError::EmptyImage);
    }
    let inv = 1.0 / spread;
    Ok(centered.map(|v| v * inv))
}

/// Normalizes `image` after the preparation step selected by `mode`.
pub fn normalize_with(image: &Grid, mode: NormalizeMode) -> RingCorrResult<Grid> {
    let _span = trace_span!("normalize", mode = ?mode).entered();
    let out = match mode {
        NormalizeMode::Plain => normalize(image)?,
        NormalizeMode::EdgeEmphasis(footprint) => normalize(&edge_emphasis(image, footprint))?,
    };
    trace_event!("normalized", width = out.width(), height = out.height());
    Ok(out)
}
