//! Sub-pixel refinement of integer correlation peaks.
//!
//! Every strategy maps one integer peak to one refined peak and moves it by
//! at most `window` pixels per axis.

use crate::candidate::peaks::Peak;
use crate::image::Grid;
use crate::trace::trace_span;
use crate::util::{RingCorrError, RingCorrResult};

pub mod centroid;
pub mod quad1d;
pub mod quad2d;

/// Default refinement half-window in pixels.
pub const DEFAULT_WINDOW: usize = 2;

/// Sub-pixel peak location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefinedPeak {
    /// Sub-pixel row.
    pub row: f32,
    /// Sub-pixel column.
    pub col: f32,
    /// Correlation score at the integer peak.
    pub score: f32,
}

/// Sub-pixel estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefineStrategy {
    /// Independent weighted centroid along the row and column through the peak.
    #[default]
    AxisCentroid,
    /// Weighted centroid over the full square window.
    Centroid2d,
    /// Separable three-point parabola fit.
    Parabolic,
    /// Separable three-point Gaussian fit (parabola on log scores).
    Gaussian,
}

/// Refines peaks with the per-axis centroid.
pub fn refine(corr: &Grid, peaks: &[Peak], window: usize) -> RingCorrResult<Vec<RefinedPeak>> {
    refine_with(corr, peaks, window, RefineStrategy::AxisCentroid)
}

/// Refines peaks with an explicit strategy.
pub fn refine_with(
    corr: &Grid,
    peaks: &[Peak],
    window: usize,
    strategy: RefineStrategy,
) -> RingCorrResult<Vec<RefinedPeak>> {
    if window == 0 {
        return Err(RingCorrError::InvalidParameter {
            param: "window",
            reason: "refinement window must be at least 1",
        });
    }
    let _span = trace_span!("refine", strategy = ?strategy, peaks = peaks.len()).entered();

    let refined = peaks
        .iter()
        .map(|peak| {
            let (row, col) = match strategy {
                RefineStrategy::AxisCentroid => {
                    centroid::axis_centroid(corr, peak.row, peak.col, window)
                }
                RefineStrategy::Centroid2d => centroid::centroid_2d(corr, peak.row, peak.col, window),
                RefineStrategy::Parabolic => three_point(corr, peak, quad1d::quad_peak_offset_1d),
                RefineStrategy::Gaussian => three_point(corr, peak, quad1d::gauss_peak_offset_1d),
            };
            RefinedPeak {
                row,
                col,
                score: peak.score,
            }
        })
        .collect();
    Ok(refined)
}

fn three_point<F>(corr: &Grid, peak: &Peak, fit: F) -> (f32, f32)
where
    F: Fn(f32, f32, f32) -> Option<f32>,
{
    let r0 = peak.row as isize;
    let c0 = peak.col as isize;
    // Out-of-bounds samples become NaN, which every fit rejects.
    let mut s = [[f32::NAN; 3]; 3];
    for (ri, dr) in (-1isize..=1).enumerate() {
        for (ci, dc) in (-1isize..=1).enumerate() {
            if let Some(v) = corr.get_signed(r0 + dr, c0 + dc) {
                s[ri][ci] = v;
            }
        }
    }
    quad2d::refine_separable_3x3(peak.row, peak.col, s, fit)
}
