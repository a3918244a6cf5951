//! Local-maximum extraction from a correlation map.

use std::cmp::Ordering;

use crate::candidate::nms::nms_2d;
use crate::image::Grid;
use crate::trace::{trace_event, trace_span};
use crate::util::{RingCorrError, RingCorrResult};

/// Integer correlation peak.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// Row of the peak.
    pub row: usize,
    /// Column of the peak.
    pub col: usize,
    /// Correlation score at the peak.
    pub score: f32,
}

fn peak_cmp_desc(a: &Peak, b: &Peak) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.row.cmp(&b.row))
        .then_with(|| a.col.cmp(&b.col))
}

/// Sorts peaks by descending score with row-major tie-breaking.
pub(crate) fn sort_peaks_desc(peaks: &mut [Peak]) {
    peaks.sort_by(peak_cmp_desc);
}

/// Peak extraction parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakConfig {
    /// Chebyshev radius of the local-maximum window and of suppression.
    pub min_distance: usize,
    /// Minimum accepted score (inclusive).
    pub threshold: f32,
    /// Drop peaks closer than `min_distance` to the grid border.
    pub exclude_border: bool,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            min_distance: 1,
            threshold: 0.5,
            exclude_border: false,
        }
    }
}

/// Finds local maxima separated by more than `min_distance` with a score of
/// at least `threshold`.
///
/// Returns `EmptyResult` when nothing qualifies.
pub fn find_peaks(corr: &Grid, min_distance: usize, threshold: f32) -> RingCorrResult<Vec<Peak>> {
    find_peaks_with(
        corr,
        &PeakConfig {
            min_distance,
            threshold,
            exclude_border: false,
        },
    )
}

/// Same as [`find_peaks`] with the full configuration.
pub fn find_peaks_with(corr: &Grid, cfg: &PeakConfig) -> RingCorrResult<Vec<Peak>> {
    if cfg.threshold.is_nan() {
        return Err(RingCorrError::InvalidParameter {
            param: "threshold",
            reason: "threshold must not be NaN",
        });
    }
    let _span = trace_span!("find_peaks", min_distance = cfg.min_distance).entered();

    let peaks = local_maxima(corr, cfg.min_distance, cfg.threshold, cfg.exclude_border);
    trace_event!("peaks", count = peaks.len(), threshold = cfg.threshold);
    if peaks.is_empty() {
        return Err(RingCorrError::EmptyResult {
            threshold: cfg.threshold,
        });
    }
    Ok(peaks)
}

/// Local maxima at or above `threshold`, suppressed to one per neighborhood.
///
/// A cell is a candidate when it equals the maximum of its clipped
/// `(2 d + 1)^2` window. Plateaus yield several candidates; suppression keeps
/// the first in row-major order.
pub(crate) fn local_maxima(
    corr: &Grid,
    min_distance: usize,
    threshold: f32,
    exclude_border: bool,
) -> Vec<Peak> {
    let width = corr.width();
    let height = corr.height();
    let max_win = max_filter(corr, min_distance);
    let border = if exclude_border { min_distance } else { 0 };

    let mut candidates = Vec::new();
    for row in 0..height {
        if row < border || row.saturating_add(border) >= height {
            continue;
        }
        for col in 0..width {
            if col < border || col.saturating_add(border) >= width {
                continue;
            }
            let idx = row * width + col;
            let score = corr.data()[idx];
            if !score.is_finite() || score < threshold {
                continue;
            }
            if score == max_win[idx] {
                candidates.push(Peak { row, col, score });
            }
        }
    }

    nms_2d(&mut candidates, min_distance)
}

/// Separable running maximum over a clipped Chebyshev window.
fn max_filter(grid: &Grid, radius: usize) -> Vec<f32> {
    let width = grid.width();
    let height = grid.height();
    let src = grid.data();

    let mut rows_max = vec![f32::NEG_INFINITY; src.len()];
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let lo = x.saturating_sub(radius);
            let hi = x.saturating_add(radius).min(width - 1);
            rows_max[y * width + x] = row[lo..=hi]
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(f32::NEG_INFINITY, f32::max);
        }
    }

    let mut out = vec![f32::NEG_INFINITY; src.len()];
    for x in 0..width {
        for y in 0..height {
            let lo = y.saturating_sub(radius);
            let hi = y.saturating_add(radius).min(height - 1);
            let mut best = f32::NEG_INFINITY;
            for yy in lo..=hi {
                best = best.max(rows_max[yy * width + x]);
            }
            out[y * width + x] = best;
        }
    }
    out
}
