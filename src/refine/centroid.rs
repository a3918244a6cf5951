//! Intensity-weighted centroids around an integer peak.
//!
//! Weights are the correlation values clamped at zero, so the centroid is a
//! convex combination of window positions and can never leave the window.

use crate::image::Grid;

/// Per-axis centroid: the row estimate uses the column through the peak, the
/// column estimate the row through the peak.
pub fn axis_centroid(corr: &Grid, row: usize, col: usize, window: usize) -> (f32, f32) {
    let w = window as isize;
    let r0 = row as isize;
    let c0 = col as isize;

    let mut sum_r = 0.0f64;
    let mut wsum_r = 0.0f64;
    let mut sum_c = 0.0f64;
    let mut wsum_c = 0.0f64;
    for k in -w..=w {
        if let Some(v) = corr.get_signed(r0 + k, c0) {
            let weight = clamp_weight(v);
            sum_r += (r0 + k) as f64 * weight;
            wsum_r += weight;
        }
        if let Some(v) = corr.get_signed(r0, c0 + k) {
            let weight = clamp_weight(v);
            sum_c += (c0 + k) as f64 * weight;
            wsum_c += weight;
        }
    }

    (
        weighted_or(sum_r, wsum_r, row),
        weighted_or(sum_c, wsum_c, col),
    )
}

/// Joint centroid over the full `(2w + 1)^2` window.
pub fn centroid_2d(corr: &Grid, row: usize, col: usize, window: usize) -> (f32, f32) {
    let w = window as isize;
    let r0 = row as isize;
    let c0 = col as isize;

    let mut sum_r = 0.0f64;
    let mut sum_c = 0.0f64;
    let mut wsum = 0.0f64;
    for dr in -w..=w {
        for dc in -w..=w {
            if let Some(v) = corr.get_signed(r0 + dr, c0 + dc) {
                let weight = clamp_weight(v);
                sum_r += (r0 + dr) as f64 * weight;
                sum_c += (c0 + dc) as f64 * weight;
                wsum += weight;
            }
        }
    }

    (
        weighted_or(sum_r, wsum, row),
        weighted_or(sum_c, wsum, col),
    )
}

fn clamp_weight(v: f32) -> f64 {
    if v.is_finite() && v > 0.0 {
        v as f64
    } else {
        0.0
    }
}

fn weighted_or(sum: f64, wsum: f64, fallback: usize) -> f32 {
    if wsum > 0.0 {
        (sum / wsum) as f32
    } else {
        fallback as f32
    }
}
