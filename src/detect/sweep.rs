//! Detection counts as a function of template radius.
//!
//! Too small a radius splits each particle into several peaks, too large a
//! radius merges neighbors. The radius range where the count stays flat is
//! the usual operating point.

use super::diagnostics::NoDiagnostics;
use super::{DetectConfig, Detector};
use crate::image::normalize::normalize_with;
use crate::image::Grid;
use crate::trace::{trace_debug, trace_span};
use crate::util::{RingCorrError, RingCorrResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Count for one radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepPoint {
    /// Template radius in pixels.
    pub radius: f32,
    /// Number of detected centers at this radius.
    pub count: usize,
}

/// Run of consecutive radii with the same count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plateau {
    /// First radius of the run.
    pub start_radius: f32,
    /// Last radius of the run (inclusive).
    pub end_radius: f32,
    /// Detection count shared by every radius in the run.
    pub count: usize,
    /// Number of radii in the run.
    pub len: usize,
}

/// Result of [`sweep_radius`], in input radius order.
#[derive(Clone, Debug, PartialEq)]
pub struct RadiusSweep {
    points: Vec<SweepPoint>,
}

impl RadiusSweep {
    /// Per-radius counts in input order.
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    /// Counts alone, in input order.
    pub fn counts(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.count).collect()
    }

    /// Runs of equal counts spanning at least `min_len` radii.
    pub fn plateaus(&self, min_len: usize) -> Vec<Plateau> {
        let mut out = Vec::new();
        let mut start = 0usize;
        for i in 1..=self.points.len() {
            let run_ends = i == self.points.len() || self.points[i].count != self.points[start].count;
            if !run_ends {
                continue;
            }
            let len = i - start;
            if len >= min_len.max(1) {
                out.push(Plateau {
                    start_radius: self.points[start].radius,
                    end_radius: self.points[i - 1].radius,
                    count: self.points[start].count,
                    len,
                });
            }
            start = i;
        }
        out
    }
}

/// Counts detections for every radius in `radii`, keeping the rest of `base`.
///
/// The image is normalized once. A radius whose map has no peak above the
/// threshold counts as zero; any other error aborts the sweep.
pub fn sweep_radius(image: &Grid, radii: &[f32], base: &DetectConfig) -> RingCorrResult<RadiusSweep> {
    let _span = trace_span!("sweep_radius", radii = radii.len()).entered();
    let normalized = normalize_with(image, base.normalize)?;

    #[cfg(feature = "rayon")]
    let points = radii
        .par_iter()
        .map(|&radius| sweep_point(&normalized, radius, base))
        .collect::<RingCorrResult<Vec<_>>>()?;
    #[cfg(not(feature = "rayon"))]
    let points = radii
        .iter()
        .map(|&radius| sweep_point(&normalized, radius, base))
        .collect::<RingCorrResult<Vec<_>>>()?;

    Ok(RadiusSweep { points })
}

fn sweep_point(normalized: &Grid, radius: f32, base: &DetectConfig) -> RingCorrResult<SweepPoint> {
    let detector = Detector::new(DetectConfig {
        shape: base.shape.with_radius(radius),
        ..*base
    });
    let count = match detector.detect_normalized(normalized, &mut NoDiagnostics) {
        Ok(detection) => detection.centers.len(),
        Err(RingCorrError::EmptyResult { .. }) => 0,
        Err(err) => return Err(err),
    };
    trace_debug!("sweep_point", radius = radius, count = count);
    Ok(SweepPoint { radius, count })
}
