//! Optional observation of intermediate pipeline products.

use crate::candidate::peaks::Peak;
use crate::image::Grid;
use crate::refine::RefinedPeak;
use crate::template::CircleKernel;

/// Receives each stage's output as the pipeline runs.
///
/// Every hook defaults to doing nothing, so implementors only override the
/// stages they care about.
pub trait DiagnosticsSink {
    /// Template built for the configured shape.
    fn on_kernel(&mut self, _kernel: &CircleKernel) {}
    /// Image after normalization (not called by radius sweeps).
    fn on_normalized(&mut self, _image: &Grid) {}
    /// Correlation map scaled to a peak of 1. Reported even when no peak
    /// passes the threshold.
    fn on_correlation(&mut self, _corr: &Grid) {}
    /// Integer peaks after suppression, strongest first.
    fn on_peaks(&mut self, _peaks: &[Peak]) {}
    /// Sub-pixel centers in image coordinates.
    fn on_centers(&mut self, _centers: &[RefinedPeak]) {}
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDiagnostics;

impl DiagnosticsSink for NoDiagnostics {}

/// Sink that keeps a copy of every stage output.
#[derive(Clone, Debug, Default)]
pub struct Collected {
    /// Template values.
    pub kernel: Option<Grid>,
    /// Normalized input image.
    pub normalized: Option<Grid>,
    /// Scaled correlation map.
    pub correlation: Option<Grid>,
    /// Integer peaks.
    pub peaks: Vec<Peak>,
    /// Refined centers.
    pub centers: Vec<RefinedPeak>,
}

impl DiagnosticsSink for Collected {
    fn on_kernel(&mut self, kernel: &CircleKernel) {
        self.kernel = Some(kernel.grid().clone());
    }

    fn on_normalized(&mut self, image: &Grid) {
        self.normalized = Some(image.clone());
    }

    fn on_correlation(&mut self, corr: &Grid) {
        self.correlation = Some(corr.clone());
    }

    fn on_peaks(&mut self, peaks: &[Peak]) {
        self.peaks = peaks.to_vec();
    }

    fn on_centers(&mut self, centers: &[RefinedPeak]) {
        self.centers = centers.to_vec();
    }
}
