//! End-to-end particle detection.
//!
//! `Detector` chains the four stages: template construction, normalization,
//! correlation, then peak extraction and sub-pixel refinement. It holds only
//! its configuration, so one detector can be shared across images and threads.

use crate::candidate::peaks::{find_peaks_with, Peak, PeakConfig};
use crate::image::normalize::{normalize_with, NormalizeMode};
use crate::image::{Grid, ImageView};
use crate::kernel::{check_size_fits, correlate_with, Backend};
use crate::refine::{refine_with, RefineStrategy, RefinedPeak, DEFAULT_WINDOW};
use crate::template::KernelShape;
use crate::trace::{trace_event, trace_span};
use crate::util::math::ceil_to_usize;
use crate::util::{RingCorrError, RingCorrResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

pub mod calibrate;
pub mod diagnostics;
pub mod sweep;

use diagnostics::{DiagnosticsSink, NoDiagnostics};

/// Detection configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectConfig {
    /// Template shape and radius.
    pub shape: KernelShape,
    /// Image preparation before correlation.
    pub normalize: NormalizeMode,
    /// Peak spacing; `None` uses `ceil(radius)`.
    pub min_distance: Option<usize>,
    /// Minimum normalized correlation score.
    pub threshold: f32,
    /// Drop peaks within `min_distance` of the image border.
    pub exclude_border: bool,
    /// Sub-pixel estimator.
    pub refine: RefineStrategy,
    /// Refinement half-window in pixels.
    pub refine_window: usize,
    /// Correlation backend.
    pub backend: Backend,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            shape: KernelShape::Ring {
                radius: 20.0,
                width: 1.5,
            },
            normalize: NormalizeMode::default(),
            min_distance: None,
            threshold: 0.5,
            exclude_border: false,
            refine: RefineStrategy::default(),
            refine_window: DEFAULT_WINDOW,
            backend: Backend::default(),
        }
    }
}

impl DetectConfig {
    /// Peak spacing actually used.
    pub fn effective_min_distance(&self) -> usize {
        self.min_distance
            .unwrap_or_else(|| ceil_to_usize(self.shape.radius()))
    }

    /// Peak extraction settings derived from this configuration.
    pub fn peak_config(&self) -> PeakConfig {
        PeakConfig {
            min_distance: self.effective_min_distance(),
            threshold: self.threshold,
            exclude_border: self.exclude_border,
        }
    }

    fn validate(&self) -> RingCorrResult<()> {
        if self.refine_window == 0 {
            return Err(RingCorrError::InvalidParameter {
                param: "refine_window",
                reason: "refinement window must be at least 1",
            });
        }
        if self.threshold.is_nan() {
            return Err(RingCorrError::InvalidParameter {
                param: "threshold",
                reason: "threshold must not be NaN",
            });
        }
        Ok(())
    }
}

/// Detected particles.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Sub-pixel particle centers in image coordinates, strongest first.
    pub centers: Vec<RefinedPeak>,
    /// Integer correlation peaks the centers were refined from.
    pub peaks: Vec<Peak>,
}

/// Ring-kernel particle detector.
#[derive(Clone, Debug, Default)]
pub struct Detector {
    config: DetectConfig,
}

impl Detector {
    /// Creates a detector from a configuration.
    pub fn new(config: DetectConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Detects particles in a borrowed single-channel image.
    pub fn detect<T: Copy + Into<f32>>(&self, image: ImageView<'_, T>) -> RingCorrResult<Detection> {
        self.detect_grid(&image.to_grid()?)
    }

    /// Detects particles, reporting intermediate products to `sink`.
    pub fn detect_with<T: Copy + Into<f32>>(
        &self,
        image: ImageView<'_, T>,
        sink: &mut dyn DiagnosticsSink,
    ) -> RingCorrResult<Detection> {
        self.detect_grid_with(&image.to_grid()?, sink)
    }

    /// Detects particles in an owned grid.
    pub fn detect_grid(&self, image: &Grid) -> RingCorrResult<Detection> {
        self.detect_grid_with(image, &mut NoDiagnostics)
    }

    /// Detects particles in an owned grid, reporting to `sink`.
    pub fn detect_grid_with(
        &self,
        image: &Grid,
        sink: &mut dyn DiagnosticsSink,
    ) -> RingCorrResult<Detection> {
        self.config.validate()?;
        let _span = trace_span!(
            "detect",
            radius = self.config.shape.radius(),
            width = image.width(),
            height = image.height()
        )
        .entered();

        let normalized = normalize_with(image, self.config.normalize)?;
        sink.on_normalized(&normalized);
        self.detect_normalized(&normalized, sink)
    }

    /// Runs the stages after normalization. Shared with radius sweeps, which
    /// normalize once per image.
    pub(crate) fn detect_normalized(
        &self,
        normalized: &Grid,
        sink: &mut dyn DiagnosticsSink,
    ) -> RingCorrResult<Detection> {
        check_size_fits(self.config.shape.kernel_size(), normalized)?;
        let kernel = self.config.shape.build()?;
        sink.on_kernel(&kernel);

        let corr = correlate_with(normalized, kernel.grid(), self.config.backend)?;
        sink.on_correlation(&corr);

        let peaks = find_peaks_with(&corr, &self.config.peak_config())?;
        sink.on_peaks(&peaks);

        let offset = kernel.center_offset();
        let centers: Vec<RefinedPeak> = refine_with(
            &corr,
            &peaks,
            self.config.refine_window,
            self.config.refine,
        )?
        .into_iter()
        .map(|p| RefinedPeak {
            row: p.row - offset,
            col: p.col - offset,
            score: p.score,
        })
        .collect();
        sink.on_centers(&centers);

        trace_event!("detected", count = centers.len());
        Ok(Detection { centers, peaks })
    }

    /// Runs one independent pipeline per image.
    #[cfg(not(feature = "rayon"))]
    pub fn detect_batch(&self, images: &[Grid]) -> Vec<RingCorrResult<Detection>> {
        images.iter().map(|img| self.detect_grid(img)).collect()
    }

    /// Runs one independent pipeline per image, in parallel.
    #[cfg(feature = "rayon")]
    pub fn detect_batch(&self, images: &[Grid]) -> Vec<RingCorrResult<Detection>> {
        images.par_iter().map(|img| self.detect_grid(img)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{DetectConfig, Detector};
    use crate::image::Grid;
    use crate::template::KernelShape;
    use crate::util::RingCorrError;

    #[test]
    fn min_distance_defaults_to_ceil_radius() {
        let cfg = DetectConfig {
            shape: KernelShape::Ring {
                radius: 19.5,
                width: 1.5,
            },
            ..DetectConfig::default()
        };
        assert_eq!(cfg.effective_min_distance(), 20);
        let cfg = DetectConfig {
            min_distance: Some(7),
            ..cfg
        };
        assert_eq!(cfg.peak_config().min_distance, 7);
    }

    #[test]
    fn zero_refine_window_is_rejected_before_work() {
        let detector = Detector::new(DetectConfig {
            refine_window: 0,
            ..DetectConfig::default()
        });
        let image = Grid::zeros(8, 8).unwrap();
        assert!(matches!(
            detector.detect_grid(&image),
            Err(RingCorrError::InvalidParameter {
                param: "refine_window",
                ..
            })
        ));
    }
}
