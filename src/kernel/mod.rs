//! Correlation backends.
//!
//! Every backend computes the same linear convolution with zero padding:
//!
//! `out(y, x) = sum_i sum_j k(i, j) * img(y + oy - i, x + ox - j)`
//!
//! with `oy = (kh - 1) / 2` and `ox = (kw - 1) / 2` (integer division), so the
//! output has the shape of the input image. The direct backends evaluate it
//! as a dot product of the flipped kernel with a zero-padded copy of the
//! image.

use crate::image::Grid;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{max_abs, max_finite};
use crate::util::{RingCorrError, RingCorrResult};

#[cfg(feature = "fft")]
pub mod fft;
#[cfg(feature = "rayon")]
pub mod rayon;
pub mod scalar;
#[cfg(feature = "simd")]
pub mod simd;

// Direct backend alias: use SIMD when available.
#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::DirectScalar as Direct;
#[cfg(feature = "simd")]
use crate::kernel::simd::DirectSimd as Direct;

/// Backend trait for raw (unnormalized) correlation.
pub trait CorrelationKernel {
    /// Correlates `image` with `kernel`, returning a map of the image's shape.
    fn correlate_raw(image: &Grid, kernel: &Grid) -> RingCorrResult<Grid>;
}

/// Correlation backend selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// Direct evaluation (SIMD inner loop with the `simd` feature).
    #[default]
    Direct,
    /// Row-parallel direct evaluation (requires the `rayon` feature).
    Parallel,
    /// FFT point-multiplication (requires the `fft` feature).
    Fft,
}

/// Raw correlation with the direct backend. Linear in `image`.
pub fn correlate_raw(image: &Grid, kernel: &Grid) -> RingCorrResult<Grid> {
    correlate_raw_with(image, kernel, Backend::Direct)
}

/// Raw correlation with an explicit backend.
pub fn correlate_raw_with(image: &Grid, kernel: &Grid, backend: Backend) -> RingCorrResult<Grid> {
    let _span = trace_span!(
        "correlate",
        backend = ?backend,
        width = image.width(),
        height = image.height(),
        kernel = kernel.width()
    )
    .entered();
    match backend {
        Backend::Direct => <Direct as CorrelationKernel>::correlate_raw(image, kernel),
        Backend::Parallel => correlate_parallel(image, kernel),
        Backend::Fft => correlate_fft(image, kernel),
    }
}

#[cfg(feature = "rayon")]
fn correlate_parallel(image: &Grid, kernel: &Grid) -> RingCorrResult<Grid> {
    <crate::kernel::rayon::DirectRayon as CorrelationKernel>::correlate_raw(image, kernel)
}

#[cfg(not(feature = "rayon"))]
fn correlate_parallel(_image: &Grid, _kernel: &Grid) -> RingCorrResult<Grid> {
    Err(RingCorrError::FeatureDisabled { feature: "rayon" })
}

#[cfg(feature = "fft")]
fn correlate_fft(image: &Grid, kernel: &Grid) -> RingCorrResult<Grid> {
    <crate::kernel::fft::FftCorrelator as CorrelationKernel>::correlate_raw(image, kernel)
}

#[cfg(not(feature = "fft"))]
fn correlate_fft(_image: &Grid, _kernel: &Grid) -> RingCorrResult<Grid> {
    Err(RingCorrError::FeatureDisabled { feature: "fft" })
}

/// Correlation divided by its maximum, so the strongest response is 1.
pub fn correlate(image: &Grid, kernel: &Grid) -> RingCorrResult<Grid> {
    correlate_with(image, kernel, Backend::Direct)
}

/// Normalized correlation with an explicit backend.
pub fn correlate_with(image: &Grid, kernel: &Grid, backend: Backend) -> RingCorrResult<Grid> {
    let raw = correlate_raw_with(image, kernel, backend)?;
    Ok(scale_to_peak(raw))
}

/// Divides a map by its maximum.
///
/// When no value is positive the map is divided by its largest magnitude
/// instead; an all-zero map is returned unchanged.
pub fn scale_to_peak(map: Grid) -> Grid {
    let peak = max_finite(map.data()).unwrap_or(0.0);
    let scale = if peak > 0.0 {
        peak
    } else {
        max_abs(map.data())
    };
    trace_event!("correlation_peak", peak = peak, scale = scale);
    if scale <= 0.0 {
        return map;
    }
    let inv = 1.0 / scale;
    map.map(|v| v * inv)
}

pub(crate) fn check_fits(image: &Grid, kernel: &Grid) -> RingCorrResult<()> {
    if kernel.width() > image.width() || kernel.height() > image.height() {
        return Err(RingCorrError::KernelTooLarge {
            kernel: kernel.width().max(kernel.height()),
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

/// Rejects a square template of side `size` that does not fit `image`.
pub(crate) fn check_size_fits(size: usize, image: &Grid) -> RingCorrResult<()> {
    if size > image.width() || size > image.height() {
        return Err(RingCorrError::KernelTooLarge {
            kernel: size,
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

/// Zero-padded image plus the flipped kernel, ready for dot-product scans.
pub(crate) struct Prepared {
    pub(crate) padded: Vec<f32>,
    pub(crate) padded_width: usize,
    pub(crate) flipped: Vec<f32>,
    pub(crate) kernel_width: usize,
    pub(crate) kernel_height: usize,
    pub(crate) out_width: usize,
    pub(crate) out_height: usize,
}

impl Prepared {
    pub(crate) fn new(image: &Grid, kernel: &Grid) -> RingCorrResult<Self> {
        check_fits(image, kernel)?;
        let kw = kernel.width();
        let kh = kernel.height();
        // Leading pad puts image(y + oy - i) under flipped tap (kh - 1 - i).
        let pad_left = kw - 1 - (kw - 1) / 2;
        let pad_top = kh - 1 - (kh - 1) / 2;
        let padded_width = image.width() + kw - 1;
        let padded_height = image.height() + kh - 1;

        let mut padded = vec![0.0f32; padded_width * padded_height];
        for y in 0..image.height() {
            let src = image.row(y).ok_or(RingCorrError::InvalidDimensions {
                width: image.width(),
                height: image.height(),
            })?;
            let start = (y + pad_top) * padded_width + pad_left;
            padded[start..start + image.width()].copy_from_slice(src);
        }

        let flipped: Vec<f32> = kernel.data().iter().rev().copied().collect();

        Ok(Self {
            padded,
            padded_width,
            flipped,
            kernel_width: kw,
            kernel_height: kh,
            out_width: image.width(),
            out_height: image.height(),
        })
    }

    /// Padded row slice starting at output column `x` for kernel row `ky`.
    #[inline]
    pub(crate) fn window_row(&self, y: usize, ky: usize, x: usize) -> &[f32] {
        let start = (y + ky) * self.padded_width + x;
        &self.padded[start..start + self.kernel_width]
    }

    #[inline]
    pub(crate) fn kernel_row(&self, ky: usize) -> &[f32] {
        let start = ky * self.kernel_width;
        &self.flipped[start..start + self.kernel_width]
    }
}
