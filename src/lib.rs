//! RingCorr locates circular particles in grayscale images by correlating a
//! normalized image with a zero-mean ring template.
//!
//! The pipeline has four stages, each usable on its own:
//!
//! 1. [`build_ring_kernel`] / [`build_disk_kernel`] construct the template.
//! 2. [`normalize`] centers and scales the image, emphasizing particle rims.
//! 3. [`correlate`] produces a correlation map scaled to a peak of 1.
//! 4. [`find_peaks`] extracts separated local maxima and [`refine`] moves
//!    them to sub-pixel positions.
//!
//! [`Detector`] chains them with a [`DetectConfig`]. Optional features add
//! row parallelism (`rayon`), a SIMD inner loop (`simd`), an FFT correlator
//! (`fft`), PNG/JPEG loading (`image-io`) and stage spans (`tracing`).

mod trace;

pub mod candidate;
pub mod detect;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod refine;
pub mod synth;
pub mod template;
pub mod util;

pub use candidate::peaks::{find_peaks, find_peaks_with, Peak, PeakConfig};
pub use detect::calibrate::{peak_heights, suggest_threshold, HeightHistogram};
pub use detect::diagnostics::{Collected, DiagnosticsSink, NoDiagnostics};
pub use detect::sweep::{sweep_radius, Plateau, RadiusSweep, SweepPoint};
pub use detect::{DetectConfig, Detection, Detector};
pub use image::morph::Footprint;
pub use image::normalize::{normalize, normalize_with, NormalizeMode};
pub use image::{Grid, ImageView};
pub use kernel::{correlate, correlate_raw, correlate_with, scale_to_peak, Backend};
pub use refine::{refine, refine_with, RefineStrategy, RefinedPeak};
pub use template::{build_disk_kernel, build_ring_kernel, CircleKernel, KernelShape};
pub use util::{RingCorrError, RingCorrResult};

#[cfg(feature = "image-io")]
pub use image::io::{load_channel, save_grid_png, Channel};
