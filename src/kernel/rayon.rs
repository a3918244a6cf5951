//! Rayon-parallel correlation (feature-gated).
//!
//! Output rows are independent and only read the shared padded image, so
//! rows are distributed across threads with no synchronization.

use crate::image::Grid;
use crate::kernel::{CorrelationKernel, Prepared};
use crate::util::RingCorrResult;
use rayon::prelude::*;

/// Row-parallel direct correlation.
pub struct DirectRayon;

impl CorrelationKernel for DirectRayon {
    fn correlate_raw(image: &Grid, kernel: &Grid) -> RingCorrResult<Grid> {
        let prep = Prepared::new(image, kernel)?;
        let mut out = vec![0.0f32; prep.out_width * prep.out_height];
        out.par_chunks_mut(prep.out_width)
            .enumerate()
            .for_each(|(y, out_row)| fill_row(&prep, y, out_row));
        Ok(Grid::from_parts(out, prep.out_width, prep.out_height))
    }
}

#[cfg(not(feature = "simd"))]
fn fill_row(prep: &Prepared, y: usize, out_row: &mut [f32]) {
    crate::kernel::scalar::DirectScalar::fill_row(prep, y, out_row);
}

#[cfg(feature = "simd")]
fn fill_row(prep: &Prepared, y: usize, out_row: &mut [f32]) {
    crate::kernel::simd::DirectSimd::fill_row(prep, y, out_row);
}
