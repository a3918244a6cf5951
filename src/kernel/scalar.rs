//! Scalar reference correlation.

use crate::image::Grid;
use crate::kernel::{CorrelationKernel, Prepared};
use crate::util::RingCorrResult;

/// Direct correlation, one output cell at a time.
pub struct DirectScalar;

impl DirectScalar {
    /// Fills one output row. Shared with the row-parallel backend.
    pub(crate) fn fill_row(prep: &Prepared, y: usize, out_row: &mut [f32]) {
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for ky in 0..prep.kernel_height {
                let taps = prep.kernel_row(ky);
                let window = prep.window_row(y, ky, x);
                acc += taps
                    .iter()
                    .zip(window.iter())
                    .map(|(&k, &v)| k * v)
                    .sum::<f32>();
            }
            *out = acc;
        }
    }
}

impl CorrelationKernel for DirectScalar {
    fn correlate_raw(image: &Grid, kernel: &Grid) -> RingCorrResult<Grid> {
        let prep = Prepared::new(image, kernel)?;
        let mut out = vec![0.0f32; prep.out_width * prep.out_height];
        for (y, out_row) in out.chunks_mut(prep.out_width).enumerate() {
            Self::fill_row(&prep, y, out_row);
        }
        Ok(Grid::from_parts(out, prep.out_width, prep.out_height))
    }
}
