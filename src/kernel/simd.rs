//! SIMD-accelerated correlation using the `wide` crate.
//!
//! The inner loop over one kernel row is vectorized to process 8 taps at a
//! time using `f32x8`; the tail is handled by scalar code.

use crate::image::Grid;
use crate::kernel::{CorrelationKernel, Prepared};
use crate::util::RingCorrResult;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Horizontal sum of f32x8.
#[inline]
fn hsum(v: f32x8) -> f32 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3] + arr[4] + arr[5] + arr[6] + arr[7]
}

/// Direct correlation with a vectorized tap loop.
pub struct DirectSimd;

impl DirectSimd {
    pub(crate) fn fill_row(prep: &Prepared, y: usize, out_row: &mut [f32]) {
        let kw = prep.kernel_width;
        let simd_end = kw / LANES * LANES;

        for (x, out) in out_row.iter_mut().enumerate() {
            let mut acc_vec = f32x8::ZERO;
            let mut acc_s = 0.0f32;

            for ky in 0..prep.kernel_height {
                let taps = prep.kernel_row(ky);
                let window = prep.window_row(y, ky, x);

                let mut tx = 0;
                while tx < simd_end {
                    acc_vec += load_f32x8(&taps[tx..]) * load_f32x8(&window[tx..]);
                    tx += LANES;
                }
                while tx < kw {
                    acc_s += taps[tx] * window[tx];
                    tx += 1;
                }
            }

            *out = hsum(acc_vec) + acc_s;
        }
    }
}

impl CorrelationKernel for DirectSimd {
    fn correlate_raw(image: &Grid, kernel: &Grid) -> RingCorrResult<Grid> {
        let prep = Prepared::new(image, kernel)?;
        let mut out = vec![0.0f32; prep.out_width * prep.out_height];
        for (y, out_row) in out.chunks_mut(prep.out_width).enumerate() {
            Self::fill_row(&prep, y, out_row);
        }
        Ok(Grid::from_parts(out, prep.out_width, prep.out_height))
    }
}
