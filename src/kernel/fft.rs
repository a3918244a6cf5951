//! FFT-based correlation (feature-gated).
//!
//! Both image and kernel are zero-padded to `(h + kh - 1) x (w + kw - 1)`,
//! which makes the circular convolution of the spectra equal to the full
//! linear convolution; the same-shape window is then cropped out at
//! `(oy, ox)`. 2D transforms use row-column decomposition.

use crate::image::Grid;
use crate::kernel::{check_fits, CorrelationKernel};
use crate::util::RingCorrResult;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Correlation through spectrum point-multiplication.
pub struct FftCorrelator;

struct Plans {
    row_forward: Arc<dyn Fft<f32>>,
    row_inverse: Arc<dyn Fft<f32>>,
    col_forward: Arc<dyn Fft<f32>>,
    col_inverse: Arc<dyn Fft<f32>>,
}

impl Plans {
    fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            row_forward: planner.plan_fft_forward(cols),
            row_inverse: planner.plan_fft_inverse(cols),
            col_forward: planner.plan_fft_forward(rows),
            col_inverse: planner.plan_fft_inverse(rows),
        }
    }
}

impl CorrelationKernel for FftCorrelator {
    fn correlate_raw(image: &Grid, kernel: &Grid) -> RingCorrResult<Grid> {
        check_fits(image, kernel)?;
        let width = image.width();
        let height = image.height();
        let oy = (kernel.height() - 1) / 2;
        let ox = (kernel.width() - 1) / 2;
        let rows = height + kernel.height() - 1;
        let cols = width + kernel.width() - 1;
        let plans = Plans::new(rows, cols);

        let img_spec = spectrum(image, rows, cols, &plans);
        let ker_spec = spectrum(kernel, rows, cols, &plans);
        let mut product: Vec<Complex<f32>> = img_spec
            .iter()
            .zip(ker_spec.iter())
            .map(|(&a, &b)| a * b)
            .collect();

        transform_2d(
            &mut product,
            rows,
            cols,
            &plans.row_inverse,
            &plans.col_inverse,
        );

        let norm = 1.0 / (rows * cols) as f32;
        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            let start = (y + oy) * cols + ox;
            out.extend(product[start..start + width].iter().map(|c| c.re * norm));
        }
        Ok(Grid::from_parts(out, width, height))
    }
}

fn spectrum(grid: &Grid, rows: usize, cols: usize, plans: &Plans) -> Vec<Complex<f32>> {
    let mut data = vec![Complex::new(0.0f32, 0.0); rows * cols];
    for (y, src) in grid.data().chunks(grid.width()).enumerate() {
        let start = y * cols;
        for (dst, &v) in data[start..start + grid.width()].iter_mut().zip(src) {
            *dst = Complex::new(v, 0.0);
        }
    }
    transform_2d(
        &mut data,
        rows,
        cols,
        &plans.row_forward,
        &plans.col_forward,
    );
    data
}

fn transform_2d(
    data: &mut Vec<Complex<f32>>,
    rows: usize,
    cols: usize,
    row_fft: &Arc<dyn Fft<f32>>,
    col_fft: &Arc<dyn Fft<f32>>,
) {
    // `process` runs over every `cols`-long chunk of the buffer.
    row_fft.process(data);
    let mut transposed = transpose(data, rows, cols);
    col_fft.process(&mut transposed);
    *data = transpose(&transposed, cols, rows);
}

fn transpose(data: &[Complex<f32>], rows: usize, cols: usize) -> Vec<Complex<f32>> {
    let mut out = vec![Complex::new(0.0f32, 0.0); rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::FftCorrelator;
    use crate::image::Grid;
    use crate::kernel::scalar::DirectScalar;
    use crate::kernel::CorrelationKernel;

    #[test]
    fn fft_matches_direct_on_small_grid() {
        let image = Grid::from_fn(9, 7, |r, c| ((r * 5 + c * 3) % 7) as f32 - 3.0).unwrap();
        let kernel = Grid::from_fn(4, 3, |r, c| (r as f32) - (c as f32) * 0.5).unwrap();
        let direct = DirectScalar::correlate_raw(&image, &kernel).unwrap();
        let fft = FftCorrelator::correlate_raw(&image, &kernel).unwrap();
        for (a, b) in direct.data().iter().zip(fft.data().iter()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }
}
