use crate::image::ImageView;
use crate::util::{RingCorrError, RingCorrResult};

/// Owned contiguous row-major `f32` buffer.
///
/// Images, kernels and correlation maps all share this representation. Stages
/// never mutate their input grid; they return a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Wraps a row-major buffer of exactly `width * height` values.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> RingCorrResult<Self> {
        let needed = checked_len(width, height)?;
        if data.len() < needed {
            return Err(RingCorrError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(RingCorrError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a zero-filled grid.
    pub fn zeros(width: usize, height: usize) -> RingCorrResult<Self> {
        let len = checked_len(width, height)?;
        Ok(Self {
            data: vec![0.0; len],
            width,
            height,
        })
    }

    /// Builds a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> RingCorrResult<Self>
    where
        F: FnMut(usize, usize) -> f32,
    {
        let len = checked_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub(crate) fn from_parts(data: Vec<f32>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
        }
    }

    /// Returns the grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Returns the row-major values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the grid and returns its buffer.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Returns the value at `(row, col)` if it is within bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Signed lookup that treats out-of-bounds cells as missing.
    pub(crate) fn get_signed(&self, row: isize, col: isize) -> Option<f32> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(row as usize, col as usize)
    }

    /// Returns row `row` as a slice.
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.width;
        self.data.get(start..start + self.width)
    }

    /// Borrows the grid as an `ImageView`.
    pub fn view(&self) -> ImageView<'_, f32> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Applies `f` to every value.
    pub fn map<F: FnMut(f32) -> f32>(&self, f: F) -> Self {
        Self::from_parts(
            self.data.iter().copied().map(f).collect(),
            self.width,
            self.height,
        )
    }

    /// Element-wise sum of two grids of the same shape.
    pub fn add(&self, other: &Grid) -> RingCorrResult<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Element-wise difference `self - other`.
    pub fn sub(&self, other: &Grid) -> RingCorrResult<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    fn zip_with<F: Fn(f32, f32) -> f32>(&self, other: &Grid, f: F) -> RingCorrResult<Self> {
        if self.shape() != other.shape() {
            return Err(RingCorrError::ShapeMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self::from_parts(data, self.width, self.height))
    }

    /// Sum of all values, accumulated in `f64`.
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    /// Location and value of the first maximum in row-major order.
    pub fn argmax(&self) -> Option<(usize, usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, &value) in self.data.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((idx, value)),
            }
        }
        best.map(|(idx, value)| (idx / self.width, idx % self.width, value))
    }
}

fn checked_len(width: usize, height: usize) -> RingCorrResult<usize> {
    if width == 0 || height == 0 {
        return Err(RingCorrError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(RingCorrError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::Grid;
    use crate::util::RingCorrError;

    #[test]
    fn argmax_prefers_first_in_scan_order() {
        let grid = Grid::new(vec![0.0, 2.0, 1.0, 2.0], 2, 2).unwrap();
        assert_eq!(grid.argmax(), Some((0, 1, 2.0)));
    }

    #[test]
    fn add_rejects_shape_mismatch() {
        let a = Grid::zeros(3, 2).unwrap();
        let b = Grid::zeros(2, 3).unwrap();
        assert_eq!(
            a.add(&b).err(),
            Some(RingCorrError::ShapeMismatch {
                expected: (2, 3),
                got: (3, 2),
            })
        );
    }

    #[test]
    fn new_rejects_oversized_buffer() {
        let err = Grid::new(vec![0.0; 5], 2, 2).err().unwrap();
        assert_eq!(err, RingCorrError::InvalidDimensions { width: 2, height: 2 });
    }
}
