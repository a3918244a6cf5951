//! Synthetic particle images.
//!
//! Used by tests, benchmarks and the CLI demo to produce inputs with known
//! particle centers.

use crate::image::Grid;
use crate::util::{RingCorrError, RingCorrResult};

pub mod photoelastic;

/// Binary disk mask: 1 where the distance to `center = (row, col)` is at
/// most `radius`, 0 elsewhere.
pub fn circular_mask(
    height: usize,
    width: usize,
    center: (f32, f32),
    radius: f32,
) -> RingCorrResult<Grid> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(RingCorrError::InvalidParameter {
            param: "radius",
            reason: "mask radius must be finite and non-negative",
        });
    }
    let r2 = radius * radius;
    Grid::from_fn(width, height, |row, col| {
        let dy = row as f32 - center.0;
        let dx = col as f32 - center.1;
        if dy * dy + dx * dx <= r2 {
            1.0
        } else {
            0.0
        }
    })
}

/// Uniform disk to render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disk {
    /// Center row.
    pub row: f32,
    /// Center column.
    pub col: f32,
    /// Radius in pixels; the boundary is inclusive.
    pub radius: f32,
    /// Intensity added inside the disk.
    pub value: f32,
}

impl Disk {
    /// Disk of unit intensity.
    pub fn new(row: f32, col: f32, radius: f32) -> Self {
        Self {
            row,
            col,
            radius,
            value: 1.0,
        }
    }

    /// Same disk with a different intensity.
    pub fn with_value(self, value: f32) -> Self {
        Self { value, ..self }
    }
}

/// Sums the disks onto a zero background. Overlaps add up.
pub fn render_disks(height: usize, width: usize, disks: &[Disk]) -> RingCorrResult<Grid> {
    let mut data = Grid::zeros(width, height)?.into_data();
    for disk in disks {
        if !disk.radius.is_finite() || disk.radius < 0.0 {
            return Err(RingCorrError::InvalidParameter {
                param: "radius",
                reason: "disk radius must be finite and non-negative",
            });
        }
        let r2 = disk.radius * disk.radius;
        // Only touch the bounding box of the disk.
        let r0 = (disk.row - disk.radius).floor().max(0.0) as usize;
        let c0 = (disk.col - disk.radius).floor().max(0.0) as usize;
        let r1 = ((disk.row + disk.radius).ceil().max(-1.0) + 1.0) as usize;
        let c1 = ((disk.col + disk.radius).ceil().max(-1.0) + 1.0) as usize;
        for row in r0..r1.min(height) {
            let dy = row as f32 - disk.row;
            for col in c0..c1.min(width) {
                let dx = col as f32 - disk.col;
                if dy * dy + dx * dx <= r2 {
                    data[row * width + col] += disk.value;
                }
            }
        }
    }
    Grid::new(data, width, height)
}
