//! Circular correlation templates.
//!
//! A template is a square grid of side `K = ceil(2 (R + 0.5))` centered at
//! `c = (K - 1) / 2`. Cells inside the shape get `1 - mean`, the rest `-mean`,
//! so every template sums to zero and the correlation ignores flat brightness.

use crate::image::Grid;
use crate::util::{RingCorrError, RingCorrResult};

/// Shape of the circular template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KernelShape {
    /// Annulus with outer radius `radius` and thickness `width`.
    Ring { radius: f32, width: f32 },
    /// Filled disk of radius `radius`.
    ///
    /// Responds to any bright blob that covers it, so it separates
    /// wrong-sized particles worse than a ring does.
    Disk { radius: f32 },
}

impl KernelShape {
    /// Outer radius of the shape in pixels.
    pub fn radius(&self) -> f32 {
        match *self {
            KernelShape::Ring { radius, .. } | KernelShape::Disk { radius } => radius,
        }
    }

    /// Side length `K = ceil(2 (R + 0.5))` of the template this shape builds.
    ///
    /// Cheap to compute, so callers can reject oversized templates before
    /// allocating them. Non-finite or negative radii give 0.
    pub fn kernel_size(&self) -> usize {
        let side = (2.0 * (self.radius() + 0.5)).ceil();
        if side.is_finite() && side > 0.0 {
            side as usize
        } else {
            0
        }
    }

    /// Same shape with a different outer radius (ring width is kept).
    pub fn with_radius(&self, radius: f32) -> Self {
        match *self {
            KernelShape::Ring { width, .. } => KernelShape::Ring { radius, width },
            KernelShape::Disk { .. } => KernelShape::Disk { radius },
        }
    }

    /// Builds the zero-mean template for this shape.
    pub fn build(&self) -> RingCorrResult<CircleKernel> {
        match *self {
            KernelShape::Ring { radius, width } => build_ring_kernel(radius, width),
            KernelShape::Disk { radius } => build_disk_kernel(radius),
        }
    }
}

/// Zero-mean circular template.
#[derive(Clone, Debug)]
pub struct CircleKernel {
    grid: Grid,
    shape: KernelShape,
    half_extent: f32,
}

impl CircleKernel {
    /// Template values, `size x size`.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Side length `K` of the template.
    pub fn size(&self) -> usize {
        self.grid.width()
    }

    /// Shape the template was built from.
    pub fn shape(&self) -> KernelShape {
        self.shape
    }

    /// Template center `(K - 1) / 2`; a half-integer when `K` is even.
    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// Distance between the true center and the integer anchor used by the
    /// correlator (0 for odd `K`, 0.5 for even `K`).
    ///
    /// Correlation index `i` corresponds to image coordinate
    /// `i - center_offset()`.
    pub fn center_offset(&self) -> f32 {
        self.half_extent - ((self.size() - 1) / 2) as f32
    }
}

/// Builds a ring template with outer radius `radius` and thickness `width`.
///
/// Cell `(i, j)` is on the ring when
/// `(R - w)^2 < (i - c)^2 + (j - c)^2 < R^2`.
pub fn build_ring_kernel(radius: f32, width: f32) -> RingCorrResult<CircleKernel> {
    validate_radius(radius)?;
    if !width.is_finite() || width <= 0.0 {
        return Err(RingCorrError::InvalidParameter {
            param: "width",
            reason: "ring width must be positive",
        });
    }
    if width > radius {
        return Err(RingCorrError::InvalidParameter {
            param: "width",
            reason: "ring width must not exceed the radius",
        });
    }
    let outer_sq = radius * radius;
    let inner = radius - width;
    let inner_sq = inner * inner;
    build_membership(KernelShape::Ring { radius, width }, |d_sq| {
        d_sq < outer_sq && d_sq > inner_sq
    })
}

/// Builds a filled disk template, membership `(i - c)^2 + (j - c)^2 < R^2`.
pub fn build_disk_kernel(radius: f32) -> RingCorrResult<CircleKernel> {
    validate_radius(radius)?;
    let outer_sq = radius * radius;
    build_membership(KernelShape::Disk { radius }, |d_sq| d_sq < outer_sq)
}

fn validate_radius(radius: f32) -> RingCorrResult<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(RingCorrError::InvalidParameter {
            param: "radius",
            reason: "radius must be positive and finite",
        });
    }
    Ok(())
}

fn build_membership<F>(shape: KernelShape, inside: F) -> RingCorrResult<CircleKernel>
where
    F: Fn(f32) -> bool,
{
    let size = shape.kernel_size();
    let center = (size as f32 - 1.0) / 2.0;

    let membership = Grid::from_fn(size, size, |i, j| {
        let di = i as f32 - center;
        let dj = j as f32 - center;
        if inside(di * di + dj * dj) {
            1.0
        } else {
            0.0
        }
    })?;

    let count = membership.sum();
    let total = (size * size) as f64;
    if count == 0.0 || count == total {
        return Err(RingCorrError::InvalidParameter {
            param: "radius",
            reason: "template covers no pixels or every pixel",
        });
    }

    let mean = (count / total) as f32;
    Ok(CircleKernel {
        grid: membership.map(|v| v - mean),
        shape,
        half_extent: center,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_disk_kernel, build_ring_kernel, KernelShape};
    use crate::util::RingCorrError;

    #[test]
    fn ring_size_follows_radius() {
        assert_eq!(build_ring_kernel(20.0, 1.5).unwrap().size(), 41);
        assert_eq!(build_ring_kernel(19.5, 1.5).unwrap().size(), 40);
        assert_eq!(build_ring_kernel(2.0, 1.0).unwrap().size(), 5);
    }

    #[test]
    fn center_offset_is_half_for_even_sizes() {
        assert_eq!(build_ring_kernel(20.0, 1.5).unwrap().center_offset(), 0.0);
        assert_eq!(build_ring_kernel(19.5, 1.5).unwrap().center_offset(), 0.5);
    }

    #[test]
    fn ring_excludes_center_disk_includes_it() {
        let ring = build_ring_kernel(5.0, 1.5).unwrap();
        let disk = build_disk_kernel(5.0).unwrap();
        let c = 5;
        assert!(ring.grid().get(c, c).unwrap() < 0.0);
        assert!(disk.grid().get(c, c).unwrap() > 0.0);
        assert!(ring.grid().get(c, c + 4).unwrap() > 0.0);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert_eq!(
            build_ring_kernel(0.0, 1.0).err(),
            Some(RingCorrError::InvalidParameter {
                param: "radius",
                reason: "radius must be positive and finite",
            })
        );
        assert!(build_ring_kernel(3.0, 4.0).is_err());
        assert!(build_ring_kernel(3.0, 0.0).is_err());
        assert!(build_ring_kernel(f32::NAN, 1.0).is_err());
        assert!(build_disk_kernel(-2.0).is_err());
    }

    #[test]
    fn degenerate_ring_is_rejected() {
        // K = 3 and no cell lies strictly between radii 0 and 1.
        assert!(build_ring_kernel(1.0, 1.0).is_err());
    }

    #[test]
    fn shape_builds_matching_kernel() {
        let shape = KernelShape::Ring {
            radius: 10.0,
            width: 2.0,
        };
        let kernel = shape.build().unwrap();
        assert_eq!(kernel.shape(), shape);
        assert_eq!(shape.with_radius(12.0).radius(), 12.0);
        assert_eq!(kernel.half_extent(), 10.0);
        assert_eq!(shape.kernel_size(), kernel.size());
        assert_eq!(KernelShape::Disk { radius: 19.5 }.kernel_size(), 40);
        assert_eq!(KernelShape::Disk { radius: f32::NAN }.kernel_size(), 0);
    }
}
