//! Grayscale erosion and the edge-emphasis filter built on it.
//!
//! `edge_emphasis(img) = img - erode(img)` keeps a rim a few pixels wide on
//! the bright side of every intensity step, which is what the ring kernel is
//! tuned to pick up.

use crate::image::Grid;

/// Structuring element for grayscale erosion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Footprint {
    /// 4-connected cross of radius 1.
    #[default]
    Cross,
    /// Square of half-size `r` (side `2r + 1`).
    Square(usize),
    /// Disk of radius `r`, membership `dx^2 + dy^2 <= r^2`.
    Disk(usize),
}

impl Footprint {
    /// Returns the `(drow, dcol)` offsets covered by the footprint.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        match *self {
            Footprint::Cross => vec![(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)],
            Footprint::Square(r) => {
                let r = r as isize;
                let mut out = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
                for dy in -r..=r {
                    for dx in -r..=r {
                        out.push((dy, dx));
                    }
                }
                out
            }
            Footprint::Disk(r) => {
                let r = r as isize;
                let mut out = Vec::new();
                for dy in -r..=r {
                    for dx in -r..=r {
                        if dx * dx + dy * dy <= r * r {
                            out.push((dy, dx));
                        }
                    }
                }
                out
            }
        }
    }
}

/// Grayscale erosion: each output cell is the minimum over the footprint.
///
/// Taps outside the grid are ignored, so borders are not darkened.
pub fn erode(image: &Grid, footprint: Footprint) -> Grid {
    let offsets = footprint.offsets();
    let width = image.width() as isize;
    let height = image.height() as isize;
    let src = image.data();
    let mut out = Vec::with_capacity(src.len());

    for y in 0..height {
        for x in 0..width {
            let mut min_v = src[(y * width + x) as usize];
            for &(dy, dx) in &offsets {
                let yy = y + dy;
                let xx = x + dx;
                if yy < 0 || xx < 0 || yy >= height || xx >= width {
                    continue;
                }
                let v = src[(yy * width + xx) as usize];
                if v < min_v {
                    min_v = v;
                }
            }
            out.push(min_v);
        }
    }

    Grid::from_parts(out, image.width(), image.height())
}

/// Returns `image - erode(image, footprint)`; every value is non-negative.
pub fn edge_emphasis(image: &Grid, footprint: Footprint) -> Grid {
    let eroded = erode(image, footprint);
    let data = image
        .data()
        .iter()
        .zip(eroded.data().iter())
        .map(|(&v, &e)| v - e)
        .collect();
    Grid::from_parts(data, image.width(), image.height())
}

#[cfg(test)]
mod tests {
    use super::{edge_emphasis, erode, Footprint};
    use crate::image::Grid;

    fn square_blob() -> Grid {
        Grid::from_fn(7, 7, |r, c| {
            if (2..=4).contains(&r) && (2..=4).contains(&c) {
                1.0
            } else {
                0.0
            }
        })
        .unwrap()
    }

    #[test]
    fn cross_erosion_keeps_only_blob_center() {
        let eroded = erode(&square_blob(), Footprint::Cross);
        assert_eq!(eroded.get(3, 3), Some(1.0));
        assert_eq!(eroded.get(2, 3), Some(0.0));
        assert_eq!(eroded.sum(), 1.0);
    }

    #[test]
    fn edge_is_blob_rim() {
        let edge = edge_emphasis(&square_blob(), Footprint::Cross);
        assert_eq!(edge.sum(), 8.0);
        assert_eq!(edge.get(3, 3), Some(0.0));
        assert_eq!(edge.get(2, 2), Some(1.0));
    }

    #[test]
    fn border_taps_are_ignored() {
        let flat = Grid::from_fn(4, 4, |_, _| 3.0).unwrap();
        assert_eq!(erode(&flat, Footprint::Square(2)), flat);
    }

    #[test]
    fn disk_footprint_size() {
        assert_eq!(Footprint::Disk(1).offsets().len(), 5);
        assert_eq!(Footprint::Disk(2).offsets().len(), 13);
        assert_eq!(Footprint::Square(1).offsets().len(), 9);
    }
}
