//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Decoding itself is left
//! to `image`; these helpers only extract one channel as a `Grid`.

use crate::image::Grid;
use crate::util::{RingCorrError, RingCorrResult};
use std::path::Path;

/// Which plane of a decoded image to analyze.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Channel {
    /// Luminance of the decoded image.
    #[default]
    Luma,
    /// Red plane.
    Red,
    /// Green plane.
    Green,
    /// Blue plane.
    Blue,
}

/// Extracts one channel of a decoded image as a `Grid`.
pub fn grid_from_dynamic_image(img: &image::DynamicImage, channel: Channel) -> RingCorrResult<Grid> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    match channel {
        Channel::Luma => {
            let gray = img.to_luma32f();
            Grid::new(gray.into_raw(), width, height)
        }
        Channel::Red | Channel::Green | Channel::Blue => {
            let idx = match channel {
                Channel::Red => 0,
                Channel::Green => 1,
                _ => 2,
            };
            let rgb = img.to_rgb32f();
            let data = rgb.pixels().map(|p| p.0[idx]).collect();
            Grid::new(data, width, height)
        }
    }
}

/// Loads an image from disk and extracts one channel.
pub fn load_channel<P: AsRef<Path>>(path: P, channel: Channel) -> RingCorrResult<Grid> {
    let img = image::open(path).map_err(|err| RingCorrError::ImageIo {
        reason: err.to_string(),
    })?;
    grid_from_dynamic_image(&img, channel)
}

/// Writes a grid as an 8-bit grayscale PNG, min-max scaled to `[0, 255]`.
pub fn save_grid_png<P: AsRef<Path>>(grid: &Grid, path: P) -> RingCorrResult<()> {
    let (lo, hi) = grid
        .data()
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let span = if hi > lo { hi - lo } else { 1.0 };
    let pixels: Vec<u8> = grid
        .data()
        .iter()
        .map(|&v| {
            if v.is_finite() {
                (((v - lo) / span) * 255.0).round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        })
        .collect();
    let buffer = image::GrayImage::from_raw(grid.width() as u32, grid.height() as u32, pixels)
        .ok_or(RingCorrError::BufferTooSmall {
            needed: grid.width() * grid.height(),
            got: grid.data().len(),
        })?;
    buffer.save(path).map_err(|err| RingCorrError::ImageIo {
        reason: err.to_string(),
    })
}
