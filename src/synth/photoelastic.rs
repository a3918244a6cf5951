//! Theoretical photoelastic response of a disk under point contact forces.
//!
//! Each contact is a force of magnitude `force` applied at angular position
//! `beta` on the rim, inclined by `alpha` from the radial direction. The
//! stress field is the superposition of the classic two-dimensional
//! diametral-compression solution for every contact; the intensity seen
//! through a circular polariscope is `cos^2` (brightfield) or `sin^2`
//! (darkfield) of `pi / f_sigma * (sigma1 - sigma2)`.

use std::f64::consts::PI;

use crate::image::Grid;
use crate::util::math::sign;
use crate::util::{RingCorrError, RingCorrResult};

use super::circular_mask;

/// Point force acting on the particle rim.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Force magnitude.
    pub force: f64,
    /// Contact angle relative to the radial direction, in radians.
    pub alpha: f64,
    /// Angular position of the contact on the rim, in radians.
    pub beta: f64,
}

/// Polariscope configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Polariscope {
    /// Parallel analyzer: unstressed material appears bright.
    #[default]
    Brightfield,
    /// Crossed analyzer: unstressed material appears dark.
    Darkfield,
}

/// Material and geometry of one simulated particle.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoelasticParams {
    /// Forces acting on the rim.
    pub contacts: Vec<Contact>,
    /// Stress-optic coefficient.
    pub f_sigma: f64,
    /// Particle radius in pixels.
    pub radius: f64,
    /// Pixel scale; 1 treats pixel units as physical units.
    pub px_per_meter: f64,
    /// Optical setup the intensity is computed for.
    pub polariscope: Polariscope,
}

impl PhotoelasticParams {
    /// Parameters with unit pixel scale and a brightfield polariscope.
    pub fn new(contacts: Vec<Contact>, f_sigma: f64, radius: f64) -> Self {
        Self {
            contacts,
            f_sigma,
            radius,
            px_per_meter: 1.0,
            polariscope: Polariscope::default(),
        }
    }

    fn validate(&self) -> RingCorrResult<()> {
        if !(self.f_sigma.is_finite() && self.f_sigma > 0.0) {
            return Err(RingCorrError::InvalidParameter {
                param: "f_sigma",
                reason: "stress-optic coefficient must be positive",
            });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(RingCorrError::InvalidParameter {
                param: "radius",
                reason: "particle radius must be positive",
            });
        }
        if !(self.px_per_meter.is_finite() && self.px_per_meter > 0.0) {
            return Err(RingCorrError::InvalidParameter {
                param: "px_per_meter",
                reason: "pixel scale must be positive",
            });
        }
        Ok(())
    }
}

/// Intensity at `(y, x)` pixels relative to the particle center.
///
/// The point is assumed to lie inside the particle. Points that coincide with
/// a contact are singular and return 0.
pub fn evaluate_intensity(y: f64, x: f64, params: &PhotoelasticParams) -> f64 {
    let xm = x / params.px_per_meter;
    let ym = y / params.px_per_meter;
    let radius = params.radius / params.px_per_meter;

    let mut sigma_xx = 0.0;
    let mut sigma_yy = 0.0;
    let mut sigma_xy = 0.0;
    for contact in &params.contacts {
        // Rim position of the contact and of the far end of its chord.
        let b1 = PI - contact.beta;
        let alpha_sign = if sign(contact.alpha) < 0.0 { -1.0 } else { 1.0 };
        let b2 = b1 - alpha_sign * PI + 2.0 * contact.alpha;

        let mut chord_x = radius * (b2.sin() - b1.sin());
        let mut chord_y = radius * (b2.cos() - b1.cos());
        let chord_len = chord_x.hypot(chord_y);

        // Image rows grow downward.
        let vec_x = xm - radius * b1.sin();
        let vec_y = -ym - radius * b1.cos();
        let r = vec_x.hypot(vec_y);

        if r * chord_len == 0.0 {
            return 0.0;
        }
        chord_x /= chord_len;
        chord_y /= chord_len;

        // Keep acos away from exactly 1.
        let cos_arg = (vec_x * chord_x + vec_y * chord_y) / r - 1e-10;
        let mut theta = sign(vec_y * chord_x - vec_x * chord_y) * cos_arg.clamp(-1.0, 1.0).acos();

        let s_r = -2.0 / PI * contact.force * cos_arg / r;
        theta += contact.beta - PI / 2.0 - contact.alpha;

        sigma_xx += s_r * theta.sin().powi(2);
        sigma_yy += s_r * theta.cos().powi(2);
        sigma_xy += 0.5 * s_r * (2.0 * theta).sin();
    }

    let diff = sigma_xx - sigma_yy;
    let principal_diff = (diff * diff + 4.0 * sigma_xy * sigma_xy).sqrt();
    let phase = PI / params.f_sigma * principal_diff;
    match params.polariscope {
        Polariscope::Brightfield => phase.cos().powi(2),
        Polariscope::Darkfield => phase.sin().powi(2),
    }
}

/// Renders the response of one particle, zero outside its disk.
///
/// `image_size` is `(height, width)` and defaults to a square of side
/// `floor(2 r) + 11`; `center` is `(row, col)` and defaults to half the image
/// size. When `mask` is given, only pixels that are non-zero in both the mask
/// and the particle disk are evaluated; the mask must match the image shape.
pub fn synthetic_response(
    params: &PhotoelasticParams,
    image_size: Option<(usize, usize)>,
    center: Option<(f64, f64)>,
    mask: Option<&Grid>,
) -> RingCorrResult<Grid> {
    params.validate()?;
    let (height, width) = image_size.unwrap_or_else(|| {
        let side = (2.0 * params.radius).floor() as usize + 11;
        (side, side)
    });
    let (cy, cx) = center.unwrap_or((height as f64 / 2.0, width as f64 / 2.0));

    let particle = circular_mask(height, width, (cy as f32, cx as f32), params.radius as f32)?;
    if let Some(mask) = mask {
        if mask.shape() != particle.shape() {
            return Err(RingCorrError::ShapeMismatch {
                expected: particle.shape(),
                got: mask.shape(),
            });
        }
    }

    let data = particle
        .data()
        .iter()
        .enumerate()
        .map(|(idx, &inside)| {
            let selected = mask.map_or(true, |m| m.data()[idx] != 0.0);
            if inside == 0.0 || !selected {
                return 0.0;
            }
            let row = (idx / width) as f64;
            let col = (idx % width) as f64;
            evaluate_intensity(row - cy, col - cx, params) as f32
        })
        .collect();
    Grid::new(data, width, height)
}
