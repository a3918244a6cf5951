//! Three-sample 1D peak fits.
//!
//! Both fits take samples at `x = -1, 0, +1` and return the vertex offset of
//! the fitted parabola, or `None` when the samples do not describe a peak.

/// Second differences flatter than this are treated as no curvature.
const MIN_CURVATURE: f32 = 1e-6;

/// Vertex offset of the parabola through `(-1, fm)`, `(0, f0)`, `(1, fp)`.
///
/// Requires a strictly concave fit and a vertex no more than one sample away.
pub fn quad_peak_offset_1d(fm: f32, f0: f32, fp: f32) -> Option<f32> {
    if ![fm, f0, fp].iter().all(|v| v.is_finite()) {
        return None;
    }
    vertex(fm, f0, fp)
}

/// Gaussian variant: the parabola is fitted to `ln` of the samples, which is
/// exact for a Gaussian profile.
///
/// All three samples must be strictly positive.
pub fn gauss_peak_offset_1d(fm: f32, f0: f32, fp: f32) -> Option<f32> {
    if !(fm > 0.0 && f0 > 0.0 && fp > 0.0) {
        return None;
    }
    quad_peak_offset_1d(fm.ln(), f0.ln(), fp.ln())
}

fn vertex(fm: f32, f0: f32, fp: f32) -> Option<f32> {
    let curvature = fm - 2.0 * f0 + fp;
    if curvature > -MIN_CURVATURE {
        return None;
    }
    let dx = (fm - fp) / (2.0 * curvature);
    (dx.is_finite() && dx.abs() <= 1.0).then_some(dx)
}
