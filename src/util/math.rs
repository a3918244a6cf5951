//! Numeric helpers shared by the pipeline stages.

/// Arithmetic mean accumulated in `f64`. Returns 0 for an empty slice.
pub(crate) fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    sum / values.len() as f64
}

/// Largest absolute value, ignoring non-finite entries.
pub(crate) fn max_abs(values: &[f32]) -> f32 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f32, |acc, v| acc.max(v.abs()))
}

/// Largest finite value, or `None` when there is none.
pub(crate) fn max_finite(values: &[f32]) -> Option<f32> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f32>, v| {
            Some(match acc {
                Some(best) => best.max(v),
                None => v,
            })
        })
}

/// Rounds a positive radius up to a whole pixel count.
pub(crate) fn ceil_to_usize(value: f32) -> usize {
    if value.is_finite() && value > 0.0 {
        value.ceil() as usize
    } else {
        0
    }
}

/// Sign function with `sign(0) == 0`.
pub(crate) fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
