//! Separable three-point fits on a 3x3 neighborhood.

/// Refines a peak from a 3x3 neighborhood `s` centered at `s[1][1]`.
///
/// The row offset comes from the center column and the column offset from
/// the center row, each through `fit`. An axis whose fit fails keeps the
/// integer coordinate.
pub fn refine_separable_3x3<F>(center_row: usize, center_col: usize, s: [[f32; 3]; 3], fit: F) -> (f32, f32)
where
    F: Fn(f32, f32, f32) -> Option<f32>,
{
    let dc = fit(s[1][0], s[1][1], s[1][2]).unwrap_or(0.0);
    let dr = fit(s[0][1], s[1][1], s[2][1]).unwrap_or(0.0);

    (center_row as f32 + dr, center_col as f32 + dc)
}

#[cfg(test)]
mod tests {
    use super::refine_separable_3x3;
    use crate::refine::quad1d::quad_peak_offset_1d;

    #[test]
    fn separable_paraboloid() {
        let coords = [-1.0f32, 0.0, 1.0];
        let mut s = [[0.0f32; 3]; 3];
        for (ri, &r) in coords.iter().enumerate() {
            for (ci, &c) in coords.iter().enumerate() {
                s[ri][ci] = 1.0 - (c - 0.3).powi(2) - (r + 0.2).powi(2);
            }
        }

        let (row, col) = refine_separable_3x3(10, 20, s, quad_peak_offset_1d);
        assert!((row - 9.8).abs() < 1e-3);
        assert!((col - 20.3).abs() < 1e-3);
    }
}
