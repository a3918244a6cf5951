//! Threshold calibration from the distribution of correlation peak heights.
//!
//! On a well-matched radius the true particles form a cluster of heights
//! near 1 and the background maxima a cluster near 0; the threshold belongs
//! in the gap between them.

use crate::candidate::peaks::local_maxima;
use crate::image::Grid;
use crate::util::{RingCorrError, RingCorrResult};

/// Heights of all local maxima of `corr`, strongest first.
pub fn peak_heights(corr: &Grid, min_distance: usize) -> Vec<f32> {
    // local_maxima already returns peaks in descending score order.
    local_maxima(corr, min_distance, f32::NEG_INFINITY, false)
        .into_iter()
        .map(|p| p.score)
        .collect()
}

/// Fixed-width histogram of peak heights.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightHistogram {
    /// Smallest finite height, the lower edge of the first bin.
    pub lo: f32,
    /// Largest finite height, the upper edge of the last bin.
    pub hi: f32,
    /// Number of heights per bin.
    pub counts: Vec<usize>,
}

impl HeightHistogram {
    /// Bins `heights` over `[min, max]`; the maximum falls in the last bin.
    pub fn from_heights(heights: &[f32], bins: usize) -> RingCorrResult<Self> {
        if bins == 0 {
            return Err(RingCorrError::InvalidParameter {
                param: "bins",
                reason: "histogram needs at least one bin",
            });
        }
        let finite: Vec<f32> = heights.iter().copied().filter(|h| h.is_finite()).collect();
        let Some(&first) = finite.first() else {
            return Err(RingCorrError::InvalidParameter {
                param: "heights",
                reason: "no finite heights to bin",
            });
        };
        let (lo, hi) = finite
            .iter()
            .fold((first, first), |(lo, hi), &h| (lo.min(h), hi.max(h)));

        let mut counts = vec![0usize; bins];
        let span = hi - lo;
        for &h in &finite {
            let idx = if span > 0.0 {
                (((h - lo) / span) * bins as f32) as usize
            } else {
                0
            };
            counts[idx.min(bins - 1)] += 1;
        }
        Ok(Self { lo, hi, counts })
    }

    /// Width of one bin; 0 when every height is equal.
    pub fn bin_width(&self) -> f32 {
        (self.hi - self.lo) / self.counts.len() as f32
    }

    /// Lower edge of every bin.
    pub fn edges(&self) -> Vec<f32> {
        let w = self.bin_width();
        (0..self.counts.len())
            .map(|i| self.lo + w * i as f32)
            .collect()
    }
}

/// Midpoint of the widest gap between consecutive positive heights.
///
/// Non-positive maxima come from background and are ignored.
pub fn suggest_threshold(heights: &[f32]) -> Option<f32> {
    let mut sorted: Vec<f32> = heights
        .iter()
        .copied()
        .filter(|h| h.is_finite() && *h > 0.0)
        .collect();
    if sorted.len() < 2 {
        return None;
    }
    sorted.sort_by(|a, b| b.total_cmp(a));

    sorted
        .windows(2)
        .max_by(|a, b| (a[0] - a[1]).total_cmp(&(b[0] - b[1])))
        .map(|pair| 0.5 * (pair[0] + pair[1]))
}

#[cfg(test)]
mod tests {
    use super::{peak_heights, suggest_threshold, HeightHistogram};
    use crate::image::Grid;
    use crate::util::RingCorrError;

    #[test]
    fn widest_gap_splits_clusters() {
        let heights = [0.95, 1.0, 0.9, 0.12, 0.08, 0.1, -0.4];
        let t = suggest_threshold(&heights).unwrap();
        assert!((t - 0.51).abs() < 1e-6);
    }

    #[test]
    fn too_few_heights_gives_none() {
        assert_eq!(suggest_threshold(&[]), None);
        assert_eq!(suggest_threshold(&[0.7]), None);
        assert_eq!(suggest_threshold(&[0.7, -0.1]), None);
    }

    #[test]
    fn histogram_counts_every_height() {
        let hist = HeightHistogram::from_heights(&[0.0, 0.1, 0.5, 0.9, 1.0], 4).unwrap();
        assert_eq!(hist.counts, vec![2, 0, 1, 2]);
        assert_eq!(hist.counts.iter().sum::<usize>(), 5);
        assert!((hist.bin_width() - 0.25).abs() < 1e-6);
        assert_eq!(hist.edges().len(), 4);
    }

    #[test]
    fn histogram_rejects_bad_input() {
        assert!(matches!(
            HeightHistogram::from_heights(&[0.5], 0),
            Err(RingCorrError::InvalidParameter { param: "bins", .. })
        ));
        assert!(HeightHistogram::from_heights(&[f32::NAN], 3).is_err());
        let flat = HeightHistogram::from_heights(&[0.3, 0.3], 3).unwrap();
        assert_eq!(flat.counts, vec![2, 0, 0]);
    }

    #[test]
    fn heights_are_sorted_descending() {
        let mut data = vec![0.0f32; 100];
        data[22] = 0.4;
        data[77] = 0.9;
        let grid = Grid::new(data, 10, 10).unwrap();
        let heights = peak_heights(&grid, 2);
        assert_eq!(heights[0], 0.9);
        assert_eq!(heights[1], 0.4);
        assert!(heights.windows(2).all(|w| w[0] >= w[1]));
    }
}
