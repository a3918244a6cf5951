use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringcorr::{
    find_peaks, find_peaks_with, refine_with, Grid, Peak, PeakConfig, RefineStrategy,
    RingCorrError,
};

const STRATEGIES: [RefineStrategy; 4] = [
    RefineStrategy::AxisCentroid,
    RefineStrategy::Centroid2d,
    RefineStrategy::Parabolic,
    RefineStrategy::Gaussian,
];

fn random_map(rng: &mut StdRng, width: usize, height: usize) -> Grid {
    Grid::from_fn(width, height, |_, _| rng.random_range(-1.0f32..1.0)).unwrap()
}

fn count_at(corr: &Grid, min_distance: usize, threshold: f32) -> usize {
    match find_peaks(corr, min_distance, threshold) {
        Ok(peaks) => peaks.len(),
        Err(RingCorrError::EmptyResult { .. }) => 0,
        Err(err) => panic!("unexpected error: {err}"),
    }
}

#[test]
fn raising_threshold_never_adds_peaks() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let corr = random_map(&mut rng, 48, 40);
        let min_distance = rng.random_range(0..5);
        let mut prev = usize::MAX;
        for step in 0..=20 {
            let threshold = -1.0 + step as f32 * 0.1;
            let count = count_at(&corr, min_distance, threshold);
            assert!(count <= prev, "d={min_distance} t={threshold}: {count} > {prev}");
            prev = count;
        }
    }
}

#[test]
fn kept_peaks_are_separated_and_sorted() {
    let mut rng = StdRng::seed_from_u64(31);
    let corr = random_map(&mut rng, 64, 64);
    for min_distance in [1usize, 3, 6] {
        let peaks = find_peaks(&corr, min_distance, -1.0).unwrap();
        for (i, a) in peaks.iter().enumerate() {
            for b in &peaks[i + 1..] {
                let cheb = a.row.abs_diff(b.row).max(a.col.abs_diff(b.col));
                assert!(cheb > min_distance);
                assert!(a.score >= b.score);
            }
        }
    }
}

#[test]
fn equal_peaks_break_ties_row_major() {
    let mut data = vec![0.0f32; 20 * 20];
    for &(r, c) in &[(15, 3), (4, 12), (4, 2), (15, 16)] {
        data[r * 20 + c] = 0.8;
    }
    let corr = Grid::new(data, 20, 20).unwrap();
    let peaks = find_peaks(&corr, 2, 0.5).unwrap();
    let order: Vec<(usize, usize)> = peaks.iter().map(|p| (p.row, p.col)).collect();
    assert_eq!(order, vec![(4, 2), (4, 12), (15, 3), (15, 16)]);
}

#[test]
fn border_peaks_can_be_excluded() {
    let mut data = vec![0.0f32; 30 * 30];
    data[30 + 15] = 1.0;
    data[15 * 30 + 15] = 0.9;
    let corr = Grid::new(data, 30, 30).unwrap();

    let all = find_peaks(&corr, 4, 0.5).unwrap();
    assert_eq!(all.len(), 2);

    let inner = find_peaks_with(
        &corr,
        &PeakConfig {
            min_distance: 4,
            threshold: 0.5,
            exclude_border: true,
        },
    )
    .unwrap();
    assert_eq!(inner.len(), 1);
    assert_eq!((inner[0].row, inner[0].col), (15, 15));
}

#[test]
fn refinement_stays_within_window() {
    let mut rng = StdRng::seed_from_u64(4242);
    for _ in 0..6 {
        let corr = random_map(&mut rng, 40, 32);
        let peaks = find_peaks(&corr, 2, 0.0).unwrap();
        for window in 1..=4usize {
            for strategy in STRATEGIES {
                let refined = refine_with(&corr, &peaks, window, strategy).unwrap();
                assert_eq!(refined.len(), peaks.len());
                // Three-point fits are bounded by one pixel, centroids by the window.
                let bound = match strategy {
                    RefineStrategy::Parabolic | RefineStrategy::Gaussian => 1.0,
                    _ => window as f32,
                };
                for (p, r) in peaks.iter().zip(&refined) {
                    assert!(r.row.is_finite() && r.col.is_finite());
                    assert!((r.row - p.row as f32).abs() <= bound, "{strategy:?} w={window}");
                    assert!((r.col - p.col as f32).abs() <= bound, "{strategy:?} w={window}");
                    assert_eq!(r.score, p.score);
                }
            }
        }
    }
}

#[test]
fn corner_peak_refines_inside_the_grid() {
    let corr = Grid::from_fn(6, 6, |r, c| 1.0 - 0.1 * (r + c) as f32).unwrap();
    let peaks = [Peak {
        row: 0,
        col: 0,
        score: 1.0,
    }];
    for strategy in STRATEGIES {
        let refined = refine_with(&corr, &peaks, 3, strategy).unwrap();
        assert!(refined[0].row >= 0.0 && refined[0].col >= 0.0, "{strategy:?}");
    }
}
