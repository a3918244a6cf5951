use ringcorr::{
    build_disk_kernel, build_ring_kernel, correlate, find_peaks, normalize, refine, Grid,
    ImageView, KernelShape, RingCorrError,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        RingCorrError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        RingCorrError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        RingCorrError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [0u8; 3];

    let err = ImageView::new(&data, 2, 2, 2).err().unwrap();
    assert_eq!(err, RingCorrError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn strided_view_converts_to_dense_grid() {
    // Two rows of three pixels, padded to a stride of four.
    let data: [u16; 8] = [1, 2, 3, 99, 4, 5, 6, 99];
    let view = ImageView::new(&data, 3, 2, 4).unwrap();
    assert_eq!(view.row(1).unwrap(), &[4u16, 5, 6]);
    assert_eq!(view.get(0, 3), None);

    let grid = view.to_grid().unwrap();
    assert_eq!(grid.shape(), (2, 3));
    assert_eq!(grid.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn grid_rejects_mismatched_buffers() {
    assert_eq!(
        Grid::new(vec![0.0; 5], 3, 2).err(),
        Some(RingCorrError::BufferTooSmall { needed: 6, got: 5 })
    );
    assert!(Grid::new(vec![0.0; 7], 3, 2).is_err());
    assert_eq!(
        Grid::zeros(0, 4).err(),
        Some(RingCorrError::InvalidDimensions {
            width: 0,
            height: 4,
        })
    );

    let a = Grid::zeros(3, 2).unwrap();
    let b = Grid::zeros(2, 3).unwrap();
    assert_eq!(
        a.add(&b).err(),
        Some(RingCorrError::ShapeMismatch {
            expected: (2, 3),
            got: (3, 2),
        })
    );
}

#[test]
fn kernel_rejects_invalid_parameters() {
    for (radius, width) in [(0.0, 1.0), (-3.0, 1.0), (f32::NAN, 1.0), (5.0, 0.0), (5.0, 6.0)] {
        assert!(
            matches!(
                build_ring_kernel(radius, width),
                Err(RingCorrError::InvalidParameter { .. })
            ),
            "radius {radius} width {width}"
        );
    }
    assert!(matches!(
        build_disk_kernel(f32::INFINITY),
        Err(RingCorrError::InvalidParameter { param: "radius", .. })
    ));
    assert!(KernelShape::Disk { radius: 4.0 }.build().is_ok());
}

#[test]
fn oversized_kernel_is_rejected_by_correlation() {
    let kernel = build_ring_kernel(20.0, 1.5).unwrap();
    let image = Grid::from_fn(30, 50, |r, c| ((r * 7 + c * 3) % 5) as f32).unwrap();
    assert_eq!(
        correlate(&image, kernel.grid()).err(),
        Some(RingCorrError::KernelTooLarge {
            kernel: 41,
            width: 30,
            height: 50,
        })
    );
}

#[test]
fn constant_image_is_empty() {
    let image = Grid::from_fn(16, 16, |_, _| 3.5).unwrap();
    assert_eq!(normalize(&image).err(), Some(RingCorrError::EmptyImage));
}

#[test]
fn no_peak_above_threshold_is_empty_result() {
    let corr = Grid::from_fn(10, 10, |r, c| (r + c) as f32 * 0.01).unwrap();
    assert_eq!(
        find_peaks(&corr, 2, 0.9).err(),
        Some(RingCorrError::EmptyResult { threshold: 0.9 })
    );
}

#[test]
fn zero_refine_window_is_invalid() {
    let corr = Grid::zeros(4, 4).unwrap();
    assert!(matches!(
        refine(&corr, &[], 0),
        Err(RingCorrError::InvalidParameter { param: "window", .. })
    ));
}

#[test]
fn errors_render_readable_messages() {
    let msg = RingCorrError::KernelTooLarge {
        kernel: 41,
        width: 30,
        height: 50,
    }
    .to_string();
    assert!(msg.contains("41"));
    assert!(!RingCorrError::EmptyImage.to_string().is_empty());
}
