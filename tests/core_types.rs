use blockmotion::lowlevel::{get_connected_region_list, validate_region_map};
use blockmotion::{Connectivity, Frame, ImageView, MotionError, MotionVector, RegionMap};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        MotionError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        MotionError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_roi_shares_buffer() {
    let data: Vec<u8> = (0..20).collect();
    let view = ImageView::from_slice(&data, 5, 4).unwrap();
    let roi = view.roi(1, 2, 3, 2).unwrap();
    assert_eq!(roi.row(0).unwrap(), &[11, 12, 13]);
    assert_eq!(roi.get(2, 1), Some(&18));
    assert!(matches!(
        view.roi(3, 3, 3, 2),
        Err(MotionError::RoiOutOfBounds { .. })
    ));
}

#[test]
fn frame_null_state_is_valid() {
    let frame = Frame::<u8>::from_vec(Vec::new(), 0, 7).unwrap();
    assert!(frame.is_null());
    assert_eq!(frame.dims(), (0, 0));
    assert_eq!(frame.get_zeropad(0, 0), 0);
    assert_eq!(
        Frame::<u8>::from_vec(vec![1, 2, 3], 2, 2).err(),
        Some(MotionError::BufferTooSmall { needed: 4, got: 3 })
    );
}

#[test]
fn frame_sampling_is_forgiving() {
    let frame = Frame::from_fn(3, 2, |x, y| (x + 10 * y) as i32);
    assert_eq!(frame.get(3, 0), None);
    assert_eq!(frame.get_zeropad(-1, 0), 0);
    assert_eq!(frame.get_clamped(5, -4), 2);
    assert_eq!(frame.sample_zeropad(1.0, 1.0), 11);
    let mut frame = frame;
    assert!(!frame.set(0, 2, 99));
    assert!(frame.set(0, 1, 99));
    assert_eq!(frame[(0, 1)], 99);
}

#[test]
#[should_panic]
fn frame_index_panics_outside() {
    let frame = Frame::filled(2, 2, 0u8);
    let _ = frame[(2, 0)];
}

#[test]
fn motion_vector_arithmetic() {
    let a = MotionVector::new(1.5, -2.0);
    let b = MotionVector::from((2isize, 1isize));
    assert_eq!(a + b, MotionVector::new(3.5, -1.0));
    assert_eq!(b - a, MotionVector::new(0.5, 3.0));
    assert_eq!(a * 2.0, MotionVector::new(3.0, -4.0));
    assert_eq!(-b, MotionVector::new(-2.0, -1.0));
    assert_eq!(MotionVector::new(3.0, 4.0).norm(), 5.0);
}

#[test]
fn region_map_validation() {
    let mut map: RegionMap = Frame::filled(3, 3, 2);
    assert!(validate_region_map(&map, 3, 3).is_ok());
    assert!(matches!(
        validate_region_map(&map, 4, 3),
        Err(MotionError::DimensionMismatch { .. })
    ));
    map[(1, 2)] = -5;
    assert_eq!(
        get_connected_region_list(&map, Connectivity::Four).err(),
        Some(MotionError::NegativeLabel {
            x: 1,
            y: 2,
            label: -5
        })
    );
}

#[test]
fn connected_regions_split_by_connectivity_not_label() {
    #[rustfmt::skip]
    let labels = vec![
        1, 1, 0, 1,
        0, 0, 0, 1,
        1, 0, 2, 2,
    ];
    let map = Frame::from_vec(labels, 4, 3).unwrap();
    let regions = get_connected_region_list(&map, Connectivity::Four).unwrap();
    let summary: Vec<(i32, usize)> = regions.iter().map(|r| (r.label(), r.len())).collect();
    assert_eq!(summary, vec![(1, 2), (0, 5), (1, 2), (1, 1), (2, 2)]);
    let total: usize = regions.iter().map(|r| r.len()).sum();
    assert_eq!(total, 12);
}
