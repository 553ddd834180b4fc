use blockmotion::{
    BlockMatcher, DenseInterpolation, Frame, MatchConfig, MatchMode, MatchState, MotionCompensator,
    MotionError, MotionVector, RegionMap, RegionMetric,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_frame(seed: u64, width: usize, height: usize) -> Frame<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    Frame::from_fn(width, height, |_, _| rng.random_range(0..=255))
}

fn config(search_range: usize) -> MatchConfig {
    MatchConfig {
        search_range,
        ..MatchConfig::default()
    }
}

#[test]
fn uniform_frames_give_zero_field() {
    let frame = Frame::filled(8, 8, 100u8);
    let matcher = BlockMatcher::lattice(frame.clone(), frame.clone(), 4, false).unwrap();
    assert_eq!(matcher.vector_field_width(), 2);
    assert_eq!(matcher.vector_field_height(), 2);
    let field = matcher.vector_field().unwrap();
    assert!(field.as_slice().iter().all(|&v| v == MotionVector::ZERO));

    let mut compensator = MotionCompensator::new(frame.clone(), frame, field).unwrap();
    let out = compensator.create_image_compensated(None).unwrap();
    assert!(out.as_slice().iter().all(|&p| p == 100));
}

#[test]
fn horizontal_shift_is_recovered_and_reconstructed() {
    let prev = random_frame(42, 10, 10);
    let fresh = random_frame(43, 10, 10);
    // next(x, y) = prev(x - 2, y); the two leftmost columns are new content.
    let next = Frame::from_fn(10, 10, |x, y| {
        if x >= 2 {
            prev[(x - 2, y)]
        } else {
            fresh[(x, y)]
        }
    });

    let mut matcher = BlockMatcher::new(config(5));
    matcher.reset(prev.clone(), next.clone(), 4, false).unwrap();
    assert_eq!(matcher.block_size(), Some(4));
    for by in 0..3 {
        for bx in 1..3 {
            assert_eq!(
                matcher.get_block(bx, by).unwrap(),
                MotionVector::new(-2.0, 0.0),
                "block ({bx}, {by})"
            );
        }
    }
    assert_eq!(matcher.get(9, 9).unwrap(), MotionVector::new(-2.0, 0.0));

    let field = matcher.vector_field().unwrap();
    let mut compensator = MotionCompensator::new(prev, next.clone(), field).unwrap();
    let out = compensator.create_image_compensated(None).unwrap();
    for y in 0..10 {
        for x in 4..10 {
            assert_eq!(out[(x, y)], next[(x, y)], "pixel ({x}, {y})");
        }
    }
}

#[test]
fn flat_block_copies_scan_order_neighbour() {
    let mut prev = random_frame(5, 12, 12);
    for y in 4..8 {
        for x in 5..9 {
            prev[(x, y)] = 50;
        }
    }
    let fresh = random_frame(6, 12, 12);
    // next(x, y) = prev(x + 1, y): block (1, 1) of next is constant.
    let next = Frame::from_fn(12, 12, |x, y| {
        if x + 1 < 12 {
            prev[(x + 1, y)]
        } else {
            fresh[(x, y)]
        }
    });

    let mut matcher = BlockMatcher::new(MatchConfig {
        search_range: 5,
        dense_interpolation: DenseInterpolation::Replicate,
        ..MatchConfig::default()
    });
    matcher.reset(prev, next, 4, true).unwrap();
    assert_eq!(matcher.mode(), Some(MatchMode::DenseLattice));
    assert_eq!(
        (matcher.vector_field_width(), matcher.vector_field_height()),
        (12, 12)
    );

    let shift = MotionVector::new(1.0, 0.0);
    assert_eq!(matcher.get_block(1, 0).unwrap(), shift);
    assert_eq!(matcher.get_block(0, 1).unwrap(), shift);
    assert_eq!(matcher.get_block(1, 1).unwrap(), shift);
    for y in 4..8 {
        for x in 4..8 {
            assert_eq!(matcher.get(x, y).unwrap(), shift);
        }
    }
    assert_eq!(matcher.block_field().unwrap().dims(), (3, 3));
}

#[test]
fn region_vectors_are_replicated_over_members() {
    let prev = random_frame(9, 12, 12);
    // next(x, y) = prev(x, y - 1) with a zero top row.
    let next = Frame::from_fn(12, 12, |x, y| prev.get_zeropad(x as isize, y as isize - 1));
    let labels: RegionMap = Frame::from_fn(12, 12, |x, _| i32::from(x >= 6));

    let mut matcher = BlockMatcher::new(MatchConfig {
        search_range: 5,
        region_metric: RegionMetric::Mad,
        ..MatchConfig::default()
    });
    matcher
        .reset_regions(prev, next, &labels, &labels)
        .unwrap();
    assert_eq!(matcher.regions().map(<[_]>::len), Some(2));

    let field = matcher.vector_field().unwrap();
    assert_eq!(field.dims(), (12, 12));
    for region in matcher.regions().unwrap() {
        let (x0, y0) = region.pixels()[0];
        let v = field[(x0, y0)];
        assert_eq!(v, MotionVector::new(0.0, -1.0));
        assert!(region.pixels().iter().all(|&(x, y)| field[(x, y)] == v));
    }
}

#[test]
fn flat_regions_are_interpolated_when_enabled() {
    let textured = random_frame(21, 12, 8);
    // left half textured, right half flat
    let frame = Frame::from_fn(12, 8, |x, y| if x < 6 { textured[(x, y)] } else { 80 });
    let next = Frame::from_fn(12, 8, |x, y| frame.get_clamped(x as isize + 1, y as isize));
    let labels: RegionMap = Frame::from_fn(12, 8, |x, _| i32::from(x >= 6));

    let mut matcher = BlockMatcher::new(MatchConfig {
        search_range: 3,
        region_metric: RegionMetric::MadNearestIntensity,
        interpolate_flat_regions: true,
        ..MatchConfig::default()
    });
    matcher
        .reset_regions(frame, next, &labels, &labels)
        .unwrap();
    let left = matcher.get(0, 0).unwrap();
    assert_eq!(left, MotionVector::new(1.0, 0.0));
    assert_eq!(matcher.get(11, 7).unwrap(), left);
}

#[test]
fn matcher_lifecycle() {
    let frame = random_frame(1, 8, 8);
    let mut matcher = BlockMatcher::new(config(3));
    assert_eq!(matcher.state(), MatchState::Unbound);
    assert!(matcher.is_null());
    assert_eq!(matcher.block_matching(3).err(), Some(MotionError::Unbound));

    matcher.reset(frame.clone(), frame.clone(), 4, false).unwrap();
    assert_eq!(matcher.state(), MatchState::Bound);
    matcher.vector_field().unwrap();
    assert_eq!(matcher.state(), MatchState::Matched);

    assert_eq!(
        matcher.block_matching(0).err(),
        Some(MotionError::InvalidSearchRange { search_range: 0 })
    );
    assert_eq!(
        matcher.reset(frame.clone(), frame.clone(), 9, false).err(),
        Some(MotionError::InvalidBlockSize {
            block_size: 9,
            width: 8,
            height: 8
        })
    );
    // failed rebinds keep the previous session
    assert_eq!(matcher.state(), MatchState::Matched);

    matcher.reset(frame.clone(), frame, 4, false).unwrap();
    assert_eq!(matcher.state(), MatchState::Bound);
    matcher
        .reset(Frame::empty(), Frame::empty(), 4, false)
        .unwrap();
    assert_eq!(matcher.state(), MatchState::Unbound);
    assert_eq!(matcher.vector_field_width(), 0);
}
