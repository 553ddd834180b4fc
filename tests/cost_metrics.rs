use blockmotion::lowlevel::{mad, sad, zncc, zncc_region_nearest_intensity};
use blockmotion::{ConnectedRegion, Frame, ImageView, Metric, MotionError, RegionMetric};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_frame(rng: &mut StdRng, width: usize, height: usize) -> Frame<u8> {
    Frame::from_fn(width, height, |_, _| rng.random_range(0..=255))
}

/// Exhaustive argmin over every placement of `block` inside `image`.
fn argmin(image: &Frame<u8>, block: ImageView<'_, u8>, metric: Metric) -> (usize, usize) {
    let view = image.view().unwrap();
    let mut best = (0, 0);
    let mut best_cost = f64::INFINITY;
    for y in 0..=image.height() - block.height() {
        for x in 0..=image.width() - block.width() {
            let cand = view.roi(x, y, block.width(), block.height()).unwrap();
            let cost = metric.score(cand, block).unwrap();
            if cost < best_cost {
                best_cost = cost;
                best = (x, y);
            }
        }
    }
    best
}

#[test]
fn mad_and_sad_agree_on_best_match() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        let image = random_frame(&mut rng, 24, 20);
        let mut noisy = image.clone();
        for v in noisy.as_mut_slice() {
            *v = v.saturating_add(rng.random_range(0..4));
        }
        let x0 = rng.random_range(0..16);
        let y0 = rng.random_range(0..12);
        let block = noisy.view().unwrap().roi(x0, y0, 8, 8).unwrap();

        let by_sad = argmin(&image, block, Metric::Sad);
        let by_mad = argmin(&image, block, Metric::Mad);
        assert_eq!(by_sad, by_mad);
        assert_eq!(by_mad, (x0, y0));
    }
}

#[test]
fn mad_scales_sad_by_sample_count() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = random_frame(&mut rng, 6, 5);
    let b = random_frame(&mut rng, 6, 5);
    let (va, vb) = (a.view().unwrap(), b.view().unwrap());
    let s = sad(va, vb).unwrap();
    assert!((mad(va, vb).unwrap() * 30.0 - s).abs() < 1e-9);
}

#[test]
fn zncc_ignores_gain_and_offset() {
    let mut rng = StdRng::seed_from_u64(3);
    let a: Vec<f64> = (0..16).map(|_| rng.random_range(0.0..100.0)).collect();
    let b: Vec<f64> = a.iter().map(|v| 2.5 * v + 17.0).collect();
    let va = ImageView::from_slice(&a, 4, 4).unwrap();
    let vb = ImageView::from_slice(&b, 4, 4).unwrap();
    assert!(zncc(va, vb).unwrap() < 1e-9);

    let inverted: Vec<f64> = a.iter().map(|v| -v).collect();
    let vi = ImageView::from_slice(&inverted, 4, 4).unwrap();
    assert!((zncc(va, vi).unwrap() - 2.0).abs() < 1e-9);
}

#[test]
fn rectangular_metrics_reject_mismatched_supports() {
    let a = [0u8; 6];
    let b = [0u8; 6];
    let va = ImageView::from_slice(&a, 3, 2).unwrap();
    let vb = ImageView::from_slice(&b, 2, 3).unwrap();
    for metric in [Metric::Sad, Metric::Mad, Metric::Zncc, Metric::MadCentered] {
        assert!(matches!(
            metric.score(va, vb),
            Err(MotionError::SupportSizeMismatch { .. })
        ));
    }
}

#[test]
fn region_metrics_reject_empty_regions() {
    let frame = Frame::filled(4, 4, 1u8);
    let empty = ConnectedRegion::new(0, Vec::new());
    for metric in [
        RegionMetric::Mad,
        RegionMetric::Zncc,
        RegionMetric::MadNearestIntensity,
        RegionMetric::ZnccNearestIntensity,
    ] {
        assert_eq!(
            metric.score(&frame, &frame, &empty, 0, 0),
            Err(MotionError::EmptySupport)
        );
    }
}

#[test]
fn nearest_intensity_removes_border_bias() {
    // A horizontal ramp; the region sits on the right edge and the candidate
    // displacement pushes half of it off the frame.
    let frame = Frame::from_fn(8, 4, |x, _| 10.0 + x as f64);
    let pixels = (0..4).flat_map(|y| (6..8).map(move |x| (x, y))).collect();
    let region = ConnectedRegion::new(0, pixels);

    let zero = RegionMetric::Mad.score(&frame, &frame, &region, 1, 0).unwrap();
    let nearest = RegionMetric::MadNearestIntensity
        .score(&frame, &frame, &region, 1, 0)
        .unwrap();
    // zero padding: |17-16| and |0-17| per row; clamping: |17-16| and |17-17|
    assert!((zero - 9.0).abs() < 1e-12);
    assert!((nearest - 0.5).abs() < 1e-12);
    assert!(zncc_region_nearest_intensity(&frame, &frame, &region, 0, 0).unwrap() < 1e-12);
}

#[test]
fn nearest_intensity_zncc_ignores_the_border() {
    // The region is the last column; shifting right moves every reference
    // sample off the frame.
    let frame = Frame::from_fn(8, 4, |x, y| 10.0 + x as f64 + 3.0 * y as f64);
    let region = ConnectedRegion::new(0, (0..4).map(|y| (7, y)).collect());

    let zero = RegionMetric::Zncc.score(&frame, &frame, &region, 2, 0).unwrap();
    let nearest = RegionMetric::ZnccNearestIntensity
        .score(&frame, &frame, &region, 2, 0)
        .unwrap();
    // zero padding leaves a flat reference against a textured target
    assert_eq!(zero, 1.0);
    assert!(nearest.abs() < 1e-12);

    let inside = RegionMetric::Zncc.score(&frame, &frame, &region, -1, 0).unwrap();
    let inside_nearest = zncc_region_nearest_intensity(&frame, &frame, &region, -1, 0).unwrap();
    assert!((inside - inside_nearest).abs() < 1e-12);
}
