use blockmotion::{
    BlockMatcher, Frame, MatchConfig, Metric, MotionCompensator, RegionMap, RegionMetric,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_frame(width: usize, height: usize) -> Frame<u8> {
    Frame::from_fn(width, height, |x, y| {
        (((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF) as u8
    })
}

fn shifted(frame: &Frame<u8>, dx: isize, dy: isize) -> Frame<u8> {
    Frame::from_fn(frame.width(), frame.height(), |x, y| {
        frame.get_clamped(x as isize - dx, y as isize - dy)
    })
}

fn bench_matching(c: &mut Criterion) {
    let prev = make_frame(160, 120);
    let next = shifted(&prev, 3, -2);

    for (name, metric) in [
        ("lattice_mad", Metric::Mad),
        ("lattice_sad", Metric::Sad),
        ("lattice_zncc", Metric::Zncc),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut matcher = BlockMatcher::new(MatchConfig {
                    metric,
                    search_range: 15,
                    ..MatchConfig::default()
                });
                matcher.reset(prev.clone(), next.clone(), 8, false).unwrap();
                black_box(matcher.vector_field().unwrap().len())
            });
        });
    }

    c.bench_function("dense_mad", |b| {
        b.iter(|| {
            let mut matcher = BlockMatcher::new(MatchConfig {
                search_range: 15,
                ..MatchConfig::default()
            });
            matcher.reset(prev.clone(), next.clone(), 8, true).unwrap();
            black_box(matcher.vector_field().unwrap().len())
        });
    });

    if cfg!(feature = "rayon") {
        c.bench_function("lattice_mad_parallel", |b| {
            b.iter(|| {
                let mut matcher = BlockMatcher::new(MatchConfig {
                    search_range: 15,
                    parallel: true,
                    ..MatchConfig::default()
                });
                matcher.reset(prev.clone(), next.clone(), 8, false).unwrap();
                black_box(matcher.vector_field().unwrap().len())
            });
        });
    }

    let labels: RegionMap = Frame::from_fn(160, 120, |x, y| ((x / 20) + 8 * (y / 20)) as i32);
    c.bench_function("regions_mad_nearest", |b| {
        b.iter(|| {
            let mut matcher = BlockMatcher::new(MatchConfig {
                search_range: 9,
                region_metric: RegionMetric::MadNearestIntensity,
                ..MatchConfig::default()
            });
            matcher
                .reset_regions(prev.clone(), next.clone(), &labels, &labels)
                .unwrap();
            black_box(matcher.vector_field().unwrap().len())
        });
    });
}

fn bench_compensation(c: &mut Criterion) {
    let prev = make_frame(320, 240);
    let next = shifted(&prev, 2, 1);
    let matcher = BlockMatcher::lattice(prev.clone(), next.clone(), 16, false).unwrap();
    let field = matcher.vector_field().unwrap();

    c.bench_function("compensate_backward", |b| {
        b.iter(|| {
            let mut comp = MotionCompensator::new(prev.clone(), next.clone(), field).unwrap();
            black_box(comp.create_image_estimated(0.5, None).unwrap().len())
        });
    });

    c.bench_function("compensate_forward", |b| {
        b.iter(|| {
            let mut comp = MotionCompensator::new(prev.clone(), next.clone(), field).unwrap();
            black_box(comp.create_image_compensated_forward(None).unwrap().len())
        });
    });
}

criterion_group!(benches, bench_matching, bench_compensation);
criterion_main!(benches);
