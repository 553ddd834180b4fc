//! Arbitrary-shaped matching over connected regions.
//!
//! Each connected region of the reference label map is searched as a whole
//! and its winning vector is written to every pixel of the region.

use crate::cost::RegionMetric;
use crate::field::VectorField;
use crate::image::Frame;
use crate::interpolate::fill_from_nearest;
use crate::matching::candidate::{Best, Candidate, SearchWindow};
use crate::matching::{map_cells, MatchConfig};
use crate::pixel::Pixel;
use crate::region::{ConnectedRegion, RegionSupport};
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::math::variance;
use crate::util::MotionResult;
use crate::vector::MotionVector;

/// Finds the displacement minimizing `metric` for one region.
pub(crate) fn search_region<T: Pixel>(
    reference: &Frame<T>,
    target: &Frame<T>,
    region: &ConnectedRegion,
    window: SearchWindow,
    metric: RegionMetric,
) -> MotionResult<MotionVector> {
    let mut best = Best::default();
    for (dx, dy) in window.displacements() {
        let cost = metric.score(reference, target, region, dx, dy)?;
        best.push(Candidate { dx, dy, cost });
    }
    let winner = best.into_inner();
    if let Some(c) = winner {
        trace_debug!(
            "region_match",
            label = region.label(),
            pixels = region.len(),
            cost = c.cost
        );
    }
    Ok(winner.map_or(MotionVector::ZERO, Candidate::vector))
}

fn region_is_flat<T: Pixel>(frame: &Frame<T>, region: &ConnectedRegion, threshold: f64) -> bool {
    variance(region.pixels().iter().map(|&(x, y)| frame[(x, y)].intensity())) < threshold
}

pub(crate) fn match_arbitrary<T: Pixel>(
    prev: &Frame<T>,
    next: &Frame<T>,
    support: &RegionSupport<T>,
    window: SearchWindow,
    config: &MatchConfig,
) -> MotionResult<VectorField> {
    let regions = &support.regions_prev;
    let _span = trace_span!(
        "region_match",
        regions = regions.len(),
        quantized = config.use_quantized
    )
    .entered();

    let (reference, target) = if config.use_quantized {
        (&support.quantized_prev, &support.quantized_next)
    } else {
        (prev, next)
    };

    let flat: Vec<bool> = if config.interpolate_flat_regions {
        regions
            .iter()
            .map(|r| region_is_flat(next, r, config.flat_variance_threshold))
            .collect()
    } else {
        vec![false; regions.len()]
    };

    let mut vectors = map_cells(regions.len(), config.parallel, |i| {
        if flat[i] {
            return Ok(MotionVector::ZERO);
        }
        search_region(reference, target, &regions[i], window, config.region_metric)
    })?;

    let targets: Vec<usize> = (0..regions.len()).filter(|&i| flat[i]).collect();
    if !targets.is_empty() {
        let centers: Vec<(f64, f64)> = regions
            .iter()
            .map(|r| r.centroid().unwrap_or((0.0, 0.0)))
            .collect();
        let mut estimated: Vec<bool> = flat.iter().map(|&f| !f).collect();
        let filled = fill_from_nearest(&centers, &targets, &mut estimated, &mut vectors);
        trace_event!("flat_regions", flat = targets.len(), filled = filled);
    }

    let mut field = VectorField::filled(next.width(), next.height(), MotionVector::ZERO);
    for (region, &v) in regions.iter().zip(&vectors) {
        for &(x, y) in region.pixels() {
            field[(x, y)] = v;
        }
    }
    Ok(field)
}
