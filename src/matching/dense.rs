//! Dense matching: lattice search with flat-block interpolation, then
//! per-pixel densification of the block field.

use crate::field::VectorField;
use crate::image::Frame;
use crate::interpolate::vector_interpolation;
use crate::matching::candidate::SearchWindow;
use crate::matching::lattice::{match_lattice, BlockGrid};
use crate::matching::{DenseInterpolation, MatchConfig};
use crate::pixel::Pixel;
use crate::trace::{trace_event, trace_span};
use crate::util::math::variance;
use crate::util::MotionResult;

/// Block-level and pixel-level result of a dense match.
pub(crate) struct DenseEstimate {
    pub(crate) block_field: VectorField,
    pub(crate) field: VectorField,
}

/// Flags blocks whose target-frame intensity variance is below `threshold`.
pub(crate) fn flat_blocks<T: Pixel>(
    target: &Frame<T>,
    grid: BlockGrid,
    threshold: f64,
) -> MotionResult<Vec<bool>> {
    let view = target.view()?;
    (0..grid.len())
        .map(|idx| {
            let r = grid.rect_at(idx);
            let block = view.roi(r.x, r.y, r.width, r.height)?;
            let v = variance(block.rows().flatten().map(|p| p.intensity()));
            Ok(v < threshold)
        })
        .collect()
}

pub(crate) fn match_dense<T: Pixel>(
    reference: &Frame<T>,
    target: &Frame<T>,
    grid: BlockGrid,
    window: SearchWindow,
    config: &MatchConfig,
) -> MotionResult<DenseEstimate> {
    let _span = trace_span!("dense_match", blocks = grid.len()).entered();

    let flat = flat_blocks(target, grid, config.flat_variance_threshold)?;
    let vectors = match_lattice(
        reference,
        target,
        grid,
        window,
        config.metric,
        Some(&flat),
        config.parallel,
    )?;

    let (cw, ch) = (grid.cells_width(), grid.cells_height());
    let mut block_field = Frame::from_vec(vectors, cw, ch)?;
    let mut estimated = Frame::from_vec(flat.iter().map(|&f| !f).collect(), cw, ch)?;
    let flat_cells: Vec<(usize, usize)> = flat
        .iter()
        .enumerate()
        .filter(|(_, &f)| f)
        .map(|(i, _)| (i % cw, i / cw))
        .collect();
    let filled = vector_interpolation(&mut block_field, &flat_cells, &mut estimated)?;
    trace_event!("flat_blocks", flat = flat_cells.len(), filled = filled);

    let field = densify(
        &block_field,
        grid,
        target.width(),
        target.height(),
        config.dense_interpolation,
    );
    Ok(DenseEstimate { block_field, field })
}

/// Expands a block field to one vector per pixel.
pub(crate) fn densify(
    block_field: &VectorField,
    grid: BlockGrid,
    width: usize,
    height: usize,
    mode: DenseInterpolation,
) -> VectorField {
    let bs = grid.block_size();
    match mode {
        DenseInterpolation::Replicate => {
            Frame::from_fn(width, height, |x, y| block_field[(x / bs, y / bs)])
        }
        DenseInterpolation::Bilinear => {
            let xs = axis_weights(width, bs, block_field.width());
            let ys = axis_weights(height, bs, block_field.height());
            Frame::from_fn(width, height, |x, y| {
                let (x0, x1, tx) = xs[x];
                let (y0, y1, ty) = ys[y];
                let top = block_field[(x0, y0)].lerp(block_field[(x1, y0)], tx);
                let bottom = block_field[(x0, y1)].lerp(block_field[(x1, y1)], tx);
                top.lerp(bottom, ty)
            })
        }
    }
}

/// Per-pixel neighbour cells and blend weight along one axis, using block
/// centres at `i * bs + (bs - 1) / 2`.
fn axis_weights(len: usize, bs: usize, cells: usize) -> Vec<(usize, usize, f64)> {
    let half = (bs as f64 - 1.0) / 2.0;
    let last = cells.saturating_sub(1);
    (0..len)
        .map(|p| {
            let f = ((p as f64 - half) / bs as f64).clamp(0.0, last as f64);
            let i0 = f.floor() as usize;
            let i1 = (i0 + 1).min(last);
            (i0, i1, f - i0 as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{densify, flat_blocks};
    use crate::image::Frame;
    use crate::matching::lattice::BlockGrid;
    use crate::matching::DenseInterpolation;
    use crate::vector::MotionVector;

    #[test]
    fn uniform_blocks_are_flat() {
        let frame = Frame::from_fn(8, 4, |x, _| if x < 4 { 7.0f64 } else { x as f64 * 10.0 });
        let grid = BlockGrid::new(8, 4, 4).unwrap();
        assert_eq!(flat_blocks(&frame, grid, 1.0).unwrap(), vec![true, false]);
    }

    #[test]
    fn replicate_copies_block_vector() {
        let grid = BlockGrid::new(6, 4, 3).unwrap();
        let blocks = Frame::from_vec(
            vec![
                MotionVector::new(1.0, 0.0),
                MotionVector::new(2.0, 0.0),
                MotionVector::new(3.0, 0.0),
                MotionVector::new(4.0, 0.0),
            ],
            2,
            2,
        )
        .unwrap();
        let dense = densify(&blocks, grid, 6, 4, DenseInterpolation::Replicate);
        assert_eq!(dense[(2, 2)], MotionVector::new(1.0, 0.0));
        assert_eq!(dense[(5, 3)], MotionVector::new(4.0, 0.0));
    }

    #[test]
    fn bilinear_hits_centres_and_blends_between() {
        let grid = BlockGrid::new(8, 4, 4).unwrap();
        let blocks = Frame::from_vec(
            vec![MotionVector::new(0.0, 0.0), MotionVector::new(4.0, 0.0)],
            2,
            1,
        )
        .unwrap();
        let dense = densify(&blocks, grid, 8, 4, DenseInterpolation::Bilinear);
        // centres at 1.5 and 5.5
        assert_eq!(dense[(0, 0)], MotionVector::ZERO);
        assert_eq!(dense[(7, 3)], MotionVector::new(4.0, 0.0));
        assert!((dense[(3, 1)].x - 1.5).abs() < 1e-12);
    }

    #[test]
    fn bilinear_is_exact_on_constant_field() {
        let grid = BlockGrid::new(9, 9, 4).unwrap();
        let v = MotionVector::new(-2.0, 1.0);
        let blocks = Frame::filled(3, 3, v);
        let dense = densify(&blocks, grid, 9, 9, DenseInterpolation::Bilinear);
        assert!(dense.as_slice().iter().all(|&d| d == v));
    }
}
