//! Gap filling for flat (textureless) blocks and regions.
//!
//! A flat cell copies the vector of the spatially nearest matched cell. Ties
//! go to the matched cell that comes first in scan order. With no matched
//! cell at all the flat cell keeps the zero vector.

use crate::field::VectorField;
use crate::image::Frame;
use crate::trace::trace_event;
use crate::util::{MotionError, MotionResult};
use crate::vector::MotionVector;

/// Fills `flat_blocks` of a block-grid field from their nearest estimated
/// neighbours and marks the filled cells as estimated.
///
/// `estimated` must have the field's dimensions; cells flagged `true` on entry
/// are the only donors. Returns the number of cells that received a vector.
pub fn vector_interpolation(
    field: &mut VectorField,
    flat_blocks: &[(usize, usize)],
    estimated: &mut Frame<bool>,
) -> MotionResult<usize> {
    if estimated.dims() != field.dims() {
        return Err(MotionError::DimensionMismatch {
            expected: field.dims(),
            got: estimated.dims(),
            context: "estimated mask",
        });
    }
    let width = field.width();
    let mut targets = Vec::with_capacity(flat_blocks.len());
    for &(x, y) in flat_blocks {
        if x >= width || y >= field.height() {
            return Err(MotionError::IndexOutOfBounds {
                index: y.saturating_mul(width).saturating_add(x),
                len: field.len(),
                context: "flat block",
            });
        }
        targets.push(y * width + x);
    }

    let centers: Vec<(f64, f64)> = (0..field.len())
        .map(|i| ((i % width) as f64, (i / width) as f64))
        .collect();
    Ok(fill_from_nearest(
        &centers,
        &targets,
        estimated.as_mut_slice(),
        field.as_mut_slice(),
    ))
}

/// Core of the gap filling over cells with arbitrary centre positions.
///
/// Donors are the cells flagged in `estimated` before any filling happens, so
/// filled cells never feed other flat cells.
pub(crate) fn fill_from_nearest(
    centers: &[(f64, f64)],
    targets: &[usize],
    estimated: &mut [bool],
    vectors: &mut [MotionVector],
) -> usize {
    let donors: Vec<usize> = (0..estimated.len()).filter(|&i| estimated[i]).collect();
    if donors.is_empty() {
        for &t in targets {
            vectors[t] = MotionVector::ZERO;
        }
        trace_event!("interpolation_no_donors", flat = targets.len());
        return 0;
    }

    let mut filled = Vec::with_capacity(targets.len());
    for &t in targets {
        if estimated[t] {
            continue;
        }
        let (tx, ty) = centers[t];
        let mut best: Option<(f64, usize)> = None;
        for &d in &donors {
            let (dx, dy) = centers[d];
            let dist = (dx - tx) * (dx - tx) + (dy - ty) * (dy - ty);
            // strict `<` keeps the earliest donor in scan order on ties
            if best.map_or(true, |(b, _)| dist < b) {
                best = Some((dist, d));
            }
        }
        if let Some((_, d)) = best {
            filled.push((t, vectors[d]));
        }
    }

    for &(t, v) in &filled {
        vectors[t] = v;
        estimated[t] = true;
    }
    trace_event!("interpolation", flat = targets.len(), filled = filled.len());
    filled.len()
}

#[cfg(test)]
mod tests {
    use super::vector_interpolation;
    use crate::field::VectorField;
    use crate::image::Frame;
    use crate::vector::MotionVector;

    #[test]
    fn flat_block_copies_nearest_matched_neighbour() {
        let mut field = VectorField::filled(3, 1, MotionVector::ZERO);
        field[(0, 0)] = MotionVector::new(1.0, 0.0);
        field[(2, 0)] = MotionVector::new(0.0, 3.0);
        let mut estimated = Frame::from_vec(vec![true, false, true], 3, 1).unwrap();

        let filled = vector_interpolation(&mut field, &[(1, 0)], &mut estimated).unwrap();
        assert_eq!(filled, 1);
        // equidistant donors: the first in scan order wins
        assert_eq!(field[(1, 0)], MotionVector::new(1.0, 0.0));
        assert!(estimated[(1, 0)]);
    }

    #[test]
    fn isolated_blocks_keep_zero_vector() {
        let mut field = VectorField::filled(2, 2, MotionVector::new(5.0, 5.0));
        let mut estimated = Frame::filled(2, 2, false);
        let flat = [(0, 0), (1, 0), (0, 1), (1, 1)];
        let filled = vector_interpolation(&mut field, &flat, &mut estimated).unwrap();
        assert_eq!(filled, 0);
        assert!(field.as_slice().iter().all(|v| *v == MotionVector::ZERO));
    }

    #[test]
    fn nearer_donor_beats_scan_order() {
        let mut field = VectorField::filled(4, 1, MotionVector::ZERO);
        field[(0, 0)] = MotionVector::new(-1.0, 0.0);
        field[(3, 0)] = MotionVector::new(2.0, 0.0);
        let mut estimated = Frame::from_vec(vec![true, false, false, true], 4, 1).unwrap();
        vector_interpolation(&mut field, &[(1, 0), (2, 0)], &mut estimated).unwrap();
        assert_eq!(field[(1, 0)], MotionVector::new(-1.0, 0.0));
        assert_eq!(field[(2, 0)], MotionVector::new(2.0, 0.0));
    }
}
