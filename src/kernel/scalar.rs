//! Scalar reference kernels.

use crate::pixel::Pixel;

/// Sum of per-sample distances over two rows of equal length.
#[inline]
pub(crate) fn sad_row<T: Pixel>(a: &[T], b: &[T]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(&p, &q)| p.distance(q))
        .sum()
}
