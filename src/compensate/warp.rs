//! Resampling kernels for backward and forward compensation.

use crate::field::{Mask, VectorField};
use crate::image::Frame;
use crate::pixel::Pixel;
use crate::util::MotionResult;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Inputs shared by both warp directions. All frames have equal dimensions.
#[derive(Clone, Copy)]
pub(crate) struct WarpInputs<'a, T> {
    pub(crate) prev: &'a Frame<T>,
    pub(crate) next: &'a Frame<T>,
    pub(crate) field: &'a VectorField,
    pub(crate) scale: f64,
    pub(crate) mask: Option<&'a Mask>,
}

impl<T: Pixel> WarpInputs<'_, T> {
    #[inline]
    fn resamples(&self, x: usize, y: usize) -> bool {
        self.mask.map_or(true, |m| m[(x, y)])
    }

    fn backward_row(&self, y: usize, row: &mut [T]) {
        for (x, out) in row.iter_mut().enumerate() {
            *out = if self.resamples(x, y) {
                let v = self.field[(x, y)] * self.scale;
                self.prev.sample_zeropad(x as f64 + v.x, y as f64 + v.y)
            } else {
                self.next[(x, y)]
            };
        }
    }
}

/// `out(p) = prev(p + scale * v(p))` with zero padding; masked-out pixels
/// copy `next`.
pub(crate) fn warp_backward<T: Pixel>(
    inputs: WarpInputs<'_, T>,
    parallel: bool,
) -> MotionResult<Frame<T>> {
    let (width, height) = inputs.prev.dims();
    let mut data = vec![T::default(); width * height];
    fill_rows(&mut data, width, parallel, |y, row| inputs.backward_row(y, row));
    Frame::from_vec(data, width, height)
}

#[cfg(feature = "rayon")]
fn fill_rows<T, F>(data: &mut [T], width: usize, parallel: bool, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if parallel {
        data.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    } else {
        data.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}

#[cfg(not(feature = "rayon"))]
fn fill_rows<T, F>(data: &mut [T], width: usize, _parallel: bool, f: F)
where
    F: Fn(usize, &mut [T]),
{
    data.chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Forward application of a field whose vectors are read as
/// source-to-destination.
///
/// Each destination pixel samples `prev` at `p + scale * v(p)` exactly like
/// [`warp_backward`], so several vectors pointing at one destination are not
/// resolved against each other. Callers that need true forward warping must
/// supply an injective field.
pub(crate) fn warp_forward<T: Pixel>(
    inputs: WarpInputs<'_, T>,
    parallel: bool,
) -> MotionResult<Frame<T>> {
    warp_backward(inputs, parallel)
}
