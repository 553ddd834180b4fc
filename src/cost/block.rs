//! Rectangular block metrics.

use crate::image::ImageView;
use crate::pixel::Pixel;
use crate::util::math::zncc_dissimilarity;
use crate::util::{MotionError, MotionResult};

/// Weight of the centre sample in [`mad_centered`]; every other sample has
/// weight one.
pub const CENTER_WEIGHT: f64 = 4.0;

fn check_same_shape<T>(a: &ImageView<'_, T>, b: &ImageView<'_, T>) -> MotionResult<()> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(MotionError::SupportSizeMismatch {
            left: a.sample_count(),
            right: b.sample_count(),
        });
    }
    Ok(())
}

/// Sum of absolute differences.
pub fn sad<T: Pixel>(a: ImageView<'_, T>, b: ImageView<'_, T>) -> MotionResult<f64> {
    check_same_shape(&a, &b)?;
    Ok(a.rows()
        .zip(b.rows())
        .map(|(ra, rb)| T::sad_row(ra, rb))
        .sum())
}

/// Mean absolute difference: [`sad`] divided by the sample count.
pub fn mad<T: Pixel>(a: ImageView<'_, T>, b: ImageView<'_, T>) -> MotionResult<f64> {
    let count = a.sample_count();
    Ok(sad(a, b)? / count as f64)
}

/// Zero-mean normalized cross-correlation as a dissimilarity (`1 - zncc`).
pub fn zncc<T: Pixel>(a: ImageView<'_, T>, b: ImageView<'_, T>) -> MotionResult<f64> {
    check_same_shape(&a, &b)?;
    let pairs = a.rows().zip(b.rows()).flat_map(|(ra, rb)| {
        ra.iter()
            .zip(rb.iter())
            .map(|(&p, &q)| (p.intensity(), q.intensity()))
    });
    Ok(zncc_dissimilarity(pairs))
}

/// MAD with the centre sample weighted by [`CENTER_WEIGHT`].
///
/// The centre is `(width / 2, height / 2)`; the result is normalized by the
/// total weight so it stays comparable to [`mad`].
pub fn mad_centered<T: Pixel>(a: ImageView<'_, T>, b: ImageView<'_, T>) -> MotionResult<f64> {
    check_same_shape(&a, &b)?;
    let cx = a.width() / 2;
    let cy = a.height() / 2;
    let center_err = match (a.get(cx, cy), b.get(cx, cy)) {
        (Some(&p), Some(&q)) => p.distance(q),
        _ => 0.0,
    };
    let total = sad(a, b)? + (CENTER_WEIGHT - 1.0) * center_err;
    let weight = a.sample_count() as f64 + CENTER_WEIGHT - 1.0;
    Ok(total / weight)
}
