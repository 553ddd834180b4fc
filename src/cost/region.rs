//! Region-shaped metrics over a connected region's pixel list.
//!
//! The target frame is read at each member pixel `p`; the reference frame is
//! read at `p + (dx, dy)`. The plain variants zero-pad displaced samples that
//! leave the frame; the `_nearest_intensity` variants substitute the nearest
//! in-bounds sample so partially off-frame regions are not biased towards
//! dark borders.

use crate::image::Frame;
use crate::pixel::Pixel;
use crate::region::ConnectedRegion;
use crate::util::math::zncc_dissimilarity;
use crate::util::{MotionError, MotionResult};

/// How displaced reference samples outside the frame are read.
#[derive(Clone, Copy)]
enum Border {
    Zero,
    Nearest,
}

impl Border {
    #[inline]
    fn read<T: Pixel>(self, frame: &Frame<T>, x: isize, y: isize) -> T {
        match self {
            Border::Zero => frame.get_zeropad(x, y),
            Border::Nearest => frame.get_clamped(x, y),
        }
    }
}

/// Collects `(reference, target)` sample pairs for one displacement.
fn sample_pairs<'r, T: Pixel>(
    reference: &'r Frame<T>,
    target: &'r Frame<T>,
    region: &'r ConnectedRegion,
    dx: isize,
    dy: isize,
    border: Border,
) -> MotionResult<impl Iterator<Item = (T, T)> + 'r> {
    if region.is_empty() {
        return Err(MotionError::EmptySupport);
    }
    if reference.dims() != target.dims() {
        return Err(MotionError::DimensionMismatch {
            expected: target.dims(),
            got: reference.dims(),
            context: "reference frame",
        });
    }
    // Member pixels are checked once up front so the iterator can index freely.
    if let Some(&(x, y)) = region
        .pixels()
        .iter()
        .find(|&&(x, y)| x >= target.width() || y >= target.height())
    {
        return Err(MotionError::RegionOutOfBounds { x, y });
    }
    Ok(region.pixels().iter().map(move |&(x, y)| {
        let r = border.read(reference, x as isize + dx, y as isize + dy);
        (r, target[(x, y)])
    }))
}

fn mad_with<T: Pixel>(
    reference: &Frame<T>,
    target: &Frame<T>,
    region: &ConnectedRegion,
    dx: isize,
    dy: isize,
    border: Border,
) -> MotionResult<f64> {
    let sum: f64 = sample_pairs(reference, target, region, dx, dy, border)?
        .map(|(r, t)| r.distance(t))
        .sum();
    Ok(sum / region.len() as f64)
}

fn zncc_with<T: Pixel>(
    reference: &Frame<T>,
    target: &Frame<T>,
    region: &ConnectedRegion,
    dx: isize,
    dy: isize,
    border: Border,
) -> MotionResult<f64> {
    let pairs = sample_pairs(reference, target, region, dx, dy, border)?
        .map(|(r, t)| (r.intensity(), t.intensity()));
    Ok(zncc_dissimilarity(pairs))
}

/// Region MAD with zero-padded reference samples.
pub fn mad_region<T: Pixel>(
    reference: &Frame<T>,
    target: &Frame<T>,
    region: &ConnectedRegion,
    dx: isize,
    dy: isize,
) -> MotionResult<f64> {
    mad_with(reference, target, region, dx, dy, Border::Zero)
}

/// Region `1 - ZNCC` with zero-padded reference samples.
pub fn zncc_region<T: Pixel>(
    reference: &Frame<T>,
    target: &Frame<T>,
    region: &ConnectedRegion,
    dx: isize,
    dy: isize,
) -> MotionResult<f64> {
    zncc_with(reference, target, region, dx, dy, Border::Zero)
}

/// Region MAD with off-frame reference samples replaced by the nearest
/// in-bounds sample.
pub fn mad_region_nearest_intensity<T: Pixel>(
    reference: &Frame<T>,
    target: &Frame<T>,
    region: &ConnectedRegion,
    dx: isize,
    dy: isize,
) -> MotionResult<f64> {
    mad_with(reference, target, region, dx, dy, Border::Nearest)
}

/// Region `1 - ZNCC` with off-frame reference samples replaced by the nearest
/// in-bounds sample.
pub fn zncc_region_nearest_intensity<T: Pixel>(
    reference: &Frame<T>,
    target: &Frame<T>,
    region: &ConnectedRegion,
    dx: isize,
    dy: isize,
) -> MotionResult<f64> {
    zncc_with(reference, target, region, dx, dy, Border::Nearest)
}

#[cfg(test)]
mod tests {
    use super::{mad_region, mad_region_nearest_intensity};
    use crate::image::Frame;
    use crate::region::ConnectedRegion;
    use crate::util::MotionError;

    #[test]
    fn empty_region_is_rejected() {
        let frame = Frame::filled(2, 2, 1.0f64);
        let region = ConnectedRegion::new(0, Vec::new());
        assert_eq!(
            mad_region(&frame, &frame, &region, 0, 0).err(),
            Some(MotionError::EmptySupport)
        );
    }

    #[test]
    fn off_frame_samples_zero_pad_or_clamp() {
        let frame = Frame::filled(3, 1, 50.0f64);
        let region = ConnectedRegion::new(0, vec![(0, 0), (1, 0), (2, 0)]);
        // Shifting right by one pushes the last sample off the frame.
        let zero = mad_region(&frame, &frame, &region, 1, 0).unwrap();
        let nearest = mad_region_nearest_intensity(&frame, &frame, &region, 1, 0).unwrap();
        assert!((zero - 50.0 / 3.0).abs() < 1e-12);
        assert_eq!(nearest, 0.0);
    }
}
