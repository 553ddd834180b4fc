//! SIMD row kernels using the `wide` crate.
//!
//! Processes eight `f32` samples per step with `f32x8`; the tail falls back to
//! scalar arithmetic.

use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Horizontal sum accumulated in `f64`.
#[inline]
fn hsum(v: f32x8) -> f64 {
    v.to_array().iter().map(|&x| x as f64).sum()
}

/// Sum of absolute differences over two `f32` rows of equal length.
pub(crate) fn sad_row_f32(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let len = a.len().min(b.len());
    let simd_end = len / LANES * LANES;

    let mut acc = f32x8::ZERO;
    let mut i = 0;
    while i < simd_end {
        let va = load_f32x8(&a[i..]);
        let vb = load_f32x8(&b[i..]);
        acc += (va - vb).abs();
        i += LANES;
    }

    let mut tail = 0.0f64;
    while i < len {
        tail += (a[i] as f64 - b[i] as f64).abs();
        i += 1;
    }

    hsum(acc) + tail
}

#[cfg(test)]
mod tests {
    use super::sad_row_f32;
    use crate::kernel::scalar::sad_row;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn simd_sad_matches_scalar() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [0usize, 3, 8, 13, 64, 77] {
            let a: Vec<f32> = (0..len).map(|_| rng.random_range(0.0..255.0)).collect();
            let b: Vec<f32> = (0..len).map(|_| rng.random_range(0.0..255.0)).collect();
            let simd = sad_row_f32(&a, &b);
            let scalar = sad_row(&a, &b);
            assert!((simd - scalar).abs() <= 1e-4 * (1.0 + scalar));
        }
    }
}
