//! Pixel element abstraction.
//!
//! Every cost metric only needs a distance between two samples and a scalar
//! intensity; resampling and region averaging additionally need a weighted
//! accumulator. Scalars, RGB-like `[_; 3]` arrays and floating samples all
//! implement [`Pixel`].

use crate::kernel::scalar;

/// Element type stored in a [`Frame`](crate::Frame).
pub trait Pixel: Copy + Default + PartialEq + Send + Sync + 'static {
    /// Accumulator used for weighted sums (bilinear taps, region means).
    type Accum: Copy + Default + Send + Sync;

    /// Scalar intensity used for variance and correlation.
    fn intensity(self) -> f64;

    /// Non-negative distance between two samples.
    fn distance(self, other: Self) -> f64;

    /// Adds `weight * value` to `acc`.
    fn accumulate(acc: Self::Accum, value: Self, weight: f64) -> Self::Accum;

    /// Converts an accumulated value back to a sample, rounding and
    /// saturating for integer types.
    fn from_accum(acc: Self::Accum) -> Self;

    /// Sum of distances over two equally long rows.
    #[inline]
    fn sad_row(a: &[Self], b: &[Self]) -> f64 {
        scalar::sad_row(a, b)
    }
}

macro_rules! impl_integer_pixel {
    ($($t:ty),+) => {
        $(
            impl Pixel for $t {
                type Accum = f64;

                #[inline]
                fn intensity(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn distance(self, other: Self) -> f64 {
                    (self as f64 - other as f64).abs()
                }

                #[inline]
                fn accumulate(acc: f64, value: Self, weight: f64) -> f64 {
                    acc + weight * value as f64
                }

                #[inline]
                fn from_accum(acc: f64) -> Self {
                    acc.round().clamp(<$t>::MIN as f64, <$t>::MAX as f64) as $t
                }
            }
        )+
    };
}

impl_integer_pixel!(u8, u16, i16, i32);

impl Pixel for f32 {
    type Accum = f64;

    #[inline]
    fn intensity(self) -> f64 {
        self as f64
    }

    #[inline]
    fn distance(self, other: Self) -> f64 {
        (self as f64 - other as f64).abs()
    }

    #[inline]
    fn accumulate(acc: f64, value: Self, weight: f64) -> f64 {
        acc + weight * value as f64
    }

    #[inline]
    fn from_accum(acc: f64) -> Self {
        acc as f32
    }

    #[cfg(feature = "simd")]
    #[inline]
    fn sad_row(a: &[Self], b: &[Self]) -> f64 {
        crate::kernel::simd::sad_row_f32(a, b)
    }
}

impl Pixel for f64 {
    type Accum = f64;

    #[inline]
    fn intensity(self) -> f64 {
        self
    }

    #[inline]
    fn distance(self, other: Self) -> f64 {
        (self - other).abs()
    }

    #[inline]
    fn accumulate(acc: f64, value: Self, weight: f64) -> f64 {
        acc + weight * value
    }

    #[inline]
    fn from_accum(acc: f64) -> Self {
        acc
    }
}

macro_rules! impl_tristimulus_pixel {
    ($($t:ty),+) => {
        $(
            impl Pixel for [$t; 3] {
                type Accum = [f64; 3];

                /// Mean of the three channels.
                #[inline]
                fn intensity(self) -> f64 {
                    (self[0] as f64 + self[1] as f64 + self[2] as f64) / 3.0
                }

                /// Euclidean distance in channel space.
                #[inline]
                fn distance(self, other: Self) -> f64 {
                    let d0 = self[0] as f64 - other[0] as f64;
                    let d1 = self[1] as f64 - other[1] as f64;
                    let d2 = self[2] as f64 - other[2] as f64;
                    (d0 * d0 + d1 * d1 + d2 * d2).sqrt()
                }

                #[inline]
                fn accumulate(acc: [f64; 3], value: Self, weight: f64) -> [f64; 3] {
                    [
                        acc[0] + weight * value[0] as f64,
                        acc[1] + weight * value[1] as f64,
                        acc[2] + weight * value[2] as f64,
                    ]
                }

                #[inline]
                fn from_accum(acc: [f64; 3]) -> Self {
                    [
                        <$t as Pixel>::from_accum(acc[0]),
                        <$t as Pixel>::from_accum(acc[1]),
                        <$t as Pixel>::from_accum(acc[2]),
                    ]
                }
            }
        )+
    };
}

impl_tristimulus_pixel!(u8, f32, f64);
