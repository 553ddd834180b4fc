//! Row-level dissimilarity kernels.
//!
//! The scalar kernel is generic over [`Pixel`](crate::Pixel); the SIMD kernel
//! covers `f32` samples and is selected through `Pixel::sad_row` when the
//! `simd` feature is enabled.

pub(crate) mod scalar;

#[cfg(feature = "simd")]
pub(crate) mod simd;
