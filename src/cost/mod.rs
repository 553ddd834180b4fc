//! Dissimilarity metrics for candidate displacements.
//!
//! Every metric returns a non-negative score where lower is better.
//! Rectangular metrics compare two equally shaped [`ImageView`] supports;
//! region metrics walk a [`ConnectedRegion`]'s pixel list, sampling the target
//! frame at `p` and the reference frame at `p + d`.

mod block;
mod region;

pub use block::{mad, mad_centered, sad, zncc, CENTER_WEIGHT};
pub use region::{
    mad_region, mad_region_nearest_intensity, zncc_region, zncc_region_nearest_intensity,
};

use crate::image::{Frame, ImageView};
use crate::pixel::Pixel;
use crate::region::ConnectedRegion;
use crate::util::MotionResult;

/// Rectangular block metric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Metric {
    /// Sum of absolute differences.
    Sad,
    /// Mean absolute difference.
    #[default]
    Mad,
    /// `1 - ZNCC`.
    Zncc,
    /// MAD with extra weight on the centre sample.
    MadCentered,
}

impl Metric {
    /// Scores `reference` against `target`.
    pub fn score<T: Pixel>(
        self,
        reference: ImageView<'_, T>,
        target: ImageView<'_, T>,
    ) -> MotionResult<f64> {
        match self {
            Metric::Sad => sad(reference, target),
            Metric::Mad => mad(reference, target),
            Metric::Zncc => zncc(reference, target),
            Metric::MadCentered => mad_centered(reference, target),
        }
    }
}

/// Region metric used by arbitrary-shaped matching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegionMetric {
    /// Mean absolute difference; displaced samples outside the frame are zero.
    #[default]
    Mad,
    /// `1 - ZNCC`; displaced samples outside the frame are zero.
    Zncc,
    /// Mean absolute difference; displaced samples clamp to the frame.
    MadNearestIntensity,
    /// `1 - ZNCC`; displaced samples clamp to the frame.
    ZnccNearestIntensity,
}

impl RegionMetric {
    /// Scores displacement `(dx, dy)` for `region`.
    pub fn score<T: Pixel>(
        self,
        reference: &Frame<T>,
        target: &Frame<T>,
        region: &ConnectedRegion,
        dx: isize,
        dy: isize,
    ) -> MotionResult<f64> {
        match self {
            RegionMetric::Mad => mad_region(reference, target, region, dx, dy),
            RegionMetric::Zncc => zncc_region(reference, target, region, dx, dy),
            RegionMetric::MadNearestIntensity => {
                mad_region_nearest_intensity(reference, target, region, dx, dy)
            }
            RegionMetric::ZnccNearestIntensity => {
                zncc_region_nearest_intensity(reference, target, region, dx, dy)
            }
        }
    }
}
