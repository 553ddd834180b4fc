//! Blockmotion estimates motion between two frames by block matching and
//! synthesizes motion-compensated predictions from the estimated field.
//!
//! The [`BlockMatcher`] searches a bounded displacement window over
//! fixed-lattice blocks, a densified lattice or arbitrarily shaped connected
//! regions of a segmentation map. The [`MotionCompensator`] resamples the
//! reference frame along a vector field, optionally scaled, masked or given
//! at a coarser resolution. Parallel search is available through the `rayon`
//! feature and an `f32` SIMD kernel through `simd`.

pub mod compensate;
pub mod cost;
pub mod field;
pub mod image;
pub mod interpolate;
pub(crate) mod kernel;
pub mod lowlevel;
pub mod matching;
pub mod pixel;
pub mod region;
mod trace;
pub mod util;
pub mod vector;

pub use compensate::{MotionCompensator, Warp};
pub use cost::{Metric, RegionMetric};
pub use field::{Mask, RegionMap, VectorField};
pub use image::{Frame, ImageView};
pub use matching::{
    BlockMatcher, DenseInterpolation, MatchConfig, MatchMode, MatchState, DEFAULT_SEARCH_RANGE,
};
pub use pixel::Pixel;
pub use region::{ConnectedRegion, Connectivity};
pub use util::{MotionError, MotionResult};
pub use vector::MotionVector;
