//! Low-level building blocks for custom motion pipelines.
//!
//! These items expose the cost metrics, search geometry, region extraction
//! and field helpers used by [`BlockMatcher`](crate::BlockMatcher) and
//! [`MotionCompensator`](crate::MotionCompensator). Most users should prefer
//! those two types.

pub use crate::cost::{
    mad, mad_centered, mad_region, mad_region_nearest_intensity, sad, zncc, zncc_region,
    zncc_region_nearest_intensity, CENTER_WEIGHT,
};
pub use crate::field::{upsample_nearest, upsample_nearest_raw};
pub use crate::interpolate::vector_interpolation;
pub use crate::matching::{BlockGrid, BlockRect, SearchWindow};
pub use crate::region::{get_color_quantized_image, get_connected_region_list, validate_region_map};
