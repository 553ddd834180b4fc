//! Vector fields, label maps and masks.

use crate::image::Frame;
use crate::util::{MotionError, MotionResult};
use crate::vector::MotionVector;

/// One displacement per pixel (dense) or per block (lattice).
pub type VectorField = Frame<MotionVector>;

/// Integer segmentation labels, one per pixel.
pub type RegionMap = Frame<i32>;

/// Compensation mask: `true` resamples from the reference frame, `false`
/// keeps the target frame's value.
pub type Mask = Frame<bool>;

/// Projects a vector field onto a `width x height` pixel grid.
///
/// Each pixel takes the vector of the source cell
/// `(floor(x * vw / width), floor(y * vh / height))`. This is block
/// replication, not interpolation: cell boundaries stay visible. A field that
/// already has the target size is returned unchanged.
pub fn upsample_nearest(
    field: &VectorField,
    width: usize,
    height: usize,
) -> MotionResult<VectorField> {
    if field.is_null() {
        return Err(MotionError::EmptyInput {
            context: "vector field",
        });
    }
    if width == 0 || height == 0 {
        return Ok(VectorField::empty());
    }
    if field.dims() == (width, height) {
        return Ok(field.clone());
    }
    Ok(project_cells(
        field.as_slice(),
        field.width(),
        field.height(),
        width,
        height,
    ))
}

/// Same projection as [`upsample_nearest`] over a raw row-major slice of
/// `v_width * v_height` vectors.
pub fn upsample_nearest_raw(
    vectors: &[MotionVector],
    v_width: usize,
    v_height: usize,
    width: usize,
    height: usize,
) -> MotionResult<VectorField> {
    if v_width == 0 || v_height == 0 {
        return Err(MotionError::InvalidDimensions {
            width: v_width,
            height: v_height,
        });
    }
    let needed = v_width * v_height;
    if vectors.len() < needed {
        return Err(MotionError::BufferTooSmall {
            needed,
            got: vectors.len(),
        });
    }
    Ok(project_cells(vectors, v_width, v_height, width, height))
}

fn project_cells(
    cells: &[MotionVector],
    v_width: usize,
    v_height: usize,
    width: usize,
    height: usize,
) -> VectorField {
    Frame::from_fn(width, height, |x, y| {
        let cx = x * v_width / width;
        let cy = y * v_height / height;
        cells[cy * v_width + cx]
    })
}
