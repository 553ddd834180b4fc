//! Fixed-lattice block search.
//!
//! The target frame is cut into non-overlapping `block_size` blocks (the last
//! row and column may be narrower). Each block is compared against every
//! displaced block of the reference frame that lies fully inside it.

use crate::cost::Metric;
use crate::image::{Frame, ImageView};
use crate::matching::candidate::{Best, Candidate, SearchWindow};
use crate::matching::map_cells;
use crate::pixel::Pixel;
use crate::trace::trace_span;
use crate::util::{MotionError, MotionResult};
use crate::vector::MotionVector;

/// Pixel rectangle covered by one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRect {
    /// Left column.
    pub x: usize,
    /// Top row.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

/// Partition of a frame into `block_size` blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    width: usize,
    height: usize,
    block_size: usize,
    cells_width: usize,
    cells_height: usize,
}

impl BlockGrid {
    /// Validates `0 < block_size <= min(width, height)`.
    pub fn new(width: usize, height: usize, block_size: usize) -> MotionResult<Self> {
        if width == 0 || height == 0 {
            return Err(MotionError::InvalidDimensions { width, height });
        }
        if block_size == 0 || block_size > width.min(height) {
            return Err(MotionError::InvalidBlockSize {
                block_size,
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            block_size,
            cells_width: width.div_ceil(block_size),
            cells_height: height.div_ceil(block_size),
        })
    }

    /// Edge length of a full block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Blocks per row, `ceil(width / block_size)`.
    pub fn cells_width(&self) -> usize {
        self.cells_width
    }

    /// Blocks per column, `ceil(height / block_size)`.
    pub fn cells_height(&self) -> usize {
        self.cells_height
    }

    /// Total block count.
    pub fn len(&self) -> usize {
        self.cells_width * self.cells_height
    }

    /// Grids always hold at least one block.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block containing pixel `(x, y)`.
    pub fn cell_of(&self, x: usize, y: usize) -> (usize, usize) {
        (x / self.block_size, y / self.block_size)
    }

    /// Pixel rectangle of block `(bx, by)`, clipped to the frame.
    pub fn rect(&self, bx: usize, by: usize) -> BlockRect {
        let x = bx * self.block_size;
        let y = by * self.block_size;
        BlockRect {
            x,
            y,
            width: self.block_size.min(self.width.saturating_sub(x)),
            height: self.block_size.min(self.height.saturating_sub(y)),
        }
    }

    /// Rectangle of the block at row-major index `idx`.
    pub(crate) fn rect_at(&self, idx: usize) -> BlockRect {
        self.rect(idx % self.cells_width, idx / self.cells_width)
    }
}

/// Finds the displacement minimizing `metric` for one block.
pub(crate) fn search_block<T: Pixel>(
    reference: ImageView<'_, T>,
    target: ImageView<'_, T>,
    rect: BlockRect,
    window: SearchWindow,
    metric: Metric,
) -> MotionResult<MotionVector> {
    let block = target.roi(rect.x, rect.y, rect.width, rect.height)?;
    let max_x = (reference.width() - rect.width) as isize;
    let max_y = (reference.height() - rect.height) as isize;

    let mut best = Best::default();
    for (dx, dy) in window.displacements() {
        let cx = rect.x as isize + dx;
        let cy = rect.y as isize + dy;
        if cx < 0 || cy < 0 || cx > max_x || cy > max_y {
            continue;
        }
        let candidate = reference.roi(cx as usize, cy as usize, rect.width, rect.height)?;
        let cost = metric.score(candidate, block)?;
        best.push(Candidate { dx, dy, cost });
    }
    Ok(best.into_vector())
}

/// Searches every block of `grid`, skipping blocks flagged in `skip`.
///
/// Skipped blocks receive the zero vector. Output is row-major over blocks.
pub(crate) fn match_lattice<T: Pixel>(
    reference: &Frame<T>,
    target: &Frame<T>,
    grid: BlockGrid,
    window: SearchWindow,
    metric: Metric,
    skip: Option<&[bool]>,
    parallel: bool,
) -> MotionResult<Vec<MotionVector>> {
    let _span = trace_span!(
        "lattice_search",
        blocks = grid.len(),
        block_size = grid.block_size(),
        parallel = parallel
    )
    .entered();

    let reference = reference.view()?;
    let target = target.view()?;
    map_cells(grid.len(), parallel, |idx| {
        if skip.is_some_and(|s| s.get(idx).copied().unwrap_or(false)) {
            return Ok(MotionVector::ZERO);
        }
        search_block(reference, target, grid.rect_at(idx), window, metric)
    })
}
