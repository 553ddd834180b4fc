//! Block matching engine.
//!
//! A [`BlockMatcher`] binds a frame pair in one of three modes and estimates
//! the motion field lazily on first read:
//!
//! - [`MatchMode::Lattice`]: one vector per `block_size` block of the target
//!   frame.
//! - [`MatchMode::DenseLattice`]: lattice search, flat-block interpolation,
//!   then one vector per pixel.
//! - [`MatchMode::ArbitraryShaped`]: one vector per connected region of the
//!   reference label map, replicated over the region's pixels.
//!
//! Vectors are backward: the target pixel `p` is predicted by the reference
//! sample at `p + v`.

mod arbitrary;
pub(crate) mod candidate;
mod dense;
pub mod lattice;

pub use candidate::SearchWindow;
pub use lattice::{BlockGrid, BlockRect};

use crate::cost::{Metric, RegionMetric};
use crate::field::{RegionMap, VectorField};
use crate::image::Frame;
use crate::pixel::Pixel;
use crate::region::{Connectivity, ConnectedRegion, RegionSupport};
use crate::trace::{trace_event, trace_span};
use crate::util::{MotionError, MotionResult};
use crate::vector::MotionVector;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::sync::OnceLock;

/// Default search range: displacements in `[-20, 20]`.
pub const DEFAULT_SEARCH_RANGE: usize = 41;

/// How a dense field is produced from block vectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DenseInterpolation {
    /// Every pixel takes its block's vector.
    Replicate,
    /// Bilinear blend between neighbouring block-centre vectors.
    #[default]
    Bilinear,
}

/// Configuration for block matching.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Metric for rectangular blocks.
    pub metric: Metric,
    /// Metric for connected regions.
    pub region_metric: RegionMetric,
    /// Total window extent; components range over `[-range/2, range/2]`.
    pub search_range: usize,
    /// Blocks (and regions, when enabled) whose target-frame intensity
    /// variance falls below this value are interpolated instead of searched.
    pub flat_variance_threshold: f64,
    /// Neighbourhood used to extract connected regions.
    pub connectivity: Connectivity,
    /// Densification strategy for dense lattice mode.
    pub dense_interpolation: DenseInterpolation,
    /// Match regions on the region-mean quantized frames.
    pub use_quantized: bool,
    /// Apply flat detection and interpolation to regions.
    pub interpolate_flat_regions: bool,
    /// Search blocks and regions in parallel (requires `rayon`).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            metric: Metric::Mad,
            region_metric: RegionMetric::Mad,
            search_range: DEFAULT_SEARCH_RANGE,
            flat_variance_threshold: 1.0,
            connectivity: Connectivity::Four,
            dense_interpolation: DenseInterpolation::Bilinear,
            use_quantized: false,
            interpolate_flat_regions: false,
            parallel: false,
        }
    }
}

/// Matching strategy of a bound matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    /// One vector per block.
    Lattice,
    /// One vector per pixel derived from block vectors.
    DenseLattice,
    /// One vector per connected region.
    ArbitraryShaped,
}

impl MatchMode {
    fn name(self) -> &'static str {
        match self {
            MatchMode::Lattice => "lattice",
            MatchMode::DenseLattice => "dense lattice",
            MatchMode::ArbitraryShaped => "arbitrary-shaped",
        }
    }
}

/// Lifecycle of a [`BlockMatcher`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchState {
    /// No frame pair bound (the NULL state).
    Unbound,
    /// Frames bound; the field has not been computed yet.
    Bound,
    /// The field is computed and cached.
    Matched,
}

enum Layout<T> {
    Lattice { grid: BlockGrid, dense: bool },
    Arbitrary(RegionSupport<T>),
}

struct MotionEstimate {
    field: VectorField,
    block_field: Option<VectorField>,
}

struct Session<T> {
    prev: Frame<T>,
    next: Frame<T>,
    layout: Layout<T>,
    window: SearchWindow,
    estimate: OnceLock<MotionResult<MotionEstimate>>,
}

impl<T: Pixel> Session<T> {
    fn mode(&self) -> MatchMode {
        match self.layout {
            Layout::Lattice { dense: false, .. } => MatchMode::Lattice,
            Layout::Lattice { dense: true, .. } => MatchMode::DenseLattice,
            Layout::Arbitrary(_) => MatchMode::ArbitraryShaped,
        }
    }

    fn estimate(&self, config: &MatchConfig) -> MotionResult<&MotionEstimate> {
        self.estimate
            .get_or_init(|| self.compute(config))
            .as_ref()
            .map_err(|e| e.clone())
    }

    fn compute(&self, config: &MatchConfig) -> MotionResult<MotionEstimate> {
        let _span = trace_span!(
            "block_matching",
            mode = self.mode().name(),
            width = self.next.width(),
            height = self.next.height(),
            half_extent = self.window.half_extent()
        )
        .entered();

        let estimate = match &self.layout {
            Layout::Lattice { grid, dense: false } => {
                let vectors = lattice::match_lattice(
                    &self.prev,
                    &self.next,
                    *grid,
                    self.window,
                    config.metric,
                    None,
                    config.parallel,
                )?;
                MotionEstimate {
                    field: Frame::from_vec(vectors, grid.cells_width(), grid.cells_height())?,
                    block_field: None,
                }
            }
            Layout::Lattice { grid, dense: true } => {
                let dense =
                    dense::match_dense(&self.prev, &self.next, *grid, self.window, config)?;
                MotionEstimate {
                    field: dense.field,
                    block_field: Some(dense.block_field),
                }
            }
            Layout::Arbitrary(support) => MotionEstimate {
                field: arbitrary::match_arbitrary(
                    &self.prev,
                    &self.next,
                    support,
                    self.window,
                    config,
                )?,
                block_field: None,
            },
        };
        trace_event!(
            "field_ready",
            width = estimate.field.width(),
            height = estimate.field.height()
        );
        Ok(estimate)
    }
}

enum Binding<T> {
    Unbound,
    Bound(Box<Session<T>>),
}

/// Block matcher bound to one frame pair.
///
/// `prev` is the reference frame and `next` the target frame whose blocks or
/// regions are searched for.
pub struct BlockMatcher<T> {
    config: MatchConfig,
    binding: Binding<T>,
}

impl<T: Pixel> Default for BlockMatcher<T> {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl<T: Pixel> BlockMatcher<T> {
    /// Creates an unbound matcher.
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            binding: Binding::Unbound,
        }
    }

    /// Binds a frame pair in lattice (`dense = false`) or dense lattice mode
    /// with the default configuration.
    pub fn lattice(
        prev: Frame<T>,
        next: Frame<T>,
        block_size: usize,
        dense: bool,
    ) -> MotionResult<Self> {
        let mut matcher = Self::default();
        matcher.reset(prev, next, block_size, dense)?;
        Ok(matcher)
    }

    /// Binds a frame pair in arbitrary-shaped mode with the default
    /// configuration.
    pub fn arbitrary_shaped(
        prev: Frame<T>,
        next: Frame<T>,
        region_prev: &RegionMap,
        region_next: &RegionMap,
    ) -> MotionResult<Self> {
        let mut matcher = Self::default();
        matcher.reset_regions(prev, next, region_prev, region_next)?;
        Ok(matcher)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Rebinds to a new frame pair in lattice or dense lattice mode.
    ///
    /// Two empty frames return the matcher to the unbound state. On error the
    /// previous binding is left untouched.
    pub fn reset(
        &mut self,
        prev: Frame<T>,
        next: Frame<T>,
        block_size: usize,
        dense: bool,
    ) -> MotionResult<()> {
        if !check_pair(&prev, &next)? {
            self.binding = Binding::Unbound;
            return Ok(());
        }
        let grid = BlockGrid::new(next.width(), next.height(), block_size)?;
        self.bind(prev, next, Layout::Lattice { grid, dense })
    }

    /// Rebinds to a new frame pair and label-map pair in arbitrary-shaped
    /// mode.
    pub fn reset_regions(
        &mut self,
        prev: Frame<T>,
        next: Frame<T>,
        region_prev: &RegionMap,
        region_next: &RegionMap,
    ) -> MotionResult<()> {
        if !check_pair(&prev, &next)? {
            self.binding = Binding::Unbound;
            return Ok(());
        }
        let support = RegionSupport::build(
            &prev,
            &next,
            region_prev,
            region_next,
            self.config.connectivity,
        )?;
        self.bind(prev, next, Layout::Arbitrary(support))
    }

    fn bind(&mut self, prev: Frame<T>, next: Frame<T>, layout: Layout<T>) -> MotionResult<()> {
        let window = SearchWindow::new(self.config.search_range)?;
        self.binding = Binding::Bound(Box::new(Session {
            prev,
            next,
            layout,
            window,
            estimate: OnceLock::new(),
        }));
        Ok(())
    }

    fn session(&self) -> MotionResult<&Session<T>> {
        match &self.binding {
            Binding::Bound(session) => Ok(&**session),
            Binding::Unbound => Err(MotionError::Unbound),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MatchState {
        match &self.binding {
            Binding::Unbound => MatchState::Unbound,
            Binding::Bound(session) => match session.estimate.get() {
                Some(Ok(_)) => MatchState::Matched,
                _ => MatchState::Bound,
            },
        }
    }

    /// Bound mode, `None` when unbound.
    pub fn mode(&self) -> Option<MatchMode> {
        self.session().ok().map(Session::mode)
    }

    /// Returns `true` when no frame pair is bound.
    pub fn is_null(&self) -> bool {
        matches!(self.binding, Binding::Unbound)
    }

    /// Frame width, 0 when unbound.
    pub fn width(&self) -> usize {
        self.session().map_or(0, |s| s.next.width())
    }

    /// Frame height, 0 when unbound.
    pub fn height(&self) -> usize {
        self.session().map_or(0, |s| s.next.height())
    }

    /// Block size in lattice modes.
    pub fn block_size(&self) -> Option<usize> {
        match &self.session().ok()?.layout {
            Layout::Lattice { grid, .. } => Some(grid.block_size()),
            Layout::Arbitrary(_) => None,
        }
    }

    /// Connected regions of the reference label map in arbitrary-shaped mode.
    pub fn regions(&self) -> Option<&[ConnectedRegion]> {
        match &self.session().ok()?.layout {
            Layout::Arbitrary(support) => Some(&support.regions_prev),
            Layout::Lattice { .. } => None,
        }
    }

    /// Connected regions of the target label map in arbitrary-shaped mode.
    pub fn regions_next(&self) -> Option<&[ConnectedRegion]> {
        match &self.session().ok()?.layout {
            Layout::Arbitrary(support) => Some(&support.regions_next),
            Layout::Lattice { .. } => None,
        }
    }

    /// Width of the vector field this mode produces, 0 when unbound.
    pub fn vector_field_width(&self) -> usize {
        self.session().map_or(0, |s| match &s.layout {
            Layout::Lattice { grid, dense: false } => grid.cells_width(),
            _ => s.next.width(),
        })
    }

    /// Height of the vector field this mode produces, 0 when unbound.
    pub fn vector_field_height(&self) -> usize {
        self.session().map_or(0, |s| match &s.layout {
            Layout::Lattice { grid, dense: false } => grid.cells_height(),
            _ => s.next.height(),
        })
    }

    /// Recomputes the field over a window of total extent `search_range`.
    pub fn block_matching(&mut self, search_range: usize) -> MotionResult<&VectorField> {
        let window = SearchWindow::new(search_range)?;
        match &mut self.binding {
            Binding::Bound(session) => {
                session.window = window;
                session.estimate = OnceLock::new();
            }
            Binding::Unbound => return Err(MotionError::Unbound),
        }
        self.config.search_range = search_range;
        self.vector_field()
    }

    /// The motion field, computed on first access.
    pub fn vector_field(&self) -> MotionResult<&VectorField> {
        let session = self.session()?;
        Ok(&session.estimate(&self.config)?.field)
    }

    /// Vector of pixel `(x, y)`.
    ///
    /// In lattice mode this is the vector of the containing block.
    pub fn get(&self, x: usize, y: usize) -> MotionResult<MotionVector> {
        let session = self.session()?;
        let (w, h) = session.next.dims();
        if x >= w || y >= h {
            return Err(MotionError::IndexOutOfBounds {
                index: y.saturating_mul(w).saturating_add(x),
                len: w * h,
                context: "pixel",
            });
        }
        let field = &session.estimate(&self.config)?.field;
        let (fx, fy) = match &session.layout {
            Layout::Lattice { grid, dense: false } => grid.cell_of(x, y),
            _ => (x, y),
        };
        Ok(field[(fx, fy)])
    }

    /// Vector of block `(bx, by)` in lattice and dense lattice modes.
    pub fn get_block(&self, bx: usize, by: usize) -> MotionResult<MotionVector> {
        let session = self.session()?;
        let grid = match &session.layout {
            Layout::Lattice { grid, .. } => *grid,
            Layout::Arbitrary(_) => {
                return Err(MotionError::UnsupportedMode {
                    operation: "block lookup",
                    mode: session.mode().name(),
                })
            }
        };
        if bx >= grid.cells_width() || by >= grid.cells_height() {
            return Err(MotionError::IndexOutOfBounds {
                index: by.saturating_mul(grid.cells_width()).saturating_add(bx),
                len: grid.len(),
                context: "block",
            });
        }
        let estimate = session.estimate(&self.config)?;
        let blocks = estimate.block_field.as_ref().unwrap_or(&estimate.field);
        Ok(blocks[(bx, by)])
    }

    /// Block-level field of dense lattice mode (before densification).
    pub fn block_field(&self) -> MotionResult<&VectorField> {
        let session = self.session()?;
        let estimate = session.estimate(&self.config)?;
        match (&session.layout, &estimate.block_field) {
            (_, Some(blocks)) => Ok(blocks),
            (Layout::Lattice { .. }, None) => Ok(&estimate.field),
            (Layout::Arbitrary(_), None) => Err(MotionError::UnsupportedMode {
                operation: "block field",
                mode: session.mode().name(),
            }),
        }
    }

    /// Bound reference frame.
    pub fn prev(&self) -> Option<&Frame<T>> {
        self.session().ok().map(|s| &s.prev)
    }

    /// Bound target frame.
    pub fn next(&self) -> Option<&Frame<T>> {
        self.session().ok().map(|s| &s.next)
    }
}

/// Validates a frame pair; `Ok(false)` means both frames are empty.
fn check_pair<T>(prev: &Frame<T>, next: &Frame<T>) -> MotionResult<bool> {
    match (prev.is_null(), next.is_null()) {
        (true, true) => Ok(false),
        (true, false) => Err(MotionError::EmptyInput {
            context: "prev frame",
        }),
        (false, true) => Err(MotionError::EmptyInput {
            context: "next frame",
        }),
        (false, false) if prev.dims() != next.dims() => Err(MotionError::DimensionMismatch {
            expected: prev.dims(),
            got: next.dims(),
            context: "next frame",
        }),
        (false, false) => Ok(true),
    }
}

/// Evaluates `f` for every cell index, in parallel when requested.
#[cfg(feature = "rayon")]
pub(crate) fn map_cells<F>(count: usize, parallel: bool, f: F) -> MotionResult<Vec<MotionVector>>
where
    F: Fn(usize) -> MotionResult<MotionVector> + Send + Sync,
{
    if parallel {
        (0..count).into_par_iter().map(f).collect()
    } else {
        (0..count).map(f).collect()
    }
}

/// Evaluates `f` for every cell index.
#[cfg(not(feature = "rayon"))]
pub(crate) fn map_cells<F>(count: usize, _parallel: bool, f: F) -> MotionResult<Vec<MotionVector>>
where
    F: Fn(usize) -> MotionResult<MotionVector> + Send + Sync,
{
    (0..count).map(f).collect()
}
