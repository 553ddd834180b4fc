//! Motion compensation engine.
//!
//! A [`MotionCompensator`] holds a frame pair and a per-pixel vector field and
//! synthesizes predicted frames from them. Fields coarser than the frames are
//! replicated to pixel resolution on assignment. The last compensated frame is
//! cached together with the request that produced it and is dropped whenever
//! the frames or the field change.

mod warp;

use crate::field::{upsample_nearest, upsample_nearest_raw, Mask, VectorField};
use crate::image::Frame;
use crate::pixel::Pixel;
use crate::trace::{trace_event, trace_span};
use crate::util::{MotionError, MotionResult};
use crate::vector::MotionVector;
use warp::{warp_backward, warp_forward, WarpInputs};

/// Direction in which vectors are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Warp {
    /// Each output pixel pulls from `prev` at `p + v(p)`.
    Backward,
    /// Vectors read as source-to-destination; sampled like `Backward`.
    Forward,
}

#[derive(Clone, Debug, PartialEq)]
struct CompensationRequest {
    warp: Warp,
    scale: f64,
    mask: Option<Mask>,
}

impl CompensationRequest {
    fn matches(&self, warp: Warp, scale: f64, mask: Option<&Mask>) -> bool {
        self.warp == warp && self.scale.to_bits() == scale.to_bits() && self.mask.as_ref() == mask
    }
}

#[derive(Clone, Debug, Default)]
enum CompensationState<T> {
    #[default]
    Stale,
    Compensated {
        request: CompensationRequest,
        image: Frame<T>,
    },
}

/// Synthesizes motion-compensated frames.
///
/// A `0x0` compensator is the NULL state; its accessors return `None` and its
/// builders fail with [`MotionError::EmptyInput`].
#[derive(Clone, Debug, Default)]
pub struct MotionCompensator<T> {
    prev: Frame<T>,
    next: Frame<T>,
    field: VectorField,
    parallel: bool,
    state: CompensationState<T>,
}

impl<T: Pixel> MotionCompensator<T> {
    /// Creates the NULL compensator.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Binds a frame pair and a vector field.
    ///
    /// A field smaller than the frames is replicated per cell to pixel
    /// resolution.
    pub fn new(prev: Frame<T>, next: Frame<T>, field: &VectorField) -> MotionResult<Self> {
        let mut compensator = Self::empty();
        compensator.set(prev, next, field)?;
        Ok(compensator)
    }

    /// Binds raw row-major buffers with a pixel-resolution field.
    ///
    /// A zero width or height yields the NULL compensator.
    pub fn from_raw(
        width: usize,
        height: usize,
        prev: &[T],
        next: &[T],
        vectors: &[MotionVector],
    ) -> MotionResult<Self> {
        let mut compensator = Self::empty();
        compensator.set_raw(width, height, prev, next, vectors)?;
        Ok(compensator)
    }

    /// Binds raw row-major buffers with a `v_width x v_height` field.
    pub fn from_raw_scaled(
        width: usize,
        height: usize,
        prev: &[T],
        next: &[T],
        v_width: usize,
        v_height: usize,
        vectors: &[MotionVector],
    ) -> MotionResult<Self> {
        let mut compensator = Self::empty();
        compensator.set_raw_scaled(width, height, prev, next, v_width, v_height, vectors)?;
        Ok(compensator)
    }

    /// Enables row-parallel backward warping (requires `rayon`).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replaces frames and field.
    pub fn set(&mut self, prev: Frame<T>, next: Frame<T>, field: &VectorField) -> MotionResult<()> {
        if prev.is_null() {
            return Err(MotionError::EmptyInput {
                context: "prev frame",
            });
        }
        if next.dims() != prev.dims() {
            return Err(MotionError::DimensionMismatch {
                expected: prev.dims(),
                got: next.dims(),
                context: "next frame",
            });
        }
        let field = upsample_nearest(field, prev.width(), prev.height())?;
        self.install(prev, next, field);
        Ok(())
    }

    /// Replaces frames and field from raw buffers; zero dimensions reset to
    /// the NULL state.
    pub fn set_raw(
        &mut self,
        width: usize,
        height: usize,
        prev: &[T],
        next: &[T],
        vectors: &[MotionVector],
    ) -> MotionResult<()> {
        self.set_raw_scaled(width, height, prev, next, width, height, vectors)
    }

    /// Replaces frames and a coarse field from raw buffers.
    #[allow(clippy::too_many_arguments)]
    pub fn set_raw_scaled(
        &mut self,
        width: usize,
        height: usize,
        prev: &[T],
        next: &[T],
        v_width: usize,
        v_height: usize,
        vectors: &[MotionVector],
    ) -> MotionResult<()> {
        if width == 0 || height == 0 {
            *self = Self::empty().with_parallel(self.parallel);
            return Ok(());
        }
        let prev = Frame::from_slice(prev, width, height)?;
        let next = Frame::from_slice(next, width, height)?;
        let field = upsample_nearest_raw(vectors, v_width, v_height, width, height)?;
        self.install(prev, next, field);
        Ok(())
    }

    /// Replaces the field only; frames stay bound.
    pub fn set_vectors(&mut self, field: &VectorField) -> MotionResult<()> {
        if self.is_null() {
            return Err(MotionError::EmptyInput {
                context: "motion compensator",
            });
        }
        self.field = upsample_nearest(field, self.width(), self.height())?;
        self.state = CompensationState::Stale;
        Ok(())
    }

    fn install(&mut self, prev: Frame<T>, next: Frame<T>, field: VectorField) {
        self.prev = prev;
        self.next = next;
        self.field = field;
        self.state = CompensationState::Stale;
    }

    /// Frame width.
    pub fn width(&self) -> usize {
        self.prev.width()
    }

    /// Frame height.
    pub fn height(&self) -> usize {
        self.prev.height()
    }

    /// Returns `true` for the NULL compensator.
    pub fn is_null(&self) -> bool {
        self.prev.is_null()
    }

    /// Returns `true` when a compensated frame is cached.
    pub fn is_compensated(&self) -> bool {
        matches!(self.state, CompensationState::Compensated { .. })
    }

    /// Bound reference frame.
    pub fn prev(&self) -> &Frame<T> {
        &self.prev
    }

    /// Bound target frame.
    pub fn next(&self) -> &Frame<T> {
        &self.next
    }

    /// Pixel-resolution vector field.
    pub fn vector_field(&self) -> &VectorField {
        &self.field
    }

    /// Reference sample at linear index `n`.
    pub fn get_image_prev(&self, n: usize) -> Option<T> {
        self.prev.as_slice().get(n).copied()
    }

    /// Reference sample at `(x, y)`.
    pub fn get_image_prev_at(&self, x: usize, y: usize) -> Option<T> {
        self.prev.get(x, y).copied()
    }

    /// Target sample at linear index `n`.
    pub fn get_image_next(&self, n: usize) -> Option<T> {
        self.next.as_slice().get(n).copied()
    }

    /// Target sample at `(x, y)`.
    pub fn get_image_next_at(&self, x: usize, y: usize) -> Option<T> {
        self.next.get(x, y).copied()
    }

    /// Vector at linear index `n`.
    pub fn get_vector(&self, n: usize) -> Option<MotionVector> {
        self.field.as_slice().get(n).copied()
    }

    /// Vector at `(x, y)`.
    pub fn get_vector_at(&self, x: usize, y: usize) -> Option<MotionVector> {
        self.ref_vector(x, y).copied()
    }

    /// Borrowed vector at `(x, y)`.
    pub fn ref_vector(&self, x: usize, y: usize) -> Option<&MotionVector> {
        self.field.get(x, y)
    }

    /// Cached compensated frame, if any.
    pub fn compensated(&self) -> Option<&Frame<T>> {
        match &self.state {
            CompensationState::Compensated { image, .. } => Some(image),
            CompensationState::Stale => None,
        }
    }

    /// Unmasked backward compensation, computed on first access.
    ///
    /// Any cached frame is returned as is, whatever request produced it.
    pub fn ref_image_compensated(&mut self) -> MotionResult<&Frame<T>> {
        if matches!(self.state, CompensationState::Stale) {
            self.compensate(Warp::Backward, 1.0, None)?;
        }
        self.compensated().ok_or(MotionError::EmptyInput {
            context: "compensated frame",
        })
    }

    /// Compensated sample at linear index `n`.
    pub fn get_image_compensated(&mut self, n: usize) -> MotionResult<T> {
        let image = self.ref_image_compensated()?;
        image
            .as_slice()
            .get(n)
            .copied()
            .ok_or(MotionError::IndexOutOfBounds {
                index: n,
                len: image.len(),
                context: "compensated frame",
            })
    }

    /// Compensated sample at `(x, y)`.
    pub fn get_image_compensated_at(&mut self, x: usize, y: usize) -> MotionResult<T> {
        let image = self.ref_image_compensated()?;
        image
            .get(x, y)
            .copied()
            .ok_or(MotionError::IndexOutOfBounds {
                index: y.saturating_mul(image.width()).saturating_add(x),
                len: image.len(),
                context: "compensated frame",
            })
    }

    /// Backward compensation: `out(p) = prev(p + v(p))`, zero outside the
    /// frame. Pixels where `mask` is `false` copy `next`.
    pub fn create_image_compensated(&mut self, mask: Option<&Mask>) -> MotionResult<&Frame<T>> {
        self.compensate(Warp::Backward, 1.0, mask)
    }

    /// Forward compensation for fields whose vectors are meant as
    /// source-to-destination displacements.
    ///
    /// Sampling is the same as [`create_image_compensated`](Self::create_image_compensated):
    /// every target pixel reads `prev(p + v(p))`. Several vectors landing on one
    /// destination are not resolved, so the result is only a true forward warp
    /// for injective fields.
    pub fn create_image_compensated_forward(
        &mut self,
        mask: Option<&Mask>,
    ) -> MotionResult<&Frame<T>> {
        self.compensate(Warp::Forward, 1.0, mask)
    }

    /// Backward compensation with every vector scaled by `factor`, used to
    /// extrapolate frames further along the motion.
    pub fn create_image_estimated(
        &mut self,
        factor: f64,
        mask: Option<&Mask>,
    ) -> MotionResult<&Frame<T>> {
        self.compensate(Warp::Backward, factor, mask)
    }

    fn compensate(
        &mut self,
        warp: Warp,
        scale: f64,
        mask: Option<&Mask>,
    ) -> MotionResult<&Frame<T>> {
        if self.is_null() {
            return Err(MotionError::EmptyInput {
                context: "motion compensator",
            });
        }
        if let Some(mask) = mask {
            if mask.dims() != self.prev.dims() {
                return Err(MotionError::DimensionMismatch {
                    expected: self.prev.dims(),
                    got: mask.dims(),
                    context: "mask",
                });
            }
        }

        let cached = matches!(
            &self.state,
            CompensationState::Compensated { request, .. } if request.matches(warp, scale, mask)
        );
        if !cached {
            let _span = trace_span!(
                "compensate",
                forward = warp == Warp::Forward,
                scale = scale,
                masked = mask.is_some()
            )
            .entered();
            let inputs = WarpInputs {
                prev: &self.prev,
                next: &self.next,
                field: &self.field,
                scale,
                mask,
            };
            let image = match warp {
                Warp::Backward => warp_backward(inputs, self.parallel)?,
                Warp::Forward => warp_forward(inputs, self.parallel)?,
            };
            trace_event!("compensated", width = image.width(), height = image.height());
            self.state = CompensationState::Compensated {
                request: CompensationRequest {
                    warp,
                    scale,
                    mask: mask.cloned(),
                },
                image,
            };
        }

        self.compensated().ok_or(MotionError::EmptyInput {
            context: "compensated frame",
        })
    }
}
