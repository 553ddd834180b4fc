//! Error types for blockmotion.

use thiserror::Error;

/// Result alias for blockmotion operations.
pub type MotionResult<T> = std::result::Result<T, MotionError>;

/// Errors raised at construction and assignment boundaries.
///
/// Search and resampling loops never fail once their inputs have been
/// validated; every variant here describes a bad argument.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MotionError {
    /// Width or height is zero where a non-empty buffer is required.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is shorter than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer does not hold enough samples.
    #[error("buffer too small: needed {needed} samples, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Two inputs that must share dimensions do not.
    #[error("{context} dimensions {got:?} do not match {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
        context: &'static str,
    },
    /// A required input is empty.
    #[error("{context} is empty")]
    EmptyInput { context: &'static str },
    /// A rectangular ROI does not fit inside its image.
    #[error("roi {width}x{height} at ({x}, {y}) exceeds image {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Block size is zero or larger than the frame.
    #[error("block size {block_size} is invalid for a {width}x{height} frame")]
    InvalidBlockSize {
        block_size: usize,
        width: usize,
        height: usize,
    },
    /// Search range is zero.
    #[error("search range must be positive, got {search_range}")]
    InvalidSearchRange { search_range: usize },
    /// A region map carries a negative label.
    #[error("region map has negative label {label} at ({x}, {y})")]
    NegativeLabel { x: usize, y: usize, label: i32 },
    /// A region references a pixel outside its frame.
    #[error("region pixel ({x}, {y}) lies outside the frame")]
    RegionOutOfBounds { x: usize, y: usize },
    /// Two supports handed to a cost metric hold different sample counts.
    #[error("support size mismatch: {left} vs {right} samples")]
    SupportSizeMismatch { left: usize, right: usize },
    /// A region support handed to a cost metric is empty.
    #[error("empty region support")]
    EmptySupport,
    /// Index is outside a collection.
    #[error("{context} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// Operation needs a bound frame pair.
    #[error("matcher is not bound to a frame pair")]
    Unbound,
    /// Operation is not defined for the bound matching mode.
    #[error("{operation} is not available in {mode} mode")]
    UnsupportedMode {
        operation: &'static str,
        mode: &'static str,
    },
    /// Image decoding or encoding failed.
    #[error("image io failed: {reason}")]
    ImageIo { reason: String },
}
