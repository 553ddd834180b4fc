//! Owned contiguous frame buffer.

use crate::image::ImageView;
use crate::pixel::Pixel;
use crate::util::{MotionError, MotionResult};
use std::ops::{Index, IndexMut};

/// Owned row-major 2D buffer.
///
/// A `0x0` frame is the NULL state: valid, empty and distinct from an error.
/// Sampling accessors (`get`, `get_zeropad`, `get_clamped`,
/// `sample_zeropad`) never fail; `Index` panics on out-of-range coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Frame<T> {
    /// Creates the NULL frame.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// Wraps a row-major buffer of exactly `width * height` samples.
    ///
    /// A zero width or height with an empty buffer yields the NULL frame.
    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> MotionResult<Self> {
        if width == 0 || height == 0 {
            if data.is_empty() {
                return Ok(Self::empty());
            }
            return Err(MotionError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(MotionError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(MotionError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(MotionError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        if width == 0 || height == 0 {
            return Self::empty();
        }
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Returns the frame width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the frame height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for the NULL frame.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Alias of [`Frame::is_empty`] matching the lifecycle vocabulary.
    pub fn is_null(&self) -> bool {
        self.is_empty()
    }

    /// Row-major samples.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable row-major samples.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the frame and returns its samples.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Borrowed view of the whole frame.
    pub fn view(&self) -> MotionResult<ImageView<'_, T>> {
        ImageView::from_slice(&self.data, self.width, self.height)
    }

    /// Returns the sample at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Returns a mutable sample at `(x, y)` if it is within bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get_mut(y * self.width + x)
    }

    /// Writes `value` at `(x, y)`; returns `false` when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Returns the coordinates if `(x, y)` lies inside the frame.
    #[inline]
    pub(crate) fn checked_coords(&self, x: isize, y: isize) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Maps every sample into a new frame of the same size.
    pub fn map<U, F>(&self, f: F) -> Frame<U>
    where
        F: FnMut(&T) -> U,
    {
        Frame {
            data: self.data.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: Clone> Frame<T> {
    /// Creates a frame filled with `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        if width == 0 || height == 0 {
            return Self::empty();
        }
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Copies the first `width * height` samples of `data`.
    pub fn from_slice(data: &[T], width: usize, height: usize) -> MotionResult<Self> {
        if width == 0 || height == 0 {
            return Ok(Self::empty());
        }
        let needed = width
            .checked_mul(height)
            .ok_or(MotionError::InvalidDimensions { width, height })?;
        let samples = data.get(..needed).ok_or(MotionError::BufferTooSmall {
            needed,
            got: data.len(),
        })?;
        Self::from_vec(samples.to_vec(), width, height)
    }
}

impl<T: Pixel> Frame<T> {
    /// Samples `(x, y)`, returning zero outside the frame.
    #[inline]
    pub fn get_zeropad(&self, x: isize, y: isize) -> T {
        self.checked_coords(x, y)
            .and_then(|(x, y)| self.get(x, y).copied())
            .unwrap_or_default()
    }

    /// Samples `(x, y)` clamped to the nearest in-bounds pixel.
    ///
    /// Returns zero for the NULL frame.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> T {
        if self.is_empty() {
            return T::default();
        }
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.width + cx]
    }

    /// Bilinear sample at a real-valued position with zero padding.
    ///
    /// Integer positions return the stored sample exactly; taps outside the
    /// frame contribute zero.
    pub fn sample_zeropad(&self, x: f64, y: f64) -> T {
        if !x.is_finite() || !y.is_finite() {
            return T::default();
        }
        let x0 = x.floor();
        let y0 = y.floor();
        // No tap lands inside the frame.
        if x0 < -1.0 || y0 < -1.0 || x0 >= self.width as f64 || y0 >= self.height as f64 {
            return T::default();
        }
        let tx = x - x0;
        let ty = y - y0;
        let (ix, iy) = (x0 as isize, y0 as isize);
        if tx == 0.0 && ty == 0.0 {
            return self.get_zeropad(ix, iy);
        }

        let taps = [
            (ix, iy, (1.0 - tx) * (1.0 - ty)),
            (ix + 1, iy, tx * (1.0 - ty)),
            (ix, iy + 1, (1.0 - tx) * ty),
            (ix + 1, iy + 1, tx * ty),
        ];
        let mut acc = T::Accum::default();
        for (sx, sy, w) in taps {
            if w == 0.0 {
                continue;
            }
            if let Some((cx, cy)) = self.checked_coords(sx, sy) {
                acc = T::accumulate(acc, self.data[cy * self.width + cx], w);
            }
        }
        T::from_accum(acc)
    }
}

impl<T> Index<(usize, usize)> for Frame<T> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} frame",
            self.width,
            self.height
        );
        &self.data[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Frame<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} frame",
            self.width,
            self.height
        );
        &mut self.data[y * self.width + x]
    }
}

impl<T> Index<usize> for Frame<T> {
    type Output = T;

    fn index(&self, n: usize) -> &T {
        &self.data[n]
    }
}

impl<T> IndexMut<usize> for Frame<T> {
    fn index_mut(&mut self, n: usize) -> &mut T {
        &mut self.data[n]
    }
}
