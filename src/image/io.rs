//! Convenience helpers for loading and saving frames via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. The matching and
//! compensation engines never touch the filesystem themselves.

use crate::image::Frame;
use crate::util::{MotionError, MotionResult};
use std::path::Path;

/// Copies a grayscale image buffer into an owned frame.
pub fn frame_from_gray_image(img: &image::GrayImage) -> MotionResult<Frame<u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    Frame::from_vec(img.as_raw().clone(), width, height)
}

/// Converts any decoded image to a grayscale frame.
pub fn frame_from_dynamic_image(img: &image::DynamicImage) -> MotionResult<Frame<u8>> {
    frame_from_gray_image(&img.to_luma8())
}

/// Loads an image from disk as a grayscale frame.
pub fn load_gray_frame<P: AsRef<Path>>(path: P) -> MotionResult<Frame<u8>> {
    let img = image::open(path).map_err(|err| MotionError::ImageIo {
        reason: err.to_string(),
    })?;
    frame_from_dynamic_image(&img)
}

/// Writes a grayscale frame to disk; the format follows the file extension.
pub fn save_gray_frame<P: AsRef<Path>>(frame: &Frame<u8>, path: P) -> MotionResult<()> {
    if frame.is_null() {
        return Err(MotionError::EmptyInput { context: "frame" });
    }
    let img = image::GrayImage::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        frame.as_slice().to_vec(),
    )
    .ok_or(MotionError::BufferTooSmall {
        needed: frame.width() * frame.height(),
        got: frame.len(),
    })?;
    img.save(path).map_err(|err| MotionError::ImageIo {
        reason: err.to_string(),
    })
}
