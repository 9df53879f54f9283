//! Frame acquisition: `image` crate adapters and frame sources.

use reflector_core::{GrayImage, RgbImageView};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// A frame could not be acquired. Never fatal: the loop reports it and moves
/// on to the next frame.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("could not read frame '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Where frames come from. `None` ends the loop.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Result<image::RgbImage, FrameError>>;
}

/// Borrow an `image::RgbImage` as the detector's view type.
pub fn rgb_view(img: &image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Copy a mask into an `image::GrayImage` for saving or streaming.
pub fn mask_to_image(mask: &GrayImage) -> Option<image::GrayImage> {
    let width = u32::try_from(mask.width).ok()?;
    let height = u32::try_from(mask.height).ok()?;
    image::GrayImage::from_raw(width, height, mask.data.clone())
}

/// Reads a fixed list of image files in order, decoding each to RGB8.
#[derive(Debug, Default)]
pub struct ImageFileSource {
    paths: VecDeque<PathBuf>,
}

impl ImageFileSource {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            paths: paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageFileSource {
    fn next_frame(&mut self) -> Option<Result<image::RgbImage, FrameError>> {
        let path = self.paths.pop_front()?;
        Some(
            image::open(&path)
                .map(|img| img.to_rgb8())
                .map_err(|source| FrameError::Unreadable { path, source }),
        )
    }
}
