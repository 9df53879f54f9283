//! Core types and utilities for retro-reflective target detection.
//!
//! This crate is intentionally small. It does *not* depend on any concrete
//! image library or camera driver; frames are handed around as borrowed
//! row-major byte views.

mod geometry;
mod image;
mod logger;

pub use geometry::{PixelPoint, PixelRect};
pub use image::{GrayImage, GrayImageView, RgbImageView};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{frame_index, init_with_level, parse_level_filter, set_frame_index};
