//! Retro-reflective target detection.
//!
//! Pipeline per frame:
//! 1. Threshold the frame in HSV space into a binary mask.
//! 2. Trace the borders of every foreground region (list retrieval, simple
//!    chain compression).
//! 3. Score each contour by aspect ratio and fill density.
//! 4. Select one candidate (first valid by default).
//! 5. Convert its bounding box into a bearing offset and a pinhole distance.
//!
//! Nothing is carried from one frame to the next; a [`Pipeline`] is immutable
//! once built and can be shared across threads.

mod color;
mod contour;
mod estimate;
mod pipeline;
mod score;
mod select;

pub use color::{apply_color_range, refine_mask, rgb_to_hsv, ColorRange, Mask};
pub use contour::{find_contours, find_contours_in, Contour};
pub use estimate::{
    bearing_offset, calibrate_focal_length, estimate, pinhole_distance, CalibrationConstants,
    Detection, DetectionResult,
};
pub use pipeline::{ConfigError, FrameReport, Pipeline, PipelineConfig};
pub use score::{
    score_contour, shape_descriptors, Candidate, Rejection, ScalarRange, Scored, ShapeThresholds,
};
pub use select::{select_scored, select_target, SelectionPolicy};

pub use reflector_core::{GrayImage, PixelPoint, PixelRect, RgbImageView};
