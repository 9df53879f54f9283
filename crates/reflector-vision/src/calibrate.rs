//! Offline focal-length calibration from a reference photo.
//!
//! Place the target at a measured distance, take one frame, and run the
//! detector on it. The perceived box width gives
//! `focal_length = perceived_width * known_distance / known_target_width`.

use crate::core::{PixelRect, RgbImageView};
use reflector_detect::{calibrate_focal_length, Pipeline};
use serde::Serialize;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("no target detected in the reference frame")]
    NoTarget,
    #[error("known distance must be finite and > 0 (got {0})")]
    InvalidDistance(f64),
}

/// Result of a calibration run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FocalCalibration {
    pub perceived_width: f64,
    pub focal_length: f64,
    /// Bounding box of the target the fit used.
    pub target: PixelRect,
}

/// Detect the target in `frame` and fit the focal length for a target placed
/// `known_distance` away. Uses the pipeline's `known_target_width`.
pub fn calibrate_from_frame(
    pipeline: &Pipeline,
    frame: &RgbImageView<'_>,
    known_distance: f64,
) -> Result<FocalCalibration, CalibrationError> {
    if !(known_distance.is_finite() && known_distance > 0.0) {
        return Err(CalibrationError::InvalidDistance(known_distance));
    }

    let report = pipeline.process_report(frame);
    let target = report.target().ok_or(CalibrationError::NoTarget)?.rect();
    let perceived_width = target.width as f64;
    let known_width = pipeline.config().calibration.known_target_width;

    let focal_length = calibrate_focal_length(perceived_width, known_distance, known_width)
        .ok_or(CalibrationError::NoTarget)?;
    log::info!(
        "perceived width {perceived_width}px at distance {known_distance}: focal length {focal_length:.3}"
    );

    Ok(FocalCalibration {
        perceived_width,
        focal_length,
        target,
    })
}
