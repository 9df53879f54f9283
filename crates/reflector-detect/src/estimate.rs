//! Bearing and range from a target's bounding box.
//!
//! The bearing offset is a pixel-domain quantity: the horizontal distance
//! between the frame center and the box center, shifted by an empirically
//! fitted correction. It is not an angle; the robot controller tunes its
//! turn gain against these pixels.
//!
//! Range uses the pinhole similar-triangles relation
//! `distance = known_width * focal_length / perceived_width`. The focal
//! length is fitted offline by measuring the target's pixel width at a known
//! distance, see [`calibrate_focal_length`].

use reflector_core::PixelRect;
use serde::{Deserialize, Serialize};

use crate::score::Candidate;
use crate::ConfigError;

/// Fixed camera/target constants supplied at startup.
///
/// The frame width is the fourth constant of the model; it is read from
/// each frame instead of being configured.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConstants {
    /// Physical target width, in the unit distances are reported in.
    pub known_target_width: f64,
    /// Focal length in pixels.
    pub focal_length: f64,
    /// Pixel correction added to the raw center offset.
    pub bearing_correction_offset: f64,
}

impl CalibrationConstants {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("known_target_width", self.known_target_width),
            ("focal_length", self.focal_length),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidCalibration { name, value });
            }
        }
        if !self.bearing_correction_offset.is_finite() {
            return Err(ConfigError::InvalidCalibration {
                name: "bearing_correction_offset",
                value: self.bearing_correction_offset,
            });
        }
        Ok(())
    }
}

/// Bearing/range pair published for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bearing_offset: f64,
    pub distance: f64,
}

/// `None` when the frame has no valid target.
pub type DetectionResult = Option<Detection>;

/// `frame_width / 2 - box_center_x + correction`.
#[inline]
pub fn bearing_offset(rect: PixelRect, frame_width: f64, correction: f64) -> f64 {
    frame_width / 2.0 - rect.center_x() + correction
}

/// Pinhole range. `perceived_width` must be positive.
#[inline]
pub fn pinhole_distance(known_width: f64, focal_length: f64, perceived_width: f64) -> f64 {
    known_width * focal_length / perceived_width
}

/// Offline focal-length fit from one reference measurement:
/// `perceived_width * known_distance / known_width`.
pub fn calibrate_focal_length(
    perceived_width: f64,
    known_distance: f64,
    known_width: f64,
) -> Option<f64> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if !(ok(perceived_width) && ok(known_distance) && ok(known_width)) {
        return None;
    }
    Some(perceived_width * known_distance / known_width)
}

/// Bearing offset and distance for a selected candidate.
pub fn estimate(
    candidate: &Candidate,
    constants: &CalibrationConstants,
    frame_width: f64,
) -> Detection {
    let rect = candidate.rect();
    // Candidates always have a positive width.
    Detection {
        bearing_offset: bearing_offset(rect, frame_width, constants.bearing_correction_offset),
        distance: pinhole_distance(
            constants.known_target_width,
            constants.focal_length,
            rect.width as f64,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::candidate_for_test;
    use approx::assert_relative_eq;

    fn reference_constants() -> CalibrationConstants {
        CalibrationConstants {
            known_target_width: 55.0,
            focal_length: 333.82,
            bearing_correction_offset: 105.0,
        }
    }

    #[test]
    fn distance_follows_pinhole_formula() {
        let c = candidate_for_test(PixelRect::new(0, 0, 50, 20), 100.0, true);
        let det = estimate(&c, &reference_constants(), 640.0);
        assert_relative_eq!(det.distance, 367.202, epsilon = 1e-9);
    }

    #[test]
    fn bearing_offset_uses_frame_center_and_correction() {
        let c = candidate_for_test(PixelRect::new(100, 30, 80, 35), 100.0, true);
        let det = estimate(&c, &reference_constants(), 640.0);
        assert_relative_eq!(det.bearing_offset, 285.0);
    }

    #[test]
    fn bearing_follows_frame_width() {
        let rect = PixelRect::new(100, 0, 80, 10);
        assert_relative_eq!(bearing_offset(rect, 320.0, 0.0), 20.0);
        assert_relative_eq!(bearing_offset(rect, 1280.0, 0.0), 500.0);
    }

    #[test]
    fn focal_length_round_trips_with_distance() {
        let f = calibrate_focal_length(71.62, 118.0, 55.0).expect("valid inputs");
        let d = pinhole_distance(55.0, f, 71.62);
        assert_relative_eq!(d, 118.0, epsilon = 1e-9);
        assert_eq!(calibrate_focal_length(0.0, 118.0, 55.0), None);
        assert_eq!(calibrate_focal_length(10.0, 118.0, f64::NAN), None);
    }

    #[test]
    fn constants_reject_non_positive_focal_length() {
        let mut c = reference_constants();
        c.focal_length = 0.0;
        assert_eq!(
            c.validate(),
            Err(ConfigError::InvalidCalibration {
                name: "focal_length",
                value: 0.0
            })
        );
        c.focal_length = 333.82;
        c.bearing_correction_offset = f64::INFINITY;
        assert!(c.validate().is_err());
        assert!(reference_constants().validate().is_ok());
    }
}
