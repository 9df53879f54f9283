use reflector_core::PixelRect;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::color::ColorRange;
use crate::estimate::CalibrationConstants;
use crate::score::ShapeThresholds;
use crate::select::SelectionPolicy;

/// Everything the pipeline needs, fixed for the lifetime of the process.
///
/// Color range, shape thresholds and calibration have no defaults: they are
/// tied to one lighting/target setup and must come from configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// HSV window isolating the target color.
    pub color: ColorRange,
    /// Aspect-ratio and density windows.
    pub shape: ShapeThresholds,
    /// Target width, focal length and bearing correction.
    pub calibration: CalibrationConstants,
    #[serde(default)]
    pub selection: SelectionPolicy,
    /// Restrict contour search to this part of the frame.
    #[serde(default)]
    pub roi: Option<PixelRect>,
}

impl PipelineConfig {
    /// HSV window and shape preset of the tape-strip tuning, with the given
    /// calibration.
    pub fn reflective_strip(calibration: CalibrationConstants) -> Self {
        Self {
            color: ColorRange {
                low: [50, 50, 100],
                high: [200, 200, 255],
            },
            shape: ShapeThresholds::reflective_strip(),
            calibration,
            selection: SelectionPolicy::FirstMatch,
            roi: None,
        }
    }

    /// Check every invariant the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.color.validate()?;
        for (name, range) in [("ratio", self.shape.ratio), ("density", self.shape.density)] {
            if !range.is_well_formed() {
                return Err(ConfigError::InvalidThreshold {
                    name,
                    low: range.low,
                    high: range.high,
                });
            }
        }
        self.calibration.validate()?;
        if let Some(roi) = self.roi {
            if roi.is_degenerate() {
                return Err(ConfigError::InvalidRoi {
                    width: roi.width,
                    height: roi.height,
                });
            }
        }
        Ok(())
    }
}
