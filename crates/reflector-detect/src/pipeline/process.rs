use reflector_core::RgbImageView;

use super::{ConfigError, FrameReport, PipelineConfig};
use crate::color::apply_color_range;
use crate::contour::{find_contours, find_contours_in};
use crate::estimate::{estimate, DetectionResult};
use crate::score::{score_contour, Scored};
use crate::select::select_scored;

/// Stateless single-frame detector.
///
/// Each call runs mask -> contours -> scoring -> selection -> estimation to
/// completion and keeps nothing for the next frame.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate the configuration and build the pipeline.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Bearing/range for the frame, or `None` if no valid target was found.
    pub fn process(&self, frame: &RgbImageView<'_>) -> DetectionResult {
        self.process_report(frame).detection
    }

    /// Run the pipeline and keep the intermediate results.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "info",
            skip(self, frame),
            fields(width = frame.width, height = frame.height)
        )
    )]
    pub fn process_report(&self, frame: &RgbImageView<'_>) -> FrameReport {
        let cfg = &self.config;
        let mask = apply_color_range(frame, &cfg.color);

        let contours = match cfg.roi {
            Some(roi) => find_contours_in(&mask.view(), roi),
            None => find_contours(&mask.view()),
        };

        let scored: Vec<Scored> = contours
            .into_iter()
            .map(|c| score_contour(c, &cfg.shape))
            .collect();

        let selected = select_scored(&scored, cfg.selection);
        let detection = selected
            .and_then(|i| scored[i].candidate())
            .map(|c| estimate(c, &cfg.calibration, frame.width as f64));

        match &detection {
            Some(d) => log::debug!(
                "target: bearing offset {:.1}px, distance {:.1} ({} contours)",
                d.bearing_offset,
                d.distance,
                scored.len()
            ),
            None => log::debug!("no target among {} contours", scored.len()),
        }

        FrameReport {
            mask,
            scored,
            selected,
            detection,
        }
    }
}
