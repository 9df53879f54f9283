//! Frame loop: acquire, detect, publish, repeat.

use crate::frame::{mask_to_image, rgb_view, FrameSource};
use crate::telemetry::{publish, TelemetrySink};
use reflector_core::{set_frame_index, GrayImage};
use reflector_detect::Pipeline;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Receives the binary mask of each processed frame.
pub trait MaskSink {
    fn put_mask(&mut self, index: u64, mask: &GrayImage) -> Result<(), image::ImageError>;
}

/// Writes masks as `frame_NNNNN_mask.png` into a directory.
#[derive(Clone, Debug)]
pub struct MaskDirSink {
    dir: PathBuf,
}

impl MaskDirSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:05}_mask.png"))
    }
}

impl MaskSink for MaskDirSink {
    fn put_mask(&mut self, index: u64, mask: &GrayImage) -> Result<(), image::ImageError> {
        let Some(img) = mask_to_image(mask) else {
            return Err(image::ImageError::Parameter(
                image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                ),
            ));
        };
        img.save(self.path_for(index))
    }
}

/// Counters for one [`run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Frames the pipeline processed.
    pub frames: u64,
    /// Frames with a published target.
    pub targets: u64,
    /// Frames without a target.
    pub misses: u64,
    /// Frames that could not be acquired.
    pub failures: u64,
}

/// Process every frame `source` yields and publish each result to `sink`.
///
/// Acquisition failures are reported through [`TelemetrySink::notify_error`]
/// and skipped. Sink failures are logged and do not stop the loop.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip(pipeline, source, sink, masks))
)]
pub fn run<F, T>(
    pipeline: &Pipeline,
    source: &mut F,
    sink: &mut T,
    mut masks: Option<&mut dyn MaskSink>,
) -> RunSummary
where
    F: FrameSource + ?Sized,
    T: TelemetrySink + ?Sized,
{
    let mut summary = RunSummary::default();
    let mut index = 0u64;

    while let Some(next) = source.next_frame() {
        let frame_index = index;
        index += 1;
        set_frame_index(Some(frame_index));
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("frame", index = frame_index).entered();

        let img = match next {
            Ok(img) => img,
            Err(err) => {
                summary.failures += 1;
                log::warn!("{err}");
                if let Err(e) = sink.notify_error(&err.to_string()) {
                    log::warn!("telemetry error: {e}");
                }
                continue;
            }
        };

        let report = pipeline.process_report(&rgb_view(&img));
        summary.frames += 1;
        if report.detection.is_some() {
            summary.targets += 1;
        } else {
            summary.misses += 1;
        }

        if let Err(e) = publish(sink, &report.detection) {
            log::warn!("telemetry error: {e}");
        }

        if let Some(m) = masks.as_deref_mut() {
            if let Err(e) = m.put_mask(frame_index, &report.mask) {
                log::warn!("could not write mask: {e}");
            }
        }
    }
    set_frame_index(None);

    log::info!(
        "processed {} frames: {} targets, {} misses, {} failures",
        summary.frames,
        summary.targets,
        summary.misses,
        summary.failures
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameError;
    use crate::telemetry::{MemorySink, DIFFERENCE_KEY, DISTANCE_KEY};
    use approx::assert_relative_eq;
    use reflector_detect::{
        CalibrationConstants, PipelineConfig, ScalarRange, ShapeThresholds,
    };
    use std::collections::VecDeque;

    struct VecSource(VecDeque<Result<image::RgbImage, FrameError>>);

    impl FrameSource for VecSource {
        fn next_frame(&mut self) -> Option<Result<image::RgbImage, FrameError>> {
            self.0.pop_front()
        }
    }

    #[derive(Default)]
    struct CountingMasks(Vec<(u64, usize)>);

    impl MaskSink for CountingMasks {
        fn put_mask(&mut self, index: u64, mask: &GrayImage) -> Result<(), image::ImageError> {
            self.0.push((index, mask.count_nonzero()));
            Ok(())
        }
    }

    fn pipeline() -> Pipeline {
        let cfg = PipelineConfig {
            shape: ShapeThresholds {
                ratio: ScalarRange::open(2.0, 2.5),
                density: ScalarRange::closed(0.9, 1.0),
            },
            ..PipelineConfig::reflective_strip(CalibrationConstants {
                known_target_width: 55.0,
                focal_length: 333.82,
                bearing_correction_offset: 105.0,
            })
        };
        Pipeline::new(cfg).expect("valid config")
    }

    fn blank() -> image::RgbImage {
        image::RgbImage::from_pixel(320, 240, image::Rgb([10, 10, 40]))
    }

    fn with_bar() -> image::RgbImage {
        let mut img = blank();
        for y in 50..71 {
            for x in 100..145 {
                img.put_pixel(x, y, image::Rgb([60, 220, 60]));
            }
        }
        img
    }

    #[test]
    fn loop_publishes_hits_and_keeps_last_value_on_miss() {
        let mut source = VecSource(
            vec![
                Ok(with_bar()),
                Err(FrameError::Unreadable {
                    path: "frame1.png".into(),
                    source: image::ImageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "camera timeout",
                    )),
                }),
                Ok(blank()),
            ]
            .into(),
        );
        let mut sink = MemorySink::default();
        let mut masks = CountingMasks::default();

        let summary = run(&pipeline(), &mut source, &mut sink, Some(&mut masks));
        assert_eq!(
            summary,
            RunSummary {
                frames: 2,
                targets: 1,
                misses: 1,
                failures: 1
            }
        );

        assert_eq!(sink.writes, 2);
        // 45 x 21 pixel bar at (100, 50): 320 / 2 - (100 + 22.5) + 105.
        assert_relative_eq!(sink.get(DIFFERENCE_KEY).expect("published"), 142.5);
        assert_relative_eq!(
            sink.get(DISTANCE_KEY).expect("published"),
            55.0 * 333.82 / 45.0,
            epsilon = 1e-9
        );
        assert_eq!(sink.errors.len(), 1);
        assert!(sink.errors[0].contains("camera timeout"));

        // Failed frame 1 produces no mask; indices follow the source order.
        assert_eq!(masks.0, vec![(0, 45 * 21), (2, 0)]);
        assert_eq!(reflector_core::frame_index(), None);
    }

    #[test]
    fn mask_dir_names_frames_by_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = MaskDirSink::new(dir.path());
        let mut mask = GrayImage::new(4, 3);
        mask.set(1, 1, 255);
        sink.put_mask(7, &mask).expect("write png");

        let path = dir.path().join("frame_00007_mask.png");
        assert_eq!(sink.path_for(7), path);
        let back = image::open(&path).expect("readable").to_luma8();
        assert_eq!(back.get_pixel(1, 1).0, [255]);
        assert_eq!(back.get_pixel(0, 0).0, [0]);
    }
}
