use approx::assert_relative_eq;
use reflector_detect::{
    CalibrationConstants, ColorRange, ConfigError, Pipeline, PipelineConfig, PixelRect,
    RgbImageView, ScalarRange, SelectionPolicy, ShapeThresholds,
};

const TARGET_GREEN: [u8; 3] = [60, 220, 60];
const BACKGROUND: [u8; 3] = [10, 10, 40];

struct TestFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl TestFrame {
    fn new(width: usize, height: usize) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&BACKGROUND);
        }
        Self {
            width,
            height,
            data,
        }
    }

    fn paint(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let idx = (y * self.width + x) * 3;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    /// Filled `w x h` pixel block with its top-left pixel at `(x, y)`.
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize) -> &mut Self {
        for yy in y..y + h {
            for xx in x..x + w {
                self.paint(xx, yy, TARGET_GREEN);
            }
        }
        self
    }

    fn view(&self) -> RgbImageView<'_> {
        RgbImageView::new(self.width, self.height, &self.data).expect("consistent buffer")
    }
}

fn calibration() -> CalibrationConstants {
    CalibrationConstants {
        known_target_width: 55.0,
        focal_length: 333.82,
        bearing_correction_offset: 105.0,
    }
}

/// Reference color window with shape windows that accept a solid bar.
fn solid_bar_config() -> PipelineConfig {
    PipelineConfig {
        shape: ShapeThresholds {
            ratio: ScalarRange::open(2.0, 2.5),
            density: ScalarRange::closed(0.9, 1.0),
        },
        ..PipelineConfig::reflective_strip(calibration())
    }
}

#[test]
fn frame_outside_color_range_has_no_target() {
    let frame = TestFrame::new(64, 48);
    let pipeline = Pipeline::new(solid_bar_config()).expect("valid config");
    let report = pipeline.process_report(&frame.view());
    assert_eq!(report.mask.count_nonzero(), 0);
    assert!(report.scored.is_empty());
    assert!(report.selected.is_none());
    assert!(report.detection.is_none());
}

#[test]
fn solid_bar_yields_bearing_and_distance() {
    let mut frame = TestFrame::new(320, 240);
    frame.fill_rect(100, 50, 45, 21);

    let pipeline = Pipeline::new(solid_bar_config()).expect("valid config");
    let report = pipeline.process_report(&frame.view());
    let target = report.target().expect("target");
    // The box counts covered pixels; the area is the polygon through the
    // corner pixel centres.
    assert_eq!(target.rect(), PixelRect::new(100, 50, 45, 21));
    assert_relative_eq!(target.area(), 880.0);
    assert_relative_eq!(target.aspect_ratio(), 45.0 / 21.0, epsilon = 1e-12);
    assert_relative_eq!(target.density(), 880.0 / 945.0, epsilon = 1e-12);

    let det = report.detection.expect("detection");
    // 320 / 2 - (100 + 22.5) + 105
    assert_relative_eq!(det.bearing_offset, 142.5);
    assert_relative_eq!(det.distance, 55.0 * 333.82 / 45.0, epsilon = 1e-9);
}

#[test]
fn frame_width_comes_from_the_frame() {
    let mut narrow = TestFrame::new(320, 240);
    narrow.fill_rect(100, 50, 45, 21);
    let mut wide = TestFrame::new(640, 240);
    wide.fill_rect(100, 50, 45, 21);

    let pipeline = Pipeline::new(solid_bar_config()).expect("valid config");
    let a = pipeline.process(&narrow.view()).expect("narrow detection");
    let b = pipeline.process(&wide.view()).expect("wide detection");
    assert_relative_eq!(b.bearing_offset - a.bearing_offset, 160.0);
    assert_relative_eq!(a.distance, b.distance);
}

#[test]
fn slanted_strip_matches_reflective_strip_preset() {
    let mut frame = TestFrame::new(200, 150);
    // 40 rows of 8 pixels, shifted two pixels right per row.
    for row in 0..40 {
        for dx in 0..8 {
            frame.paint(50 + 2 * row + dx, 60 + row, TARGET_GREEN);
        }
    }

    let pipeline =
        Pipeline::new(PipelineConfig::reflective_strip(calibration())).expect("valid config");
    let report = pipeline.process_report(&frame.view());
    let target = report.target().expect("strip accepted");
    assert_eq!(target.rect(), PixelRect::new(50, 60, 86, 40));
    assert!(target.density() > 0.05 && target.density() < 0.15);

    let det = report.detection.expect("detection");
    assert_relative_eq!(det.distance, 55.0 * 333.82 / 86.0, epsilon = 1e-9);
    assert_relative_eq!(det.bearing_offset, 100.0 - (50.0 + 43.0) + 105.0);
}

#[test]
fn first_valid_contour_wins_over_a_larger_one() {
    let mut frame = TestFrame::new(320, 240);
    frame.fill_rect(200, 20, 45, 21); // traced first
    frame.fill_rect(20, 150, 55, 25); // larger, traced second

    let pipeline = Pipeline::new(solid_bar_config()).expect("valid config");
    let report = pipeline.process_report(&frame.view());
    assert_eq!(report.valid_count(), 2);
    assert_eq!(report.target().map(|c| c.rect().x), Some(200));

    let largest = Pipeline::new(PipelineConfig {
        selection: SelectionPolicy::LargestArea,
        ..solid_bar_config()
    })
    .expect("valid config");
    let report = largest.process_report(&frame.view());
    assert_eq!(report.target().map(|c| c.rect().x), Some(20));
}

#[test]
fn one_pixel_high_line_is_measured_then_rejected_by_shape() {
    let mut frame = TestFrame::new(100, 40);
    frame.fill_rect(10, 20, 60, 1);

    let pipeline = Pipeline::new(solid_bar_config()).expect("valid config");
    let report = pipeline.process_report(&frame.view());
    assert_eq!(report.scored.len(), 1);
    let line = report.scored[0].candidate().expect("measured");
    assert_eq!(line.rect(), PixelRect::new(10, 20, 60, 1));
    assert_relative_eq!(line.aspect_ratio(), 60.0);
    assert_eq!(line.density(), 0.0);
    assert!(!line.is_valid());
    assert!(report.detection.is_none());
}

#[test]
fn roi_excludes_targets_outside_it() {
    let mut frame = TestFrame::new(320, 240);
    frame.fill_rect(200, 20, 45, 21);

    let pipeline = Pipeline::new(PipelineConfig {
        roi: Some(PixelRect::new(0, 100, 320, 140)),
        ..solid_bar_config()
    })
    .expect("valid config");
    assert!(pipeline.process(&frame.view()).is_none());
}

#[test]
fn empty_frame_is_not_an_error() {
    let pipeline = Pipeline::new(solid_bar_config()).expect("valid config");
    let frame = RgbImageView::new(0, 0, &[]).expect("empty view");
    assert!(pipeline.process(&frame).is_none());
}

#[test]
fn invalid_configuration_refuses_to_build() {
    let cfg = PipelineConfig {
        color: ColorRange {
            low: [90, 0, 0],
            high: [30, 255, 255],
        },
        ..solid_bar_config()
    };
    assert_eq!(
        Pipeline::new(cfg).unwrap_err(),
        ConfigError::InvalidColorRange {
            channel: 0,
            low: 90,
            high: 30
        }
    );
}

#[test]
fn pipeline_can_be_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Pipeline>();
}
