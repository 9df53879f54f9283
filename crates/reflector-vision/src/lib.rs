//! High-level facade for the `reflector-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core types and the detector,
//! - the robot-side configuration file (`frc.json` layout plus a `vision`
//!   section) and its validation,
//! - `image` crate frame adapters and a file-backed frame source,
//! - telemetry sinks publishing `Difference` / `Distance`,
//! - the frame loop and offline focal-length calibration.
//!
//! ## Quickstart
//!
//! ```no_run
//! use reflector_vision::{frame, telemetry, VisionConfig};
//! use reflector_vision::detect::Pipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = VisionConfig::load_json("/boot/frc.json")?;
//! let pipeline = Pipeline::new(cfg.vision.clone())?;
//! let img = image::open("frame.png")?.to_rgb8();
//!
//! let result = pipeline.process(&frame::rgb_view(&img));
//! let mut sink = telemetry::MemorySink::default();
//! telemetry::publish(&mut sink, &result)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `reflector_vision::core`: image views, pixel geometry, logger.
//! - `reflector_vision::detect`: mask, contours, scoring, selection, estimation.
//! - `reflector_vision::config`: JSON configuration and camera selectors.
//! - `reflector_vision::telemetry`: sinks and `publish`.
//! - `reflector_vision::runner`: frame loop and debug mask output.

pub use reflector_core as core;
pub use reflector_detect as detect;

pub mod calibrate;
pub mod config;
pub mod frame;
pub mod runner;
pub mod telemetry;

pub use config::{CameraConfig, NtMode, SelectorKey, SwitchedCameraConfig, VisionConfig};
pub use frame::{FrameError, FrameSource, ImageFileSource};
pub use reflector_detect::{Detection, DetectionResult, Pipeline, PipelineConfig};
pub use runner::{run, MaskDirSink, MaskSink, RunSummary};
pub use telemetry::{publish, JsonLinesSink, LogSink, MemorySink, TelemetryError, TelemetrySink};
