//! Per-frame detection pipeline.
//!
//! This module wires together color thresholding, contour tracing, shape
//! scoring, target selection and range/bearing estimation.

mod error;
mod params;
mod process;
mod result;

pub use error::ConfigError;
pub use params::PipelineConfig;
pub use process::Pipeline;
pub use result::FrameReport;
