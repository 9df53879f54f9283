/// Configuration rejected at startup. Any of these stops the process before
/// the first frame is processed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("color range channel {channel}: low bound {low} exceeds high bound {high}")]
    InvalidColorRange { channel: usize, low: u8, high: u8 },
    #[error("{name} range must have finite bounds with low <= high (got {low}..{high})")]
    InvalidThreshold {
        name: &'static str,
        low: f64,
        high: f64,
    },
    #[error("calibration constant `{name}` is invalid (got {value})")]
    InvalidCalibration { name: &'static str, value: f64 },
    #[error("region of interest must have positive width and height (got {width}x{height})")]
    InvalidRoi { width: i32, height: i32 },
}
