//! Robot-side JSON configuration.
//!
//! The file follows the coprocessor `frc.json` layout (team number,
//! NetworkTables mode, cameras, switched cameras) with an added `vision`
//! object holding the [`PipelineConfig`]:
//!
//! ```json
//! {
//!     "team": 1234,
//!     "ntmode": "client",
//!     "cameras": [{ "name": "front", "path": "/dev/video0", "fps": 30 }],
//!     "switched cameras": [{ "name": "driver", "key": "camera-select" }],
//!     "vision": {
//!         "color": { "low": [50, 50, 100], "high": [200, 200, 255] },
//!         "shape": {
//!             "ratio": { "low": 2.0, "high": 2.5 },
//!             "density": { "low": 0.05, "high": 0.15 }
//!         },
//!         "calibration": {
//!             "known_target_width": 55.0,
//!             "focal_length": 333.82,
//!             "bearing_correction_offset": 105.0
//!         }
//!     }
//! }
//! ```

use reflector_detect::{ConfigError, Pipeline, PipelineConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Location of the configuration on the vision coprocessor image.
pub const DEFAULT_CONFIG_PATH: &str = "/boot/frc.json";

#[derive(thiserror::Error, Debug)]
pub enum VisionConfigError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Vision(#[from] ConfigError),
}

#[derive(thiserror::Error, Debug)]
pub enum VisionIoError {
    #[error("could not open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config error in '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        source: VisionConfigError,
    },
}

/// NetworkTables role of the coprocessor. Parsed case-insensitively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NtMode {
    #[default]
    Client,
    Server,
}

impl TryFrom<String> for NtMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "client" => Ok(NtMode::Client),
            "server" => Ok(NtMode::Server),
            _ => Err(format!("could not understand ntmode value '{value}'")),
        }
    }
}

impl From<NtMode> for String {
    fn from(mode: NtMode) -> Self {
        match mode {
            NtMode::Client => "client".to_owned(),
            NtMode::Server => "server".to_owned(),
        }
    }
}

/// One USB camera. Only `name` and `path` are interpreted here; every other
/// key is kept for the camera driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub name: String,
    pub path: String,
    /// MJPEG stream properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<Value>,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// Virtual camera whose source is picked through a telemetry key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchedCameraConfig {
    pub name: String,
    pub key: String,
}

/// Value written to a switched camera's selection key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorKey {
    Index(i64),
    Name(String),
}

impl SelectorKey {
    /// Interpret a raw table value. Numbers select by index (fractions are
    /// truncated), strings by camera name.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .map(SelectorKey::Index),
            Value::String(s) => Some(SelectorKey::Name(s.clone())),
            _ => None,
        }
    }

    /// Index of the selected camera, if it exists.
    pub fn resolve(&self, cameras: &[CameraConfig]) -> Option<usize> {
        match self {
            SelectorKey::Index(i) => usize::try_from(*i).ok().filter(|&i| i < cameras.len()),
            SelectorKey::Name(name) => cameras.iter().position(|c| &c.name == name),
        }
    }
}

/// Whole configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    pub team: u32,
    #[serde(default)]
    pub ntmode: NtMode,
    pub cameras: Vec<CameraConfig>,
    #[serde(default, rename = "switched cameras")]
    pub switched_cameras: Vec<SwitchedCameraConfig>,
    pub vision: PipelineConfig,
}

impl VisionConfig {
    /// Parse and validate a configuration string.
    pub fn from_json_str(raw: &str) -> Result<Self, VisionConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.vision.validate()?;
        Ok(cfg)
    }

    /// Load, parse and validate a configuration file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, VisionIoError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| VisionIoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| VisionIoError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the detection pipeline for this configuration.
    pub fn build_pipeline(&self) -> Result<Pipeline, ConfigError> {
        Pipeline::new(self.vision.clone())
    }

    /// Camera selected by a switched-camera key value.
    pub fn switched_source(&self, value: &Value) -> Option<&CameraConfig> {
        let idx = SelectorKey::from_value(value)?.resolve(&self.cameras)?;
        self.cameras.get(idx)
    }
}
