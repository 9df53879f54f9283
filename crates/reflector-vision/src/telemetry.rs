//! Telemetry sinks.
//!
//! The robot controller reads two numbers from the vision table:
//! `Difference` (bearing offset in pixels) and `Distance`. A frame without a
//! target leaves both untouched.

use reflector_detect::DetectionResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

pub const DIFFERENCE_KEY: &str = "Difference";
pub const DISTANCE_KEY: &str = "Distance";

/// Table the values are published under.
pub const DEFAULT_TABLE: &str = "Shuffleboard/Vision";

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Key/value table shared with the robot controller.
pub trait TelemetrySink {
    fn put_number(&mut self, key: &str, value: f64) -> Result<(), TelemetryError>;

    /// Report a per-frame failure (for example an unreadable frame).
    fn notify_error(&mut self, message: &str) -> Result<(), TelemetryError>;
}

/// Push a detection to `sink`. Returns whether anything was written.
pub fn publish<S: TelemetrySink + ?Sized>(
    sink: &mut S,
    result: &DetectionResult,
) -> Result<bool, TelemetryError> {
    let Some(det) = result else {
        return Ok(false);
    };
    sink.put_number(DIFFERENCE_KEY, det.bearing_offset)?;
    sink.put_number(DISTANCE_KEY, det.distance)?;
    Ok(true)
}

/// In-memory table; keeps the latest value per key.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub values: BTreeMap<String, f64>,
    pub errors: Vec<String>,
    /// Number of `put_number` calls.
    pub writes: usize,
}

impl MemorySink {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}

impl TelemetrySink for MemorySink {
    fn put_number(&mut self, key: &str, value: f64) -> Result<(), TelemetryError> {
        self.values.insert(key.to_owned(), value);
        self.writes += 1;
        Ok(())
    }

    fn notify_error(&mut self, message: &str) -> Result<(), TelemetryError> {
        self.errors.push(message.to_owned());
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Event<'a> {
    Number {
        table: &'a str,
        key: &'a str,
        value: f64,
    },
    Error {
        table: &'a str,
        error: &'a str,
    },
}

/// Writes one JSON object per event, e.g. for a bridge process that forwards
/// them to NetworkTables.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    table: String,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_table(writer, DEFAULT_TABLE)
    }

    pub fn with_table(writer: W, table: impl Into<String>) -> Self {
        Self {
            writer,
            table: table.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(writer: &mut W, event: &Event<'_>) -> Result<(), TelemetryError> {
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write> TelemetrySink for JsonLinesSink<W> {
    fn put_number(&mut self, key: &str, value: f64) -> Result<(), TelemetryError> {
        let event = Event::Number {
            table: &self.table,
            key,
            value,
        };
        Self::emit(&mut self.writer, &event)
    }

    fn notify_error(&mut self, message: &str) -> Result<(), TelemetryError> {
        let event = Event::Error {
            table: &self.table,
            error: message,
        };
        Self::emit(&mut self.writer, &event)
    }
}

/// Writes values through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn put_number(&mut self, key: &str, value: f64) -> Result<(), TelemetryError> {
        log::info!("{key} = {value:.3}");
        Ok(())
    }

    fn notify_error(&mut self, message: &str) -> Result<(), TelemetryError> {
        log::warn!("{message}");
        Ok(())
    }
}
