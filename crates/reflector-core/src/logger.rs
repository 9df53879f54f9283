//! Minimal logger.
//!
//! Prints `[elapsed #frame LEVEL target] message` to stderr. The frame loop
//! publishes the index of the frame it is working on through
//! [`set_frame_index`], so every record emitted while a frame is processed
//! carries it; records outside the loop print `-` instead. Install once with
//! `init_with_level`.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const NO_FRAME: u64 = u64::MAX;

static CURRENT_FRAME: AtomicU64 = AtomicU64::new(NO_FRAME);

/// Tag subsequent log records with a frame index (`None` clears the tag).
pub fn set_frame_index(index: Option<u64>) {
    CURRENT_FRAME.store(index.unwrap_or(NO_FRAME), Ordering::Relaxed);
}

/// Frame index set by the frame loop, if any.
pub fn frame_index() -> Option<u64> {
    let v = CURRENT_FRAME.load(Ordering::Relaxed);
    (v != NO_FRAME).then_some(v)
}

fn format_line(
    elapsed: f64,
    frame: Option<u64>,
    level: log::Level,
    target: &str,
    args: &fmt::Arguments<'_>,
) -> String {
    let frame = match frame {
        Some(i) => format!("#{i:05}"),
        None => "-".to_owned(),
    };
    format!("[{elapsed:8.3}s {frame:>6} {level:>5} {target}] {args}")
}

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            frame_index(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Parse `off|error|warn|info|debug|trace`, falling back to `Info`.
pub fn parse_level_filter(name: &str) -> LevelFilter {
    LevelFilter::from_str(name).unwrap_or(LevelFilter::Info)
}

#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(parse_level_filter("debug"), LevelFilter::Debug);
        assert_eq!(parse_level_filter("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level_filter("nonsense"), LevelFilter::Info);
    }

    #[test]
    fn records_carry_the_current_frame() {
        let line = format_line(
            1.5,
            Some(12),
            log::Level::Warn,
            "reflector_vision::runner",
            &format_args!("telemetry error"),
        );
        assert_eq!(
            line,
            "[   1.500s #00012  WARN reflector_vision::runner] telemetry error"
        );

        let line = format_line(0.0, None, log::Level::Info, "cli", &format_args!("ready"));
        assert_eq!(line, "[   0.000s      -  INFO cli] ready");

        set_frame_index(Some(3));
        assert_eq!(frame_index(), Some(3));
        set_frame_index(None);
        assert_eq!(frame_index(), None);
    }
}
