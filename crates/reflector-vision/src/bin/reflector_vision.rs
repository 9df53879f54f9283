use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use reflector_vision::calibrate::calibrate_from_frame;
use reflector_vision::config::DEFAULT_CONFIG_PATH;
use reflector_vision::frame::rgb_view;
use reflector_vision::{
    run, ImageFileSource, JsonLinesSink, LogSink, MaskDirSink, MaskSink, VisionConfig,
};

#[cfg(not(feature = "tracing"))]
use reflector_vision::core::{init_with_level, parse_level_filter};

#[cfg(feature = "tracing")]
use reflector_vision::core::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "reflector-vision", version, about = "Retro-reflective target tracker")]
struct Cli {
    /// off, error, warn, info, debug or trace.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process frames in order and publish Difference / Distance.
    Run {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Write each frame's binary mask here.
        #[arg(long)]
        mask_dir: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(required = true)]
        frames: Vec<PathBuf>,
    },
    /// Fit the focal length from a photo of the target at a known distance.
    Calibrate {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        #[arg(long)]
        known_distance: f64,
        image: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// One JSON object per telemetry event on stdout.
    Json,
    /// Telemetry through the logger.
    Log,
}

fn main() -> ExitCode {
    match try_main(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    init_with_level(parse_level_filter(&cli.log_level))?;

    // With tracing, filtering comes from RUST_LOG instead.
    #[cfg(feature = "tracing")]
    {
        let _ = &cli.log_level;
        init_tracing(false);
    }

    match cli.command {
        Command::Run {
            config,
            mask_dir,
            format,
            frames,
        } => run_frames(config, mask_dir, format, frames),
        Command::Calibrate {
            config,
            known_distance,
            image,
        } => calibrate(config, known_distance, image),
    }
}

fn run_frames(
    config: PathBuf,
    mask_dir: Option<PathBuf>,
    format: Format,
    frames: Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = VisionConfig::load_json(&config)?;
    let pipeline = cfg.build_pipeline()?;
    log::info!(
        "team {} ({:?}), {} camera(s), {} frame(s)",
        cfg.team,
        cfg.ntmode,
        cfg.cameras.len(),
        frames.len()
    );

    let mut masks = match mask_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            Some(MaskDirSink::new(dir))
        }
        None => None,
    };
    let masks = masks.as_mut().map(|m| m as &mut dyn MaskSink);
    let mut source = ImageFileSource::new(frames);

    let summary = match format {
        Format::Json => {
            let mut sink = JsonLinesSink::new(std::io::stdout().lock());
            run(&pipeline, &mut source, &mut sink, masks)
        }
        Format::Log => run(&pipeline, &mut source, &mut LogSink, masks),
    };
    log::debug!("{summary:?}");
    Ok(())
}

fn calibrate(
    config: PathBuf,
    known_distance: f64,
    image: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = VisionConfig::load_json(&config)?;
    let pipeline = cfg.build_pipeline()?;
    let img = image::open(&image)?.to_rgb8();
    let cal = calibrate_from_frame(&pipeline, &rgb_view(&img), known_distance)?;
    println!("{}", serde_json::to_string_pretty(&cal)?);
    Ok(())
}
