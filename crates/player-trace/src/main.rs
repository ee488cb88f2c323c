//! Player Trace - headless frame trace of the player scene
//!
//! Runs the motion/sync loop against an arena stand-in of the player model
//! with a fixed frame step and prints one record per frame.

mod trace;

use anyhow::{bail, Result};
use clap::Parser;
use player_core::{load_config, save_default_config, ViewportSize};
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::trace::{OutputFormat, Scenario};

#[derive(Parser, Debug)]
#[command(name = "player-trace")]
#[command(about = "Trace the player scene motion loop frame by frame")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "player.toml")]
    config: PathBuf,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 120)]
    frames: u32,

    /// Fixed frame step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Pointer position in CSS pixels, applied before the first frame
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    pointer: Option<Vec<f32>>,

    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 720.0)]
    height: f32,

    /// Frames to run before the model and its screen anchor load
    #[arg(long, default_value_t = 0)]
    load_after: u32,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; records go to stdout, logs to stderr
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Player Trace v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Default configuration written");
        return Ok(());
    }

    let config = load_config(&args.config)?;

    if args.dt < 0.0 {
        bail!("--dt must not be negative");
    }
    if args.width <= 0.0 || args.height <= 0.0 {
        bail!("viewport must be non-empty");
    }

    let scenario = Scenario {
        frames: args.frames,
        delta: args.dt,
        pointer: args.pointer.as_deref().map(|p| (p[0], p[1])),
        viewport: ViewportSize::new(args.width, args.height, 1.0),
        load_after: args.load_after,
    };

    let records = trace::run(&config, &scenario)?;
    let synced = records.iter().filter(|r| r.synced).count();
    info!(frames = records.len(), synced, "Trace complete");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    trace::write_records(&mut out, &records, args.format)?;

    Ok(())
}
