//! clipshape CLI - Command-line interface for resizing and framing videos.
//!
//! Usage:
//!   clipshape resize <INPUT> <OUTPUT> --width W --height H   Resize into a box
//!   clipshape frame <INPUT> <OUTPUT> --image PNG             Add a device frame
//!   clipshape info <INPUT>                                   Show video information
//!   clipshape check                                          Check tool availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clipshape_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "clipshape",
    about = "Resize, round, and frame videos for presentation",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resize a video into a target box
    Resize {
        /// Source video
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Target width
        #[arg(long)]
        width: f64,

        /// Target height
        #[arg(long)]
        height: f64,

        /// Corner radius for a rounded mask
        #[arg(long)]
        corner_radius: Option<f64>,

        /// Stretch to the target instead of preserving aspect ratio
        #[arg(long)]
        stretch: bool,

        /// Shrink the output to the fitted video, dropping the black bars
        #[arg(long)]
        cut_black_edge: bool,
    },

    /// Composite a device-frame image over a video
    Frame {
        /// Source video
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Frame image (PNG or JPEG)
        #[arg(short, long)]
        image: PathBuf,
    },

    /// Show video information
    Info {
        /// Source video
        input: PathBuf,
    },

    /// Check that ffmpeg and ffprobe are available
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    clipshape_common::logging::init_logging(&config.logging);
    tracing::debug!(
        config = ?cli.config,
        container = ?config.export.container,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Resize {
            input,
            output,
            width,
            height,
            corner_radius,
            stretch,
            cut_black_edge,
        } => {
            commands::resize::run(
                &config,
                input,
                output,
                width,
                height,
                corner_radius,
                !stretch,
                cut_black_edge,
            )
            .await
        }
        Commands::Frame {
            input,
            output,
            image,
        } => commands::frame::run(&config, input, output, image).await,
        Commands::Info { input } => commands::info::run(&config, input).await,
        Commands::Check => commands::check::run(&config),
    }
}
