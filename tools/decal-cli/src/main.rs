//! Decal CLI — Command-line interface for overlay compositing.
//!
//! Usage:
//!   decal compose <BASE> <OVERLAY> [OPTIONS]   Composite with an explicit transform
//!   decal replay <BASE> <OVERLAY> <SCRIPT>     Replay a gesture script, then export
//!   decal info <IMAGE>                         Show image and default placement info

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "decal",
    about = "Place a decorative overlay on a photo and export the flattened result",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite an overlay onto a photo with an explicit transform
    Compose {
        /// Base photo
        base: PathBuf,

        /// Overlay image
        overlay: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overlay center X, percent of the photo width
        #[arg(short, long, default_value = "50", allow_negative_numbers = true)]
        x: f64,

        /// Overlay center Y, percent of the photo height
        #[arg(short, long, default_value = "50", allow_negative_numbers = true)]
        y: f64,

        /// Scale multiplier
        #[arg(short, long, default_value = "1.0")]
        scale: f64,

        /// Rotation in degrees
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        rotation: f64,

        /// Opacity; defaults to the configured default opacity
        #[arg(long)]
        opacity: Option<f64>,
    },

    /// Replay a JSONL gesture script against a display surface, then export
    Replay {
        /// Base photo
        base: PathBuf,

        /// Overlay image
        overlay: PathBuf,

        /// JSONL gesture script
        script: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Display surface width in device pixels (defaults to the photo width)
        #[arg(long)]
        surface_width: Option<f64>,

        /// Display surface height in device pixels (defaults to the photo height)
        #[arg(long)]
        surface_height: Option<f64>,

        /// Display surface left offset in device pixels
        #[arg(long, default_value = "0")]
        surface_left: f64,

        /// Display surface top offset in device pixels
        #[arg(long, default_value = "0")]
        surface_top: f64,

        /// Print the final transform without exporting
        #[arg(long)]
        dry_run: bool,
    },

    /// Show image dimensions and the default overlay placement
    Info {
        /// Image to inspect
        image: PathBuf,

        /// Overlay to place with default settings
        #[arg(long)]
        overlay: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = decal_common::config::AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    decal_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Compose {
            base,
            overlay,
            output,
            x,
            y,
            scale,
            rotation,
            opacity,
        } => {
            let opacity = opacity.unwrap_or(config.engine.default_opacity);
            commands::compose::run(
                &config,
                base,
                overlay,
                output,
                decal_model::transform::OverlayTransform {
                    x,
                    y,
                    scale,
                    rotation,
                    opacity,
                },
            )
            .await
        }
        Commands::Replay {
            base,
            overlay,
            script,
            output,
            surface_width,
            surface_height,
            surface_left,
            surface_top,
            dry_run,
        } => {
            commands::replay::run(
                config,
                commands::replay::ReplayArgs {
                    base,
                    overlay,
                    script,
                    output,
                    surface_width,
                    surface_height,
                    surface_left,
                    surface_top,
                    dry_run,
                },
            )
            .await
        }
        Commands::Info { image, overlay } => commands::info::run(&config, image, overlay).await,
    }
}
