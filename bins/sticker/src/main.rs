//! sticker: turn images into transparent WebP stickers.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use stickerkit_image::{LogFormat, RemovalMode, StickerConfig, StickerOptions};
use stickerkit_telemetry::TelemetryConfig;

mod commands;
mod output;

use output::Status;

/// Sticker maker: background removal and size-capped WebP encoding
#[derive(Parser)]
#[command(name = "sticker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to ./.stickerkit.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print collected metrics as JSON on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Make a sticker from one image
    Make {
        /// Path to image file
        input: PathBuf,

        /// Output file (defaults to sticker-<name>.webp next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Declared content type of the upload (guessed from magic bytes)
        #[arg(long)]
        content_type: Option<String>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare background removal modes on one image
    Analyze {
        /// Path to image file
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Make stickers from every image in a directory
    Batch {
        /// Directory to process
        dir: PathBuf,

        /// Output directory (defaults to the input directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what an upload looks like without decoding it
    Inspect {
        /// Path to file
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Pipeline overrides shared by the processing commands.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Background removal mode
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Channel value a pixel must exceed on r, g and b to count as white
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Edge length of the square output
    #[arg(short, long)]
    size: Option<u32>,

    /// Byte budget the output must stay under
    #[arg(short, long)]
    budget: Option<usize>,

    /// Quality to try, repeat for a ladder (e.g. -q 90 -q 70)
    #[arg(short = 'q', long = "quality")]
    qualities: Vec<u8>,
}

impl PipelineArgs {
    /// Layer these flags over options from the config file.
    pub fn apply(&self, mut options: StickerOptions) -> StickerOptions {
        if let Some(mode) = self.mode {
            options.mode = mode.into();
        }
        if let Some(threshold) = self.threshold {
            options.white_threshold = threshold;
        }
        if let Some(size) = self.size {
            options.output_size = size;
        }
        if let Some(budget) = self.budget {
            options.byte_budget = budget;
        }
        if !self.qualities.is_empty() {
            options.quality_candidates = self.qualities.clone();
        }
        options
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Erase only white regions touching the image border
    BorderConnected,
    /// Erase every near-white pixel
    NaiveThreshold,
    /// Threshold, then close and open the mask
    Morphological,
}

impl From<ModeArg> for RemovalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::BorderConnected => RemovalMode::BorderConnected,
            ModeArg::NaiveThreshold => RemovalMode::NaiveThreshold,
            ModeArg::Morphological => RemovalMode::Morphological,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StickerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        "sticker=debug,stickerkit_image=debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let telemetry =
        TelemetryConfig::with_level(level).json(config.logging.format == LogFormat::Json);
    if let Err(e) = stickerkit_telemetry::init_with_config(telemetry) {
        Status::warning(&e.to_string());
    }
    if let Some(path) = &config.path {
        tracing::debug!(path = %path.display(), "Loaded configuration");
    }

    let defaults = config.sticker;
    let result = match cli.command {
        Commands::Make {
            input,
            output,
            content_type,
            pipeline,
            json,
        } => commands::make::run(
            &input,
            output.as_deref(),
            content_type.as_deref(),
            pipeline.apply(defaults),
            json,
        ),

        Commands::Analyze {
            input,
            pipeline,
            json,
        } => commands::analyze::run(&input, pipeline.apply(defaults), json),

        Commands::Batch {
            dir,
            output,
            pipeline,
            json,
        } => commands::batch::run(&dir, output.as_deref(), pipeline.apply(defaults), json),

        Commands::Inspect { input, json } => commands::inspect::run(&input, json),
    };

    if cli.metrics {
        let metrics = stickerkit_telemetry::metrics().export_json();
        match serde_json::to_string_pretty(&metrics) {
            Ok(text) => eprintln!("{}", text),
            Err(e) => Status::warning(&format!("Could not export metrics: {}", e)),
        }
    }

    match result {
        Ok(code) => code,
        Err(e) => {
            Status::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
