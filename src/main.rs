use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cardprep::batch::{BatchEvent, BatchRunner, ErrorPolicy};
use cardprep::config::{IsolatorConfig, ResizeStrategy};
use cardprep::isolation::CardIsolator;
use cardprep::model_fetch::{ModelFetcher, default_model_path};

#[derive(Parser)]
#[command(name = "cardprep")]
#[command(about = "Prepare playing card photos as detector training data")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop the card out of every photo in a directory into <DIR>_processed
    Process {
        /// Directory containing the input photos
        #[arg(value_name = "PHOTOS_DIR")]
        photos_dir: PathBuf,

        /// JSON file overriding isolator parameters
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Shrink photos by this factor on each axis before isolating
        #[arg(long, value_name = "N", conflicts_with = "size")]
        divisor: Option<u32>,

        /// Resize photos to this exact size before isolating
        #[arg(long, value_name = "WxH", value_parser = parse_size)]
        size: Option<(u32, u32)>,

        /// Skip photos that cannot be processed instead of stopping
        #[arg(long)]
        skip_errors: bool,

        /// Save intermediate images to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },

    /// Download the trained detector unless it is already present
    FetchModel {
        /// Where the model file should live (default: ./models/best.pt)
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,
    },
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height '{}': {}", h, e))?;
    Ok((w, h))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    match args.command {
        Command::Process {
            photos_dir,
            config,
            divisor,
            size,
            skip_errors,
            debug_out,
        } => {
            let mut config = match config {
                Some(path) => IsolatorConfig::from_json_file(&path)?,
                None => IsolatorConfig::default(),
            };
            if let Some(d) = divisor {
                config = config.with_resize(ResizeStrategy::Divisor(d));
            }
            if let Some((width, height)) = size {
                config = config.with_resize(ResizeStrategy::Fixed { width, height });
            }

            let mut isolator = CardIsolator::new(config)?.with_verbose(args.verbose);
            if let Some(debug_dir) = debug_out {
                isolator = isolator.with_debug(debug_dir)?;
            }

            let policy = if skip_errors { ErrorPolicy::Skip } else { ErrorPolicy::Abort };
            let mut runner = BatchRunner::new(isolator)
                .with_error_policy(policy)
                .with_verbose(args.verbose)
                .with_observer(|event: &BatchEvent<'_>| match event {
                    BatchEvent::Started { total, .. } => {
                        println!("Processing {} input photos...", total);
                    }
                    BatchEvent::Processed { index, total, source, clamped, .. } => {
                        let note = if *clamped { " (clamped at frame edge)" } else { "" };
                        println!("[{}/{}] {}{}", index + 1, total, source.display(), note);
                    }
                    BatchEvent::Skipped { index, total, source, error } => {
                        println!("[{}/{}] {} skipped: {}", index + 1, total, source.display(), error);
                    }
                    BatchEvent::Finished { .. } => {}
                });

            let report = runner.run(&photos_dir)?;

            println!("\n=== Processing Results ===");
            println!("Cards written: {}", report.written.len());
            if !report.skipped.is_empty() {
                println!("Photos skipped: {}", report.skipped.len());
            }
            if report.clamped > 0 {
                println!("Crops clamped at frame edge: {}", report.clamped);
            }
            println!("Playing cards saved at: \"{}\"", report.output_dir.display());
        }
        Command::FetchModel { path } => {
            let target = match path {
                Some(p) => p,
                None => default_model_path()?,
            };

            let model_path = ModelFetcher::best_model()
                .with_verbose(args.verbose)
                .ensure(&target)
                .await?;

            println!("{}", model_path.display());
        }
    }

    Ok(())
}
